use actix_web::{post, web, HttpResponse};
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    domain::company::{CompanyProfile, KpiSnapshot},
    error::AdvisorError,
    services::{InsightsAgent, InsightsStore},
};

#[derive(Deserialize)]
struct GenerateInsightsBody {
    #[serde(default)]
    company_data: Map<String, Value>,
    #[serde(default)]
    kpi_data: Map<String, Value>,
}

#[post("/generate-insights")]
pub async fn generate_insights(
    agent: web::Data<InsightsAgent>,
    store: web::Data<InsightsStore>,
    body: web::Json<GenerateInsightsBody>,
) -> Result<HttpResponse, AdvisorError> {
    let request_id = Uuid::new_v4();
    log::info!("[{}] Received request to generate insights", request_id);

    let body = body.into_inner();
    if body.company_data.is_empty() || body.kpi_data.is_empty() {
        return Err(AdvisorError::Validation(
            "Missing company_data or kpi_data in request".to_string(),
        ));
    }

    let company = CompanyProfile::new(body.company_data);
    let kpis = KpiSnapshot::try_from(body.kpi_data)?;

    let report = agent.generate(&company, &kpis).await?;
    if report.is_degraded() {
        log::warn!("[{}] Returning degraded report for {}", request_id, company.name());
    }

    if let Err(e) = store.save(&company.name(), &report).await {
        log::error!("[{}] Failed to save insights: {}", request_id, e);
    }

    Ok(HttpResponse::Ok().json(report))
}
