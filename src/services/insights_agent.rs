use std::sync::Arc;

use chrono::Local;

use crate::{
    domain::{
        benchmark::BenchmarkQuery,
        company::{CompanyProfile, KpiSnapshot},
        comparison::ComparisonNarrator,
        insights::InsightsReport,
        market::{format_competitors, format_news},
    },
    error::AdvisorError,
};

use super::{BenchmarkFetcher, CompetitorScout, CompletionProvider, NewsFetcher};

pub const DEFAULT_MAX_ARTICLES: usize = 5;

const ADVISOR_PROMPT: &str = r#"You are an expert startup advisor with deep knowledge of KPIs, business metrics, and growth strategies.
Analyze the provided company information, KPI data with benchmarks, recent industry news, and competitor
information to provide a strategic SWOT analysis specifically designed for early-stage startups in India.

CRITICAL: Your responses MUST be relevant to the Indian startup ecosystem and infrastructure.

Focus on:
1. Creating a realistic and balanced SWOT analysis that acknowledges both positive aspects and challenges
2. Providing specific, actionable growth tactics that are feasible for a small startup team based out of India
3. Identifying market positioning and differentiation opportunities in India
4. Linking KPI performance to specific business outcomes
5. Finding practical competitive advantages based on strengths and market opportunities

The company's KPIs have already been compared to available industry benchmarks. Incorporate this analysis
into your assessment while also applying your own knowledge of standard industry metrics.

CRITICAL: When mentioning any insights based on news or external data, you MUST cite your sources using citation IDs
in square brackets like [citation1]. Include these citations directly inline with your content.

Format your response as a JSON object with these sections:
{
    "executive_summary": "One paragraph executive summary with key insights",
    "swot_analysis": {
        "strengths": ["3-4 key internal strengths with brief explanations, with citations where applicable"],
        "weaknesses": ["3-4 key internal weaknesses with brief explanations, with citations where applicable"],
        "opportunities": ["3-4 external opportunities with brief explanations, with citations where applicable"],
        "threats": ["3-4 external threats with brief explanations, with citations where applicable"]
    },
    "growth_tactics": ["4-5 specific, actionable growth tactics tailored for this startup, with citations where applicable"],
    "competitive_positioning": "Brief analysis of how the startup can position against competitors, with citations where applicable",
    "kpi_action_items": ["3-5 specific actions to improve underperforming KPIs or leverage strong KPIs, with citations where applicable"],
    "citations": [
        {
            "id": "citation1",
            "source": "Source name (e.g. TechCrunch, YourStory)",
            "title": "Article title",
            "date": "Publication date",
            "url": "Source URL if available"
        }
    ]
}

In the "citations" array, include all sources you referenced in your analysis. Each citation needs a unique ID
and the URL if available.

Make sure your response is a valid JSON object. Do not include any text before or after the JSON."#;

fn insights_prompt(
    company: &CompanyProfile,
    kpi_analysis: &str,
    news: &str,
    competitors: &str,
) -> String {
    format!(
        "{ADVISOR_PROMPT}

Company Information:
{company_info}

KPI Analysis with Web-Sourced Benchmarks:
{kpi_analysis}

Recent Industry News:
{news}

Competitor Information:
{competitors}

Consider the startup's stage ({stage}), technology readiness level ({trl}), and market segments
(TAM: {tam}, SAM: {sam}, SOM: {som}, Market CAGR: {cagr}%) when providing insights. Focus on practical
actions that don't require significant resources while delivering meaningful impact. Use the startup's
elevator pitch to understand their value proposition and market positioning.",
        company_info = company.describe(),
        stage = company.stage(),
        trl = company.attribute("technology_readiness_level"),
        tam = company.attribute("tam"),
        sam = company.attribute("sam"),
        som = company.attribute("som"),
        cagr = company.attribute("market_cagr"),
    )
}

pub struct InsightsAgent {
    news: NewsFetcher,
    competitors: CompetitorScout,
    benchmarks: BenchmarkFetcher,
    narrator: ComparisonNarrator,
    completion: Arc<dyn CompletionProvider>,
    max_articles: usize,
}

impl InsightsAgent {
    pub fn new(
        news: NewsFetcher,
        competitors: CompetitorScout,
        benchmarks: BenchmarkFetcher,
        narrator: ComparisonNarrator,
        completion: Arc<dyn CompletionProvider>,
    ) -> Self {
        InsightsAgent {
            news,
            competitors,
            benchmarks,
            narrator,
            completion,
            max_articles: DEFAULT_MAX_ARTICLES,
        }
    }

    pub fn with_max_articles(mut self, max_articles: usize) -> Self {
        self.max_articles = max_articles;
        self
    }

    /// Only an exhausted quota is returned as an error; every other failure
    /// ends up as a degraded report.
    pub async fn generate(
        &self,
        company: &CompanyProfile,
        kpis: &KpiSnapshot,
    ) -> Result<InsightsReport, AdvisorError> {
        let industry = company.industry();

        let news = self.news.fetch_industry_news(&industry, self.max_articles).await;
        let competitors = self
            .competitors
            .fetch_competitor_info(&industry, &company.product())
            .await;

        let query = BenchmarkQuery::new(&industry, &company.stage(), kpis.metric_names());
        let benchmarks = self.benchmarks.fetch(&query).await;
        let kpi_analysis = self.narrator.narrate_all(kpis.metrics(), &benchmarks);
        log::info!("KPI analysis for {}:\n{}", company.name(), kpi_analysis);

        let prompt = insights_prompt(
            company,
            &kpi_analysis,
            &format_news(&news),
            &format_competitors(&competitors),
        );

        let response = match self.completion.complete(&prompt).await {
            Ok(response) => response,
            Err(e @ AdvisorError::QuotaExceeded { .. }) => return Err(e),
            Err(e) => {
                log::error!("Error generating insights: {}", e);
                return Ok(InsightsReport::failed(&e.to_string()));
            }
        };

        let mut report = InsightsReport::from_model_response(&response);
        if report.is_degraded() {
            return Ok(report);
        }

        report.merge_news_citations(&news);
        report.merge_benchmark_citations(
            &query.metric_names,
            &benchmarks,
            &Local::now().format("%Y-%m-%d").to_string(),
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn prompt_carries_context_sections() {
        let company = CompanyProfile::new(
            json!({"name": "PayKaro", "stage": "Series A", "tam": "5B"})
                .as_object()
                .cloned()
                .unwrap(),
        );

        let prompt = insights_prompt(&company, "churn_rate: 0.04", "- news", "- rival");

        assert!(prompt.contains("Company Information:\nname: PayKaro\nstage: Series A\ntam: 5B"));
        assert!(prompt.contains("KPI Analysis with Web-Sourced Benchmarks:\nchurn_rate: 0.04"));
        assert!(prompt.contains("Recent Industry News:\n- news"));
        assert!(prompt.contains("Competitor Information:\n- rival"));
        assert!(prompt.contains("stage (Series A), technology readiness level (unknown)"));
        assert!(prompt.contains("TAM: 5B, SAM: unknown"));
    }
}
