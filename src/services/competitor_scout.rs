use std::sync::Arc;

use chrono::TimeDelta;

use crate::{
    domain::{insights::extract_json_array, market::Competitor},
    error::AdvisorError,
};

use super::{CompletionProvider, TtlCache};

fn competitor_prompt(industry: &str, product: &str) -> String {
    format!(
        r#"Generate information about 3 notable startups or companies in the {industry} industry
that focus on {product}. For each company, provide:
1. Company name
2. Brief description of their product/service (1-2 sentences)
3. Key differentiator or unique selling proposition
4. Founded year (approximate is fine)
5. Current status (e.g., early-stage, growth, acquired)

Format the response as a JSON array with these fields:
[
    {{
        "name": "Company Name",
        "description": "Product description",
        "differentiator": "Key differentiator",
        "founded": "Year",
        "status": "Current status"
    }},
    ...
]

Only provide the JSON array with no other text or explanation."#
    )
}

pub struct CompetitorScout {
    completion: Arc<dyn CompletionProvider>,
    cache: TtlCache<Vec<Competitor>>,
}

impl CompetitorScout {
    pub fn new(completion: Arc<dyn CompletionProvider>, ttl_days: i64) -> Self {
        CompetitorScout {
            completion,
            cache: TtlCache::new(TimeDelta::days(ttl_days)),
        }
    }

    pub async fn fetch_competitor_info(&self, industry: &str, product: &str) -> Vec<Competitor> {
        let cache_key = format!("{}_{}", industry, product);
        if let Some(cached) = self.cache.get(&cache_key) {
            log::info!("Competitor cache hit for {}", cache_key);
            return cached;
        }

        match self.ask_model(industry, product).await {
            Ok(competitors) => {
                self.cache.insert(cache_key, competitors.clone());
                competitors
            }
            Err(e) => {
                log::error!("Error fetching competitor info: {}", e);
                vec![Competitor::unknown()]
            }
        }
    }

    async fn ask_model(&self, industry: &str, product: &str) -> Result<Vec<Competitor>, AdvisorError> {
        let response = self
            .completion
            .complete(&competitor_prompt(industry, product))
            .await?;

        let json = extract_json_array(&response).ok_or_else(|| {
            AdvisorError::MalformedModelResponse("Could not find valid JSON array in response".into())
        })?;

        Ok(serde_json::from_str(json)?)
    }
}
