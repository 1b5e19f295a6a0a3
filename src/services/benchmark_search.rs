use std::sync::Arc;

use crate::domain::{
    benchmark::{metric_search_term, BenchmarkEntry, BenchmarkValue},
    snippet_classifier::classify,
    value_extractor::TermExtractor,
};

use super::SearchProvider;

pub const DEFAULT_TOP_RESULTS: usize = 3;

pub struct BenchmarkSearchClient {
    provider: Arc<dyn SearchProvider>,
    top_results: usize,
}

pub fn build_benchmark_query(industry: &str, stage: &str, metric_term: &str) -> String {
    format!(
        "{} startup {} stage {} benchmark average",
        industry, stage, metric_term
    )
}

impl BenchmarkSearchClient {
    pub fn new(provider: Arc<dyn SearchProvider>, top_results: usize) -> Self {
        BenchmarkSearchClient {
            provider,
            top_results,
        }
    }

    pub async fn search_one(
        &self,
        industry: &str,
        stage: &str,
        metric_name: &str,
    ) -> Option<BenchmarkEntry> {
        let metric_term = metric_search_term(metric_name);
        let query = build_benchmark_query(industry, stage, &metric_term);

        let candidates = match self.provider.search(&query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                log::error!("Search request error for '{}': {}", query, e);
                return None;
            }
        };

        let extractor = TermExtractor::new(&metric_term);
        let entry = candidates
            .iter()
            .take(self.top_results)
            .filter(|candidate| classify(&candidate.title, &candidate.snippet, &metric_term))
            .find_map(|candidate| match extractor.extract(&candidate.snippet) {
                BenchmarkValue::Absent => None,
                value => Some(BenchmarkEntry::from_candidate(metric_name, value, candidate)),
            });

        match entry {
            Some(ref e) => log::info!("Benchmark for {} found in '{}'", metric_name, e.source_title),
            None => log::info!("No usable benchmark for {} in top results", metric_name),
        }

        entry
    }
}
