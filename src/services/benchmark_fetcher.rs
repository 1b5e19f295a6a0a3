use std::time::Duration;

use crate::domain::benchmark::{BenchmarkQuery, BenchmarkSet};

use super::{BenchmarkCache, BenchmarkSearchClient};

pub const MAX_SEARCHES_PER_FETCH: usize = 5;
pub const SEARCH_DELAY: Duration = Duration::from_secs(2);

pub struct BenchmarkFetcher {
    search_client: BenchmarkSearchClient,
    cache: BenchmarkCache,
    max_searches: usize,
    search_delay: Duration,
}

impl BenchmarkFetcher {
    pub fn new(search_client: BenchmarkSearchClient) -> Self {
        BenchmarkFetcher::with_limits(search_client, MAX_SEARCHES_PER_FETCH, SEARCH_DELAY)
    }

    pub fn with_limits(
        search_client: BenchmarkSearchClient,
        max_searches: usize,
        search_delay: Duration,
    ) -> Self {
        BenchmarkFetcher {
            search_client,
            cache: BenchmarkCache::default(),
            max_searches,
            search_delay,
        }
    }

    /// Cached batches are returned as-is, filtered to the requested metrics:
    /// a metric that was not part of the first batch for this industry/stage
    /// is never searched afterwards.
    pub async fn fetch(&self, query: &BenchmarkQuery) -> BenchmarkSet {
        let cache_key = BenchmarkCache::key(&query.industry, &query.stage);

        if let Some(cached) = self.cache.get(&cache_key) {
            log::info!("Benchmark cache hit for {}", cache_key);
            return cached.filtered(&query.metric_names);
        }

        let mut results = BenchmarkSet::default();
        let mut searches_made = 0;

        for metric in &query.metric_names {
            if searches_made >= self.max_searches {
                log::warn!(
                    "Search cap of {} reached, skipping remaining benchmarks for {}",
                    self.max_searches,
                    cache_key
                );
                break;
            }

            if results.was_attempted(metric) {
                continue;
            }

            if searches_made > 0 {
                tokio::time::sleep(self.search_delay).await;
            }

            let entry = self
                .search_client
                .search_one(&query.industry, &query.stage, metric)
                .await;
            searches_made += 1;

            results.record(metric, entry);
        }

        self.cache.insert(cache_key, results.clone());

        results
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use async_trait::async_trait;
    use tokio::time::Instant;

    use super::*;
    use crate::{
        domain::benchmark::CandidateResult,
        error::AdvisorError,
        services::{benchmark_search::DEFAULT_TOP_RESULTS, SearchProvider},
    };

    #[derive(Default)]
    struct CountingSearch {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SearchProvider for CountingSearch {
        async fn search(&self, query: &str) -> Result<Vec<CandidateResult>, AdvisorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if query.contains("cac") {
                return Err(AdvisorError::Transport("timed out".into()));
            }
            Ok(vec![CandidateResult {
                title: "Benchmarks".into(),
                snippet: format!("{} average is 12%", query),
                url: "".into(),
            }])
        }
    }

    fn fetcher(provider: Arc<CountingSearch>) -> BenchmarkFetcher {
        let client = BenchmarkSearchClient::new(provider, DEFAULT_TOP_RESULTS);
        BenchmarkFetcher::with_limits(client, MAX_SEARCHES_PER_FETCH, Duration::ZERO)
    }

    fn query(industry: &str, stage: &str, metrics: &[&str]) -> BenchmarkQuery {
        BenchmarkQuery::new(industry, stage, metrics.iter().map(|m| m.to_string()).collect())
    }

    #[tokio::test]
    async fn second_fetch_is_served_from_cache() {
        let provider = Arc::new(CountingSearch::default());
        let fetcher = fetcher(provider.clone());

        let first = fetcher.fetch(&query("SaaS", "Seed", &["churn_rate"])).await;
        let second = fetcher.fetch(&query("saas", "SEED", &["churn_rate"])).await;

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert!(second.get("churn_rate").is_some());
    }

    #[tokio::test]
    async fn searches_are_capped_per_fetch() {
        let provider = Arc::new(CountingSearch::default());
        let fetcher = fetcher(provider.clone());
        let metrics = ["m1_rate", "m2_rate", "m3_rate", "m4_rate", "m5_rate", "m6_rate", "m7_rate"];

        let results = fetcher.fetch(&query("SaaS", "Seed", &metrics)).await;

        assert_eq!(provider.calls.load(Ordering::SeqCst), 5);
        assert!(results.get("m5_rate").is_some());
        assert!(results.get("m6_rate").is_none());
        assert!(results.get("m7_rate").is_none());
    }

    #[tokio::test]
    async fn failed_metric_does_not_abort_batch() {
        let provider = Arc::new(CountingSearch::default());
        let fetcher = fetcher(provider.clone());

        let results = fetcher
            .fetch(&query("SaaS", "Seed", &["cac", "churn_rate"]))
            .await;

        assert!(results.was_attempted("cac"));
        assert!(results.get("cac").is_none());
        assert!(results.get("churn_rate").is_some());
    }

    #[tokio::test]
    async fn cache_hit_drops_metrics_missing_from_first_batch() {
        let provider = Arc::new(CountingSearch::default());
        let fetcher = fetcher(provider.clone());

        fetcher.fetch(&query("SaaS", "Seed", &["churn_rate"])).await;
        let results = fetcher
            .fetch(&query("SaaS", "Seed", &["churn_rate", "burn_rate"]))
            .await;

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert!(!results.was_attempted("burn_rate"));
    }

    #[tokio::test(start_paused = true)]
    async fn searches_are_spaced_by_fixed_delay() {
        let provider = Arc::new(CountingSearch::default());
        let client = BenchmarkSearchClient::new(provider.clone(), DEFAULT_TOP_RESULTS);
        let fetcher = BenchmarkFetcher::with_limits(client, MAX_SEARCHES_PER_FETCH, SEARCH_DELAY);

        let start = Instant::now();
        fetcher
            .fetch(&query("SaaS", "Seed", &["m1_rate", "m2_rate", "m3_rate"]))
            .await;
        let elapsed = start.elapsed();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
        assert!(elapsed >= SEARCH_DELAY * 2, "elapsed {:?}", elapsed);
        assert!(elapsed < SEARCH_DELAY * 2 + Duration::from_millis(100), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn single_search_is_not_delayed() {
        let provider = Arc::new(CountingSearch::default());
        let client = BenchmarkSearchClient::new(provider.clone(), DEFAULT_TOP_RESULTS);
        let fetcher = BenchmarkFetcher::with_limits(client, MAX_SEARCHES_PER_FETCH, SEARCH_DELAY);

        let start = Instant::now();
        fetcher.fetch(&query("SaaS", "Seed", &["churn_rate"])).await;

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn duplicate_metrics_are_searched_once() {
        let provider = Arc::new(CountingSearch::default());
        let fetcher = fetcher(provider.clone());

        fetcher
            .fetch(&query("SaaS", "Seed", &["churn_rate", "churn_rate"]))
            .await;

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
