use std::{net::TcpListener, sync::Arc};

use actix_web::web;
use anyhow::{bail, Context};
use advisor::{
    configuration::get_configuration,
    domain::comparison::{ComparisonNarrator, PolarityTable},
    services::{
        BenchmarkFetcher, BenchmarkSearchClient, CompetitorScout, CompletionProvider,
        DuckDuckGoScraper, FileQuotaTracker, GeminiClient, HttpFeedSource, InsightsAgent,
        InsightsStore, NewsFetcher, QuotaGuardedCompletion,
    },
    startup::run,
};
use env_logger::Env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().context("Failed to read configuration")?;
    if configuration.api_keys.gemini.is_empty() {
        bail!("GOOGLE_API_KEY is not set");
    }

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address).with_context(|| format!("Failed to bind {}", address))?;

    let scraper = DuckDuckGoScraper::new(&configuration.search)?;
    let search_client =
        BenchmarkSearchClient::new(Arc::new(scraper), configuration.search.top_results);
    let benchmark_fetcher = BenchmarkFetcher::with_limits(
        search_client,
        configuration.search.max_requests,
        configuration.search.request_delay(),
    );

    let polarity = match configuration.benchmarks.lower_is_better.is_empty() {
        true => PolarityTable::default(),
        false => PolarityTable::new(configuration.benchmarks.lower_is_better.clone()),
    };

    let quota = FileQuotaTracker::new(
        &configuration.completion.quota_file,
        configuration.completion.daily_limit,
    );
    let gemini = GeminiClient::new(configuration.api_keys.gemini.clone(), &configuration.completion);
    let completion: Arc<dyn CompletionProvider> =
        Arc::new(QuotaGuardedCompletion::new(Arc::new(gemini), Arc::new(quota)));

    let feed_source = HttpFeedSource::new(&configuration.search.user_agent)?;
    let news_fetcher = NewsFetcher::new(&configuration.news, Arc::new(feed_source));
    let competitor_scout =
        CompetitorScout::new(completion.clone(), configuration.competitors.ttl_days);

    let agent = InsightsAgent::new(
        news_fetcher,
        competitor_scout,
        benchmark_fetcher,
        ComparisonNarrator::new(polarity),
        completion,
    )
    .with_max_articles(configuration.news.max_articles);
    let store = InsightsStore::new(&configuration.storage.insights_dir);

    log::info!("Starting insights service on port {}", configuration.application.port);

    run(listener, web::Data::new(agent), web::Data::new(store))?.await?;

    Ok(())
}
