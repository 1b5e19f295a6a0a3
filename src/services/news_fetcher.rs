use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{Local, TimeDelta};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT},
    Client,
};
use rss::Channel;
use scraper::Html;
use url::{form_urlencoded, Url};

use crate::{configuration::NewsSettings, domain::market::NewsArticle, error::AdvisorError};

use super::TtlCache;

const SUMMARY_LIMIT: usize = 200;

#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_feed(&self, feed_url: &str) -> Result<Channel, AdvisorError>;
}

pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    pub fn new(user_agent: &str) -> Result<Self, AdvisorError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .map_err(|e| AdvisorError::Parse(format!("Invalid user agent: {}", e)))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/rss+xml"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(HttpFeedSource { client })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_feed(&self, feed_url: &str) -> Result<Channel, AdvisorError> {
        let content = self
            .client
            .get(feed_url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        Channel::read_from(&content[..]).map_err(|e| AdvisorError::Parse(e.to_string()))
    }
}

pub struct NewsFetcher {
    source: Arc<dyn FeedSource>,
    feeds: Vec<String>,
    max_requests: usize,
    entries_per_feed: usize,
    request_delay: Duration,
    cache: TtlCache<Vec<NewsArticle>>,
}

impl NewsFetcher {
    pub fn new(settings: &NewsSettings, source: Arc<dyn FeedSource>) -> Self {
        NewsFetcher {
            source,
            feeds: settings.feeds.clone(),
            max_requests: settings.max_requests,
            entries_per_feed: settings.entries_per_feed,
            request_delay: Duration::from_secs(settings.request_delay_secs),
            cache: TtlCache::new(TimeDelta::hours(settings.ttl_hours)),
        }
    }

    pub async fn fetch_industry_news(&self, industry: &str, max_articles: usize) -> Vec<NewsArticle> {
        if let Some(mut cached) = self.cache.get(industry) {
            log::info!("News cache hit for {}", industry);
            cached.truncate(max_articles);
            return cached;
        }

        let mut articles = self.collect(industry, max_articles).await;
        self.cache.insert(industry.to_string(), articles.clone());

        articles.truncate(max_articles);
        articles
    }

    async fn collect(&self, industry: &str, max_articles: usize) -> Vec<NewsArticle> {
        let encoded_industry: String = form_urlencoded::byte_serialize(industry.as_bytes()).collect();
        let mut articles = Vec::new();
        let mut any_feed_read = false;

        for (i, feed_template) in self.feeds.iter().take(self.max_requests).enumerate() {
            if i > 0 {
                tokio::time::sleep(self.request_delay).await;
            }

            let feed_url = feed_template.replace("{industry}", &encoded_industry);
            match self.source.fetch_feed(&feed_url).await {
                Ok(channel) => {
                    any_feed_read = true;
                    let source = feed_source(&feed_url);
                    articles.extend(relevant_articles(
                        &channel,
                        industry,
                        &source,
                        self.entries_per_feed,
                    ));
                }
                Err(e) => log::error!("Error fetching news feed {}: {}", feed_url, e),
            }

            if articles.len() >= max_articles {
                break;
            }
        }

        match any_feed_read {
            true => articles,
            false => {
                log::warn!("No news feed could be read, using placeholder article");
                vec![NewsArticle::fetch_failed(
                    &Local::now().format("%Y-%m-%d").to_string(),
                )]
            }
        }
    }
}

fn feed_source(feed_url: &str) -> String {
    Url::parse(feed_url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_default()
}

pub fn relevant_articles(
    channel: &Channel,
    industry: &str,
    source: &str,
    entries_per_feed: usize,
) -> Vec<NewsArticle> {
    let industry = industry.to_lowercase();

    channel
        .items()
        .iter()
        .take(entries_per_feed)
        .filter_map(|item| {
            let title = item.title().unwrap_or_default();
            let description = item.description().unwrap_or_default();

            let relevant = title.to_lowercase().contains(&industry)
                || description.to_lowercase().contains(&industry);
            if !relevant {
                return None;
            }

            Some(NewsArticle {
                title: title.to_string(),
                summary: clean_summary(description),
                date: item.pub_date().unwrap_or_default().to_string(),
                source: source.to_string(),
            })
        })
        .collect()
}

fn clean_summary(description: &str) -> String {
    let text = match description.contains('<') && description.contains('>') {
        true => Html::parse_fragment(description)
            .root_element()
            .text()
            .collect::<String>(),
        false => description.to_string(),
    };
    let text = text.trim();

    match text.chars().count() > SUMMARY_LIMIT {
        true => format!("{}...", text.chars().take(SUMMARY_LIMIT).collect::<String>()),
        false => text.to_string(),
    }
}
