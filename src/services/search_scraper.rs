use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT},
    Client,
};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use url::Url;

use crate::{configuration::SearchSettings, domain::benchmark::CandidateResult, error::AdvisorError};

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<CandidateResult>, AdvisorError>;
}

#[derive(Serialize)]
struct SearchQuery<'a> {
    q: &'a str,
}

pub struct DuckDuckGoScraper {
    client: Client,
    base_url: String,
}

impl DuckDuckGoScraper {
    pub fn new(settings: &SearchSettings) -> Result<Self, AdvisorError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&settings.user_agent)
                .map_err(|e| AdvisorError::Parse(format!("Invalid user agent: {}", e)))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout())
            .build()?;

        Ok(DuckDuckGoScraper {
            client,
            base_url: settings.base_url.clone(),
        })
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoScraper {
    async fn search(&self, query: &str) -> Result<Vec<CandidateResult>, AdvisorError> {
        let html_content = self
            .client
            .get(&self.base_url)
            .query(&SearchQuery { q: query })
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let results = parse_search_results(&html_content)?;
        log::info!("Found {} results for query: {}", results.len(), query);

        Ok(results)
    }
}

fn selector(css: &str) -> Result<Selector, AdvisorError> {
    Selector::parse(css).map_err(|e| AdvisorError::Parse(format!("Bad selector {}: {}", css, e)))
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

pub fn parse_search_results(html_content: &str) -> Result<Vec<CandidateResult>, AdvisorError> {
    let body_selector = selector(".result__body")?;
    let link_selector = selector(".result__a")?;
    let url_selector = selector(".result__url")?;
    let snippet_selector = selector(".result__snippet")?;

    let document = Html::parse_document(html_content);

    let results = document
        .select(&body_selector)
        .filter_map(|result| {
            let link_tag = result.select(&link_selector).next()?;

            let url = match result.select(&url_selector).next().map(element_text) {
                Some(url) if !url.is_empty() => url,
                _ => link_tag.value().attr("href").map(resolve_href).unwrap_or_default(),
            };

            let snippet = result
                .select(&snippet_selector)
                .next()
                .map(element_text)
                .unwrap_or_default();

            Some(CandidateResult {
                title: element_text(link_tag),
                snippet,
                url,
            })
        })
        .collect();

    Ok(results)
}

/// DuckDuckGo wraps outbound links as `//duckduckgo.com/l/?uddg=<encoded>`.
fn resolve_href(href: &str) -> String {
    let absolute = match href.starts_with("//") {
        true => format!("https:{}", href),
        false => href.to_string(),
    };

    if let Ok(parsed_url) = Url::parse(&absolute) {
        if let Some((_, target)) = parsed_url.query_pairs().find(|(key, _)| key == "uddg") {
            return target.into_owned();
        }
    }

    match href.contains("http") {
        true => href.to_string(),
        false => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_search_results, resolve_href};

    const RESULTS_PAGE: &str = r#"
    <html><body>
      <div class="result results_links">
        <div class="links_main result__body">
          <h2 class="result__title">
            <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.example.com%2Fsaas%2Dchurn&amp;rut=abc">SaaS Churn Benchmarks</a>
          </h2>
          <a class="result__url" href="//duckduckgo.com/l/?uddg=x"> www.example.com/saas-churn </a>
          <a class="result__snippet">The average churn rate for seed SaaS is 5%.</a>
        </div>
      </div>
      <div class="result">
        <div class="result__body">
          <h2><a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fblog.example.org%2Fpost">Blog post</a></h2>
        </div>
      </div>
      <div class="result">
        <div class="result__body"><span>sponsored, no link</span></div>
      </div>
    </body></html>
    "#;

    #[test]
    fn extracts_title_url_and_snippet() {
        let results = parse_search_results(RESULTS_PAGE).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "SaaS Churn Benchmarks");
        assert_eq!(results[0].url, "www.example.com/saas-churn");
        assert_eq!(results[0].snippet, "The average churn rate for seed SaaS is 5%.");
    }

    #[test]
    fn falls_back_to_link_href_without_url_tag() {
        let results = parse_search_results(RESULTS_PAGE).unwrap();

        assert_eq!(results[1].url, "https://blog.example.org/post");
        assert_eq!(results[1].snippet, "");
    }

    #[test]
    fn resolve_href_variants() {
        assert_eq!(resolve_href("https://direct.example.com/a"), "https://direct.example.com/a");
        assert_eq!(resolve_href("/relative/path"), "");
    }

    #[test]
    fn empty_page_has_no_results() {
        assert!(parse_search_results("<html></html>").unwrap().is_empty());
    }
}
