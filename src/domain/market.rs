use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_string_from_number;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub summary: String,
    pub date: String,
    pub source: String,
}

impl NewsArticle {
    pub fn fetch_failed(date: &str) -> Self {
        NewsArticle {
            title: "News fetching failed".to_string(),
            summary: "Unable to retrieve current industry news. Working with existing knowledge."
                .to_string(),
            date: date.to_string(),
            source: "system".to_string(),
        }
    }
}

fn unknown() -> String {
    "Unknown".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    #[serde(default = "unknown")]
    pub name: String,
    #[serde(default = "unknown")]
    pub description: String,
    #[serde(default = "unknown")]
    pub differentiator: String,
    #[serde(default = "unknown", deserialize_with = "deserialize_string_from_number")]
    pub founded: String,
    #[serde(default = "unknown")]
    pub status: String,
}

impl Competitor {
    pub fn unknown() -> Self {
        Competitor {
            name: "Unknown Competitor".to_string(),
            description: "Information unavailable due to data retrieval error".to_string(),
            differentiator: unknown(),
            founded: unknown(),
            status: unknown(),
        }
    }
}

pub fn format_news(articles: &[NewsArticle]) -> String {
    articles
        .iter()
        .map(|a| {
            format!(
                "- {}: {} | Source: {}, Date: {}",
                a.title, a.summary, a.source, a.date
            )
        })
        .join("\n")
}

pub fn format_competitors(competitors: &[Competitor]) -> String {
    competitors
        .iter()
        .map(|c| {
            format!(
                "- {}: {} | Differentiator: {} | Founded: {} | Status: {}",
                c.name, c.description, c.differentiator, c.founded, c.status
            )
        })
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn competitor_fields_default_to_unknown() {
        let competitor: Competitor = serde_json::from_str(r#"{"name": "Razorpay"}"#).unwrap();

        assert_eq!(competitor.name, "Razorpay");
        assert_eq!(competitor.founded, "Unknown");
        assert_eq!(competitor.status, "Unknown");
    }

    #[test]
    fn founded_year_may_be_a_number() {
        let competitor: Competitor =
            serde_json::from_str(r#"{"name": "Razorpay", "founded": 2014}"#).unwrap();

        assert_eq!(competitor.founded, "2014");
    }

    #[test]
    fn formats_one_line_per_competitor() {
        let text = format_competitors(&[Competitor::unknown(), Competitor::unknown()]);

        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("- Unknown Competitor: Information unavailable"));
    }

    #[test]
    fn formats_news_with_source_and_date() {
        let text = format_news(&[NewsArticle {
            title: "FinTech raises".into(),
            summary: "A round".into(),
            date: "Mon, 01 Jan 2024".into(),
            source: "inc42.com".into(),
        }]);

        assert_eq!(text, "- FinTech raises: A round | Source: inc42.com, Date: Mon, 01 Jan 2024");
    }
}
