use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::{benchmark::BenchmarkSet, market::NewsArticle};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwotAnalysis {
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub weaknesses: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub opportunities: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub threats: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub source: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: String,
}

/// The report returned to callers. Degraded reports only carry
/// `executive_summary` plus `error` (and `full_response` when the model
/// replied with something unparseable).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightsReport {
    #[serde(default, deserialize_with = "lenient_string")]
    pub executive_summary: String,
    #[serde(
        default,
        deserialize_with = "lenient_swot",
        skip_serializing_if = "Option::is_none"
    )]
    pub swot_analysis: Option<SwotAnalysis>,
    #[serde(
        default,
        deserialize_with = "lenient_string_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub growth_tactics: Vec<String>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub competitive_positioning: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub kpi_action_items: Vec<String>,
    #[serde(default, deserialize_with = "lenient_citations")]
    pub citations: Vec<Citation>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub full_response: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// Model replies drift in shape (null urls, numeric dates, nested objects
// where prose was asked for). Any valid JSON value is accepted and turned
// into text rather than failing the whole report.

fn value_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(value_text(Value::deserialize(deserializer)?))
}

fn lenient_optional_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        value => Some(value_text(value)),
    })
}

fn lenient_string_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => vec![],
        Value::Array(items) => items.into_iter().map(value_text).collect(),
        value => vec![value_text(value)],
    })
}

fn lenient_swot<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<SwotAnalysis>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

fn lenient_citations<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<Citation>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => vec![],
    })
}

impl InsightsReport {
    pub fn malformed(raw_response: &str) -> Self {
        InsightsReport {
            executive_summary: "Analysis completed but formatting error occurred.".to_string(),
            full_response: Some(raw_response.to_string()),
            error: Some("JSON parsing failed".to_string()),
            ..Default::default()
        }
    }

    pub fn failed(reason: &str) -> Self {
        InsightsReport {
            executive_summary: "Error generating insights".to_string(),
            error: Some(reason.to_string()),
            ..Default::default()
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    /// Parses the model reply, tolerating prose before or after the JSON
    /// object. Only a reply without a valid JSON object is `malformed`.
    pub fn from_model_response(raw_response: &str) -> Self {
        let Some(json) = extract_json_object(raw_response) else {
            log::warn!("Could not find JSON in model response");
            return InsightsReport::malformed(raw_response);
        };

        let fields = match serde_json::from_str::<Map<String, Value>>(json) {
            Ok(fields) => fields,
            Err(e) => {
                log::warn!("Couldn't parse model response as JSON: {:?}", e);
                return InsightsReport::malformed(raw_response);
            }
        };

        match serde_json::from_value::<InsightsReport>(Value::Object(fields)) {
            Ok(report) => report,
            Err(e) => {
                log::warn!("Model response has an unusable shape: {:?}", e);
                InsightsReport::malformed(raw_response)
            }
        }
    }

    fn known_sources(&self) -> HashSet<String> {
        self.citations.iter().map(|c| c.source.clone()).collect()
    }

    pub fn merge_news_citations(&mut self, articles: &[NewsArticle]) {
        let mut seen = self.known_sources();

        for article in articles {
            if article.source.is_empty() || seen.contains(&article.source) {
                continue;
            }
            self.citations.push(Citation {
                id: format!("news_{}", self.citations.len() + 1),
                source: article.source.clone(),
                title: article.title.clone(),
                date: article.date.clone(),
                url: String::new(),
            });
            seen.insert(article.source.clone());
        }
    }

    pub fn merge_benchmark_citations(
        &mut self,
        metric_names: &[String],
        benchmarks: &BenchmarkSet,
        retrieved_on: &str,
    ) {
        let mut seen = self.known_sources();

        for metric in metric_names {
            let Some(entry) = benchmarks.get(metric) else {
                continue;
            };
            if entry.source_title.is_empty() || seen.contains(&entry.source_title) {
                continue;
            }
            self.citations.push(Citation {
                id: format!("benchmark_{}", self.citations.len() + 1),
                source: entry.source_title.clone(),
                title: format!("Benchmark data for {}", metric),
                date: format!("Retrieved {}", retrieved_on),
                url: entry.source_url.clone(),
            });
            seen.insert(entry.source_title.clone());
        }
    }
}

pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

pub fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::benchmark::{BenchmarkEntry, BenchmarkValue};

    const MODEL_REPLY: &str = r#"Here is the analysis:
```json
{
  "executive_summary": "Solid early traction [citation1].",
  "swot_analysis": {
    "strengths": ["Low churn"],
    "weaknesses": ["Small team"],
    "opportunities": ["UPI growth [citation1]"],
    "threats": ["Incumbents"]
  },
  "growth_tactics": ["Partner with banks"],
  "competitive_positioning": "Focus on tier-2 cities",
  "kpi_action_items": ["Improve activation"],
  "market_outlook": "positive",
  "citations": [
    {"id": "citation1", "source": "inc42.com", "title": "UPI volumes", "date": "2024-01-01", "url": ""}
  ]
}
```"#;

    #[test]
    fn parses_reply_surrounded_by_prose() {
        let report = InsightsReport::from_model_response(MODEL_REPLY);

        assert!(!report.is_degraded());
        assert_eq!(report.executive_summary, "Solid early traction [citation1].");
        assert_eq!(report.swot_analysis.unwrap().strengths, vec!["Low churn"]);
        assert_eq!(report.citations.len(), 1);
        assert_eq!(report.extra.get("market_outlook"), Some(&Value::from("positive")));
    }

    #[test]
    fn missing_citations_default_to_empty() {
        let report = InsightsReport::from_model_response(r#"{"executive_summary": "ok"}"#);

        assert!(report.citations.is_empty());
        assert!(!report.is_degraded());
    }

    #[test]
    fn loosely_typed_fields_are_kept() {
        let report = InsightsReport::from_model_response(
            r#"{
              "executive_summary": "ok",
              "swot_analysis": {"strengths": ["Fast", 3], "threats": null},
              "growth_tactics": "Referral program",
              "competitive_positioning": {"summary": "x"},
              "citations": [
                {"id": "citation1", "source": "Inc42", "title": "UPI", "date": 2024, "url": null},
                "not a citation"
              ]
            }"#,
        );

        assert!(!report.is_degraded());
        assert_eq!(
            report.citations,
            vec![Citation {
                id: "citation1".into(),
                source: "Inc42".into(),
                title: "UPI".into(),
                date: "2024".into(),
                url: "".into(),
            }]
        );
        let swot = report.swot_analysis.unwrap();
        assert_eq!(swot.strengths, vec!["Fast", "3"]);
        assert!(swot.threats.is_empty());
        assert_eq!(report.growth_tactics, vec!["Referral program"]);
        assert_eq!(
            report.competitive_positioning.as_deref(),
            Some(r#"{"summary":"x"}"#)
        );
    }

    #[test]
    fn reply_without_braces_is_malformed() {
        let report = InsightsReport::from_model_response("I cannot help with that");

        assert_eq!(report.error.as_deref(), Some("JSON parsing failed"));
        assert_eq!(report.full_response.as_deref(), Some("I cannot help with that"));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let report = InsightsReport::from_model_response("{ executive_summary: nope }");

        assert!(report.is_degraded());
        assert!(report.full_response.is_some());
    }

    #[test]
    fn news_citations_skip_known_sources() {
        let mut report = InsightsReport::from_model_response(MODEL_REPLY);
        let article = |title: &str, source: &str| NewsArticle {
            title: title.into(),
            summary: "".into(),
            date: "Tue".into(),
            source: source.into(),
        };

        report.merge_news_citations(&[
            article("UPI volumes", "inc42.com"),
            article("Seed rounds", "yourstory.com"),
            article("More seed rounds", "yourstory.com"),
        ]);

        assert_eq!(report.citations.len(), 2);
        assert_eq!(report.citations[1].id, "news_2");
        assert_eq!(report.citations[1].source, "yourstory.com");
    }

    #[test]
    fn benchmark_citations_use_source_title() {
        let mut report = InsightsReport::default();
        let mut benchmarks = BenchmarkSet::default();
        benchmarks.record(
            "churn_rate",
            Some(BenchmarkEntry {
                metric: "churn_rate".into(),
                value: BenchmarkValue::Numeric(0.05),
                source_title: "FinTech churn report".into(),
                source_snippet: "".into(),
                source_url: "https://example.com/churn".into(),
            }),
        );
        benchmarks.record("cac", None);

        report.merge_benchmark_citations(
            &["churn_rate".to_string(), "cac".to_string()],
            &benchmarks,
            "2024-05-01",
        );

        assert_eq!(
            report.citations,
            vec![Citation {
                id: "benchmark_1".into(),
                source: "FinTech churn report".into(),
                title: "Benchmark data for churn_rate".into(),
                date: "Retrieved 2024-05-01".into(),
                url: "https://example.com/churn".into(),
            }]
        );
    }

    #[test]
    fn json_array_is_located_inside_text() {
        assert_eq!(extract_json_array("Sure: [1, 2] done"), Some("[1, 2]"));
        assert_eq!(extract_json_array("no array"), None);
    }
}
