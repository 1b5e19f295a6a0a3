use std::collections::HashMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkQuery {
    pub industry: String,
    pub stage: String,
    pub metric_names: Vec<String>,
}

impl BenchmarkQuery {
    pub fn new(industry: &str, stage: &str, metric_names: Vec<String>) -> Self {
        BenchmarkQuery {
            industry: industry.to_string(),
            stage: stage.to_string(),
            metric_names,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CandidateResult {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BenchmarkValue {
    Numeric(f64),
    Range { low: f64, high: f64, raw_text: String },
    Unparsed(String),
    Absent,
}

impl BenchmarkValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, BenchmarkValue::Absent)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkEntry {
    pub metric: String,
    pub value: BenchmarkValue,
    pub source_title: String,
    pub source_snippet: String,
    pub source_url: String,
}

impl BenchmarkEntry {
    pub fn from_candidate(metric: &str, value: BenchmarkValue, candidate: &CandidateResult) -> Self {
        BenchmarkEntry {
            metric: metric.to_string(),
            value,
            source_title: candidate.title.clone(),
            source_snippet: candidate.snippet.clone(),
            source_url: candidate.url.clone(),
        }
    }
}

/// Benchmarks keyed by metric name. Only attempted metrics are present;
/// an attempted metric without a usable hit maps to `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkSet {
    entries: HashMap<String, Option<BenchmarkEntry>>,
}

impl BenchmarkSet {
    pub fn record(&mut self, metric: &str, entry: Option<BenchmarkEntry>) {
        self.entries.insert(metric.to_string(), entry);
    }

    pub fn get(&self, metric: &str) -> Option<&BenchmarkEntry> {
        self.entries.get(metric).and_then(|e| e.as_ref())
    }

    pub fn was_attempted(&self, metric: &str) -> bool {
        self.entries.contains_key(metric)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn filtered(&self, metric_names: &[String]) -> BenchmarkSet {
        BenchmarkSet {
            entries: self
                .entries
                .iter()
                .filter(|(metric, _)| metric_names.contains(metric))
                .map(|(metric, entry)| (metric.clone(), entry.clone()))
                .collect(),
        }
    }
}

pub fn metric_search_term(metric_name: &str) -> String {
    metric_name.replace('_', " ")
}
