use std::collections::HashSet;

use itertools::Itertools;

use super::benchmark::{BenchmarkEntry, BenchmarkSet, BenchmarkValue};

pub const LOWER_IS_BETTER: [&str; 6] = [
    "churn_rate",
    "burn_rate",
    "customer_churn_rate",
    "return_rate",
    "order_fulfillment_time",
    "logistics_cost_per_unit",
];

const SIGNIFICANCE_THRESHOLD: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    LowerIsBetter,
    HigherIsBetter,
}

#[derive(Debug, Clone)]
pub struct PolarityTable {
    lower_is_better: HashSet<String>,
}

impl Default for PolarityTable {
    fn default() -> Self {
        PolarityTable::new(LOWER_IS_BETTER.iter().map(|m| m.to_string()))
    }
}

impl PolarityTable {
    pub fn new(lower_is_better: impl IntoIterator<Item = String>) -> Self {
        PolarityTable {
            lower_is_better: lower_is_better.into_iter().collect(),
        }
    }

    pub fn polarity(&self, metric: &str) -> Polarity {
        match self.lower_is_better.contains(metric) {
            true => Polarity::LowerIsBetter,
            false => Polarity::HigherIsBetter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonLabel {
    BetterThan,
    SignificantlyWorseThan,
    CloseTo,
}

impl ComparisonLabel {
    pub fn derive(actual: f64, benchmark: f64, polarity: Polarity) -> Self {
        match polarity {
            Polarity::LowerIsBetter => {
                if actual < benchmark {
                    ComparisonLabel::BetterThan
                } else if actual > benchmark * (1.0 + SIGNIFICANCE_THRESHOLD) {
                    ComparisonLabel::SignificantlyWorseThan
                } else {
                    ComparisonLabel::CloseTo
                }
            }
            Polarity::HigherIsBetter => {
                if actual > benchmark {
                    ComparisonLabel::BetterThan
                } else if actual < benchmark * (1.0 - SIGNIFICANCE_THRESHOLD) {
                    ComparisonLabel::SignificantlyWorseThan
                } else {
                    ComparisonLabel::CloseTo
                }
            }
        }
    }

    pub fn as_phrase(&self) -> &'static str {
        match self {
            ComparisonLabel::BetterThan => "better than",
            ComparisonLabel::SignificantlyWorseThan => "significantly worse than",
            ComparisonLabel::CloseTo => "close to",
        }
    }

    pub fn comparison_word(&self, polarity: Polarity) -> &'static str {
        match (self, polarity) {
            (ComparisonLabel::CloseTo, _) => "similar to",
            (ComparisonLabel::BetterThan, Polarity::LowerIsBetter)
            | (ComparisonLabel::SignificantlyWorseThan, Polarity::HigherIsBetter) => "lower than",
            (ComparisonLabel::BetterThan, Polarity::HigherIsBetter)
            | (ComparisonLabel::SignificantlyWorseThan, Polarity::LowerIsBetter) => "higher than",
        }
    }
}

const NO_BENCHMARK: &str = "(no web benchmark data found)";

pub struct ComparisonNarrator {
    polarity: PolarityTable,
}

impl Default for ComparisonNarrator {
    fn default() -> Self {
        ComparisonNarrator::new(PolarityTable::default())
    }
}

impl ComparisonNarrator {
    pub fn new(polarity: PolarityTable) -> Self {
        ComparisonNarrator { polarity }
    }

    pub fn narrate(&self, metric: &str, actual: f64, entry: Option<&BenchmarkEntry>) -> String {
        let line = format!("{}: {}", metric, actual);

        let Some(entry) = entry else {
            return format!("{} {}", line, NO_BENCHMARK);
        };

        let comparison = match &entry.value {
            BenchmarkValue::Numeric(benchmark) => {
                let polarity = self.polarity.polarity(metric);
                let label = ComparisonLabel::derive(actual, *benchmark, polarity);
                // Benchmarks are always floats, so whole values keep their `.0`.
                format!(
                    " ({} industry benchmark of {:?}, {} average)",
                    label.as_phrase(),
                    benchmark,
                    label.comparison_word(polarity)
                )
            }
            BenchmarkValue::Range { raw_text, .. } => {
                format!(" (industry benchmark range: {})", raw_text)
            }
            BenchmarkValue::Unparsed(_) | BenchmarkValue::Absent => {
                return format!("{} {}", line, NO_BENCHMARK);
            }
        };

        format!("{}{}{}", line, comparison, citation_suffix(entry))
    }

    pub fn narrate_all(&self, kpis: &[(String, f64)], benchmarks: &BenchmarkSet) -> String {
        kpis.iter()
            .map(|(metric, actual)| self.narrate(metric, *actual, benchmarks.get(metric)))
            .join("\n")
    }
}

fn citation_suffix(entry: &BenchmarkEntry) -> String {
    match (entry.source_title.is_empty(), entry.source_url.is_empty()) {
        (true, _) => String::new(),
        (false, true) => format!(" | Source: {}", entry.source_title),
        (false, false) => format!(" | Source: {} ({})", entry.source_title, entry.source_url),
    }
}
