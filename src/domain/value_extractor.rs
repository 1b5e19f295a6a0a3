use std::sync::LazyLock;

use regex::Regex;

use super::benchmark::BenchmarkValue;

/// A number directly followed by `- <digit>` is the low end of a range.
static RANGE_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^%?\s*-\s*\d").expect("range tail pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    AnchoredPercentage,
    AnchoredNumber,
    AnchoredRange,
    NumberBeforeVerb,
    NumberBeforeMetric,
}

/// Strategies are tried in this order; the first one that yields a value wins.
pub const STRATEGY_ORDER: [ExtractionStrategy; 5] = [
    ExtractionStrategy::AnchoredPercentage,
    ExtractionStrategy::AnchoredNumber,
    ExtractionStrategy::AnchoredRange,
    ExtractionStrategy::NumberBeforeVerb,
    ExtractionStrategy::NumberBeforeMetric,
];

pub fn is_percentage_metric(metric_term: &str) -> bool {
    let term = metric_term.to_lowercase();
    term.contains("rate") || term.contains("score")
}

impl ExtractionStrategy {
    pub fn applies_to(self, metric_term: &str) -> bool {
        match self {
            ExtractionStrategy::AnchoredPercentage => is_percentage_metric(metric_term),
            ExtractionStrategy::AnchoredNumber => !is_percentage_metric(metric_term),
            _ => true,
        }
    }

    fn pattern(self, metric_term: &str) -> String {
        let term = regex::escape(metric_term);
        match self {
            ExtractionStrategy::AnchoredPercentage => {
                format!(r"(?:{term}|benchmark|average|median|typical).*?(\d+\.?\d*\s*%)")
            }
            ExtractionStrategy::AnchoredNumber => {
                format!(r"(?:{term}|benchmark|average|median|typical).*?(\d+\.?\d*)")
            }
            ExtractionStrategy::AnchoredRange => format!(
                r"(?:{term}|benchmark|average|median|typical|range).*?(\d+\.?\d*%?\s*-\s*\d+\.?\d*%?)"
            ),
            ExtractionStrategy::NumberBeforeVerb => {
                format!(r"(\d+\.?\d*%?)\s*(?:is|as|the).*?{term}")
            }
            ExtractionStrategy::NumberBeforeMetric => format!(r"(\d+\.?\d*%?)\s*{term}"),
        }
    }

    fn matches_single_number(self) -> bool {
        matches!(
            self,
            ExtractionStrategy::AnchoredPercentage | ExtractionStrategy::AnchoredNumber
        )
    }

    fn compile(self, metric_term: &str) -> Option<Regex> {
        match Regex::new(&self.pattern(metric_term)) {
            Ok(re) => Some(re),
            Err(e) => {
                log::warn!("Could not build {:?} pattern for '{}': {}", self, metric_term, e);
                None
            }
        }
    }

    fn read(self, re: &Regex, text: &str) -> BenchmarkValue {
        let Some(value) = re.captures(text).and_then(|caps| caps.get(1)) else {
            return BenchmarkValue::Absent;
        };

        if self.matches_single_number() && RANGE_TAIL.is_match(&text[value.end()..]) {
            return BenchmarkValue::Absent;
        }

        let value_text = value.as_str().trim();
        match value_text.contains('-') {
            true => parse_range(value_text),
            false => parse_number(value_text),
        }
    }

    pub fn apply(self, snippet: &str, metric_term: &str) -> BenchmarkValue {
        let term = metric_term.to_lowercase();
        if !self.applies_to(&term) {
            return BenchmarkValue::Absent;
        }

        match self.compile(&term) {
            Some(re) => self.read(&re, &snippet.to_lowercase()),
            None => BenchmarkValue::Absent,
        }
    }
}

/// The applicable strategies for one metric term, compiled once and reused
/// across every candidate snippet.
pub struct TermExtractor {
    patterns: Vec<(ExtractionStrategy, Regex)>,
}

impl TermExtractor {
    pub fn new(metric_term: &str) -> Self {
        let term = metric_term.to_lowercase();
        let patterns = STRATEGY_ORDER
            .iter()
            .filter(|strategy| strategy.applies_to(&term))
            .filter_map(|strategy| strategy.compile(&term).map(|re| (*strategy, re)))
            .collect();

        TermExtractor { patterns }
    }

    pub fn extract(&self, snippet: &str) -> BenchmarkValue {
        let text = snippet.to_lowercase();
        self.patterns
            .iter()
            .map(|(strategy, re)| strategy.read(re, &text))
            .find(|value| !value.is_absent())
            .unwrap_or(BenchmarkValue::Absent)
    }
}

pub fn extract(snippet: &str, metric_term: &str) -> BenchmarkValue {
    TermExtractor::new(metric_term).extract(snippet)
}

fn parse_percent_aware(value_text: &str) -> Option<f64> {
    let numeric = value_text.trim_end_matches('%').trim();
    let value = numeric.parse::<f64>().ok()?;
    match value_text.contains('%') {
        true => Some(value / 100.0),
        false => Some(value),
    }
}

fn parse_number(value_text: &str) -> BenchmarkValue {
    match parse_percent_aware(value_text) {
        Some(value) => BenchmarkValue::Numeric(value),
        None => BenchmarkValue::Unparsed(value_text.to_string()),
    }
}

fn parse_range(value_text: &str) -> BenchmarkValue {
    let percent = value_text.contains('%');
    let bounds = value_text.split_once('-').and_then(|(low, high)| {
        let low = low.trim().trim_end_matches('%').trim().parse::<f64>().ok()?;
        let high = high.trim().trim_end_matches('%').trim().parse::<f64>().ok()?;
        Some((low, high))
    });

    match bounds {
        Some((low, high)) => {
            let scale = if percent { 100.0 } else { 1.0 };
            BenchmarkValue::Range {
                low: low / scale,
                high: high / scale,
                raw_text: value_text.to_string(),
            }
        }
        None => BenchmarkValue::Unparsed(value_text.to_string()),
    }
}
