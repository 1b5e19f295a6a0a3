use std::sync::LazyLock;

use regex::Regex;

const BENCHMARK_INDICATORS: [&str; 6] = [
    "benchmark",
    "average",
    "median",
    "typical",
    "standard",
    "industry",
];

static NUMBER_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+\.?\d*%?").expect("number pattern is valid")
});

/// Every whitespace token of the term must appear somewhere in the title or
/// snippet (not necessarily adjacent), and the text must also carry either a
/// benchmark word or something that looks like a number.
pub fn classify(title: &str, snippet: &str, metric_term: &str) -> bool {
    let text = format!("{} {}", title, snippet).to_lowercase();
    let metric_term = metric_term.to_lowercase();

    let has_metric_terms = metric_term
        .split_whitespace()
        .all(|token| text.contains(token));

    let has_indicator = BENCHMARK_INDICATORS
        .iter()
        .any(|indicator| text.contains(indicator));

    has_metric_terms && (has_indicator || NUMBER_LIKE.is_match(&text))
}

#[cfg(test)]
mod tests {
    use super::classify;

    #[test]
    fn accepts_snippet_with_terms_and_indicator() {
        assert!(classify(
            "SaaS Metrics 2024",
            "The average churn rate for seed startups",
            "churn rate"
        ));
    }

    #[test]
    fn accepts_snippet_with_terms_and_number_only() {
        assert!(classify("Churn report", "Our churn rate hit 7% last year", "churn rate"));
    }

    #[test]
    fn tokens_need_not_be_adjacent() {
        assert!(classify(
            "Rate of churn",
            "industry data on customer churn",
            "churn rate"
        ));
    }

    #[test]
    fn rejects_when_any_metric_token_missing() {
        assert!(!classify(
            "Industry benchmark report",
            "The median customer churn is 5% across the industry",
            "customer churn rate"
        ));
    }

    #[test]
    fn rejects_without_indicator_or_number() {
        assert!(!classify("Reducing churn rate", "Tips to keep customers happy", "churn rate"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert!(classify("CAC PAYBACK", "MEDIAN CAC payback", "cac payback"));
    }
}
