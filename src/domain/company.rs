use itertools::Itertools;
use serde_json::{Map, Value};

use crate::error::AdvisorError;

#[derive(Debug, Clone, Default)]
pub struct CompanyProfile {
    fields: Map<String, Value>,
}

impl CompanyProfile {
    pub fn new(fields: Map<String, Value>) -> Self {
        CompanyProfile { fields }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn field_or(&self, key: &str, default: &str) -> String {
        match self.fields.get(key) {
            Some(Value::Null) | None => default.to_string(),
            Some(value) => display_value(value),
        }
    }

    pub fn name(&self) -> String {
        self.field_or("name", "company")
    }

    pub fn industry(&self) -> String {
        self.field_or("industry", "Technology")
    }

    pub fn stage(&self) -> String {
        self.field_or("stage", "Early-stage")
    }

    pub fn product(&self) -> String {
        self.field_or("product", "")
    }

    pub fn attribute(&self, key: &str) -> String {
        self.field_or(key, "unknown")
    }

    pub fn describe(&self) -> String {
        self.fields
            .iter()
            .map(|(key, value)| format!("{}: {}", key, display_value(value)))
            .join("\n")
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KpiSnapshot {
    metrics: Vec<(String, f64)>,
}

impl TryFrom<Map<String, Value>> for KpiSnapshot {
    type Error = AdvisorError;

    fn try_from(value: Map<String, Value>) -> Result<Self, Self::Error> {
        let metrics = value
            .into_iter()
            .map(|(metric, raw)| match raw.as_f64() {
                Some(number) => Ok((metric, number)),
                None => Err(AdvisorError::Validation(format!(
                    "KPI '{}' must be a number, got {}",
                    metric, raw
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(KpiSnapshot { metrics })
    }
}

impl KpiSnapshot {
    pub fn metrics(&self) -> &[(String, f64)] {
        &self.metrics
    }

    pub fn metric_names(&self) -> Vec<String> {
        self.metrics.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
