use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::{domain::insights::InsightsReport, error::AdvisorError};

/// Only `[a-z0-9_-]` survive from the company name, so the file always lands
/// directly inside the store directory.
pub fn insights_filename(company_name: &str, at: DateTime<Local>) -> String {
    let stem: String = company_name
        .to_lowercase()
        .chars()
        .map(|c| match c.is_ascii_alphanumeric() || c == '-' {
            true => c,
            false => '_',
        })
        .collect();

    format!("{}_{}.json", stem, at.format("%Y%m%d_%H%M%S"))
}

pub struct InsightsStore {
    dir: PathBuf,
}

impl InsightsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        InsightsStore { dir: dir.into() }
    }

    pub async fn save(
        &self,
        company_name: &str,
        report: &InsightsReport,
    ) -> Result<PathBuf, AdvisorError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(insights_filename(company_name, Local::now()));
        tokio::fs::write(&path, serde_json::to_string_pretty(report)?).await?;

        log::info!("Saved insights for {} to {:?}", company_name, path);
        Ok(path)
    }
}
