use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::AdvisorError;

pub const DEFAULT_DAILY_LIMIT: u32 = 300;

pub trait QuotaTracker: Send + Sync {
    fn try_consume(&self) -> bool;

    fn daily_limit(&self) -> u32;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaRecord {
    pub date: String,
    pub count: u32,
}

impl QuotaRecord {
    fn fresh(today: NaiveDate) -> Self {
        QuotaRecord {
            date: day_string(today),
            count: 0,
        }
    }

    fn for_day(self, today: NaiveDate) -> Self {
        match self.date == day_string(today) {
            true => self,
            false => QuotaRecord::fresh(today),
        }
    }

    fn consume(&mut self, limit: u32) -> bool {
        if self.count >= limit {
            return false;
        }
        self.count += 1;
        true
    }
}

fn day_string(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub struct FileQuotaTracker {
    path: PathBuf,
    limit: u32,
    lock: Mutex<()>,
}

impl FileQuotaTracker {
    pub fn new(path: impl Into<PathBuf>, limit: u32) -> Self {
        FileQuotaTracker {
            path: path.into(),
            limit,
            lock: Mutex::new(()),
        }
    }

    fn load(&self, today: NaiveDate) -> QuotaRecord {
        let record = fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_json::from_str::<QuotaRecord>(&content).ok());

        match record {
            Some(record) => record.for_day(today),
            None => QuotaRecord::fresh(today),
        }
    }

    fn save(&self, record: &QuotaRecord) -> Result<(), AdvisorError> {
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_string(record)?)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn try_consume_on(&self, today: NaiveDate) -> bool {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut record = self.load(today);
        if !record.consume(self.limit) {
            log::warn!("Daily completion limit of {} reached", self.limit);
            return false;
        }

        match self.save(&record) {
            Ok(()) => true,
            Err(e) => {
                log::error!(
                    "Failed to persist request count to {:?}, refusing call: {}",
                    self.path,
                    e
                );
                false
            }
        }
    }
}

impl QuotaTracker for FileQuotaTracker {
    fn try_consume(&self) -> bool {
        self.try_consume_on(today())
    }

    fn daily_limit(&self) -> u32 {
        self.limit
    }
}

pub struct InMemoryQuotaTracker {
    record: Mutex<QuotaRecord>,
    limit: u32,
}

impl InMemoryQuotaTracker {
    pub fn new(limit: u32) -> Self {
        InMemoryQuotaTracker {
            record: Mutex::new(QuotaRecord::fresh(today())),
            limit,
        }
    }

    fn try_consume_on(&self, today: NaiveDate) -> bool {
        let mut record = self.record.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *record = record.clone().for_day(today);
        record.consume(self.limit)
    }

    pub fn used(&self) -> u32 {
        self.record.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).count
    }
}

impl QuotaTracker for InMemoryQuotaTracker {
    fn try_consume(&self) -> bool {
        self.try_consume_on(today())
    }

    fn daily_limit(&self) -> u32 {
        self.limit
    }
}
