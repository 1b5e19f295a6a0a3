use std::{collections::HashMap, sync::Mutex};

use crate::domain::benchmark::BenchmarkSet;

/// Process-lifetime store of benchmark batches per industry/stage.
/// Entries are never expired or invalidated.
#[derive(Default)]
pub struct BenchmarkCache {
    batches: Mutex<HashMap<String, BenchmarkSet>>,
}

impl BenchmarkCache {
    pub fn key(industry: &str, stage: &str) -> String {
        format!("{}_{}", industry.to_lowercase(), stage.to_lowercase())
    }

    pub fn get(&self, key: &str) -> Option<BenchmarkSet> {
        self.batches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    pub fn insert(&self, key: String, batch: BenchmarkSet) {
        self.batches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, batch);
    }
}
