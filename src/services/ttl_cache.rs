use std::{collections::HashMap, sync::Mutex};

use chrono::{DateTime, TimeDelta, Utc};

struct TtlEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// One cache namespace. Each entry carries its own expiry, so refreshing a
/// key never changes how fresh any other key (or any other cache) looks.
pub struct TtlCache<V> {
    ttl: TimeDelta,
    entries: Mutex<HashMap<String, TtlEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: TimeDelta) -> Self {
        TtlCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Utc::now())
    }

    pub fn insert(&self, key: String, value: V) {
        self.insert_at(key, value, Utc::now())
    }

    pub(crate) fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<V> {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub(crate) fn insert_at(&self, key: String, value: V, now: DateTime<Utc>) {
        let entry = TtlEntry {
            value,
            expires_at: now + self.ttl,
        };
        self.entries
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(key, entry);
    }
}
