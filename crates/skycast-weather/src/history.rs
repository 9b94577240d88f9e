//! Recent-search history that doubles as a lookup cache.
//!
//! Entries are kept most-recent-first, unique by city name (case-insensitive),
//! and capped at [`MAX_HISTORY_ENTRIES`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ForecastResult;

pub const MAX_HISTORY_ENTRIES: usize = 10;

/// One successful lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Creation-time token, unique within a history
    pub id: u64,
    /// Query as entered, trimmed
    pub city: String,
    pub timestamp: DateTime<Utc>,
    pub data: ForecastResult,
}

impl HistoryEntry {
    pub fn matches(&self, city: &str) -> bool {
        same_city(&self.city, city)
    }
}

fn same_city(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHistory {
    entries: Vec<HistoryEntry>,
    last_id: u64,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful lookup. Any existing entry for the same city is
    /// replaced and the new one goes to the front.
    pub fn insert(&mut self, city: &str, data: ForecastResult) -> &HistoryEntry {
        let city = city.trim();
        self.entries.retain(|e| !e.matches(city));

        let now = Utc::now();
        let id = self.next_id(now);
        self.entries.insert(
            0,
            HistoryEntry {
                id,
                city: city.to_string(),
                timestamp: now,
                data,
            },
        );
        self.entries.truncate(MAX_HISTORY_ENTRIES);

        &self.entries[0]
    }

    /// Millisecond timestamp, bumped past anything already issued.
    fn next_id(&mut self, now: DateTime<Utc>) -> u64 {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let mut id = millis.max(self.last_id.saturating_add(1));
        // Only after loading ids at u64::MAX: step down to a free one
        while self.entries.iter().any(|e| e.id == id) {
            id = id.saturating_sub(1);
        }
        self.last_id = self.last_id.max(id);
        id
    }

    pub fn lookup(&self, city: &str) -> Option<&ForecastResult> {
        self.find(city).map(|e| &e.data)
    }

    pub fn find(&self, city: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.matches(city))
    }

    /// Move the entry for `city` to the front. Returns true only when the order
    /// changed, so false for an absent city or one already at the front.
    pub fn promote(&mut self, city: &str) -> bool {
        match self.entries.iter().position(|e| e.matches(city)) {
            Some(0) => false,
            Some(pos) => {
                let entry = self.entries.remove(pos);
                self.entries.insert(0, entry);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace the contents verbatim. Used when restoring persisted state, so
    /// the input is trusted as-is.
    pub fn load(&mut self, entries: Vec<HistoryEntry>) {
        self.last_id = entries.iter().map(|e| e.id).max().unwrap_or(0).max(self.last_id);
        self.entries = entries;
    }

    pub fn serialize(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }

    pub fn deserialize(raw: &str) -> Result<Vec<HistoryEntry>, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
