use chrono::{DateTime, Datelike, TimeZone, Utc};
use std::sync::RwLock;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// Single-value cache with an explicit expiry. Time is always supplied by the caller.
#[derive(Debug)]
pub struct ExpiringCache<V> {
    entry: RwLock<Option<Entry<V>>>,
}

impl<V> Default for ExpiringCache<V> {
    fn default() -> Self {
        Self {
            entry: RwLock::new(None),
        }
    }
}

impl<V: Clone> ExpiringCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached value if it has not expired at `now`.
    pub fn get(&self, now: DateTime<Utc>) -> Option<V> {
        let entry = self.entry.read().unwrap_or_else(|p| p.into_inner());
        entry
            .as_ref()
            .filter(|e| now < e.expires_at)
            .map(|e| e.value.clone())
    }

    /// The cached value regardless of expiry.
    pub fn get_stale(&self) -> Option<V> {
        let entry = self.entry.read().unwrap_or_else(|p| p.into_inner());
        entry.as_ref().map(|e| e.value.clone())
    }

    pub fn put(&self, value: V, expires_at: DateTime<Utc>) {
        let mut entry = self.entry.write().unwrap_or_else(|p| p.into_inner());
        *entry = Some(Entry { value, expires_at });
    }
}

/// Midnight UTC on the first day of the month after `now`.
pub fn start_of_next_month(now: DateTime<Utc>) -> DateTime<Utc> {
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}
