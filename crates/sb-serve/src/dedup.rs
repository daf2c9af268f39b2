use chrono::{DateTime, Duration, Utc};
use sb_core::types::SessionAction;
use std::collections::HashMap;
use std::sync::Mutex;

/// Suppresses repeated delivery of the same logical event within a
/// bounded window. The key is `session_id:action`; entries older than
/// the window are purged before every check, which bounds both memory
/// and the at-most-once guarantee. Identical deliveries spaced farther
/// apart than the window count as new events.
pub struct Deduplicator {
    window: Duration,
    seen: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl Deduplicator {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_default_window() -> Self {
        Self::new(Duration::minutes(10))
    }

    /// Returns `true` when this delivery is a duplicate and must be
    /// dropped. Check-then-insert happens under one lock acquisition so
    /// concurrent deliveries of the same event cannot both pass.
    pub fn observe(&self, session_id: &str, action: SessionAction, now: DateTime<Utc>) -> bool {
        let key = format!("{session_id}:{action}");
        let mut seen = self.seen.lock().expect("dedup lock poisoned");
        seen.retain(|_, first_seen| now.signed_duration_since(*first_seen) <= self.window);
        if seen.contains_key(&key) {
            return true;
        }
        seen.insert(key, now);
        false
    }
}
