// SPDX-License-Identifier: MIT

//! Per-source snapshot cache with a staleness rule.
//!
//! Staleness only gates whether a refresh is *attempted*; the cached payload
//! is never expired. Transient upstream failures must not blank the display.

use crate::models::SourceSnapshot;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Holds the last successfully fetched payload for one source.
#[derive(Debug, Clone, Default)]
pub struct SourceCache<T> {
    snapshot: Option<SourceSnapshot<T>>,
}

impl<T> SourceCache<T> {
    pub fn new() -> Self {
        Self { snapshot: None }
    }

    /// True if no fetch has succeeded yet, or the last success is at least
    /// `interval` old.
    pub fn is_stale(&self, now: DateTime<Utc>, interval: Duration) -> bool {
        match &self.snapshot {
            None => true,
            Some(s) => now - s.fetched_at >= to_chrono(interval),
        }
    }

    /// Last good snapshot, regardless of age.
    pub fn get(&self) -> Option<&SourceSnapshot<T>> {
        self.snapshot.as_ref()
    }

    /// Store a successful fetch. Only ever called on success, so payload and
    /// timestamp are replaced together.
    pub fn put(&mut self, payload: T, now: DateTime<Utc>) {
        self.snapshot = Some(SourceSnapshot::new(payload, now));
    }
}

fn to_chrono(interval: Duration) -> chrono::Duration {
    chrono::Duration::from_std(interval).unwrap_or(chrono::Duration::MAX)
}
