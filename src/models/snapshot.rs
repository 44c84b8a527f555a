// SPDX-License-Identifier: MIT

//! Last-known-good payload from one source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A successfully fetched payload and the time it was fetched.
///
/// Payload and timestamp travel together: a failed fetch never produces a
/// snapshot, so a snapshot is always internally consistent. Stale-but-valid
/// beats empty — the display keeps serving the last snapshot through
/// upstream outages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSnapshot<T> {
    pub payload: T,
    pub fetched_at: DateTime<Utc>,
}

impl<T> SourceSnapshot<T> {
    pub fn new(payload: T, fetched_at: DateTime<Utc>) -> Self {
        Self {
            payload,
            fetched_at,
        }
    }

    /// Age of this snapshot relative to `now`. Saturates to zero if the
    /// clock stepped backwards.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        (now - self.fetched_at).max(chrono::Duration::zero())
    }
}
