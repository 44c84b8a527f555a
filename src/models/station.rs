// SPDX-License-Identifier: MIT

//! Weather station identity and placement.

use serde::{Deserialize, Serialize};

/// Geographic coordinates of a station.
///
/// Compared exactly: two stations at the "same" place report identical
/// coordinates, so float comparison is sufficient to detect a location
/// change between fetches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

/// A selectable physical sensor station, immutable once listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Upstream device ID (a MAC-address-like string)
    pub id: String,
    /// Human-readable station name shown in the display header
    pub display_name: String,
    pub location: Location,
}

impl Station {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            location: Location { lat, lon },
        }
    }
}
