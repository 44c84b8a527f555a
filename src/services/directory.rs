// SPDX-License-Identifier: MIT

//! Station directory: the listing of reachable stations and the cursor
//! pointing at the currently selected one.
//!
//! Selection is pure state mutation with no I/O. The listing itself is
//! replaced only on an explicit directory reload, not on the fast cadence.

use crate::models::Station;

/// Direction to move the selection cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleDirection {
    Next,
    Previous,
}

/// Cached station listing plus the selected index.
#[derive(Debug, Clone, Default)]
pub struct StationDirectory {
    stations: Vec<Station>,
    selected: usize,
}

impl StationDirectory {
    pub fn new(stations: Vec<Station>) -> Self {
        Self {
            stations,
            selected: 0,
        }
    }

    pub fn list(&self) -> &[Station] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Currently selected station, `None` only when the directory is empty.
    pub fn current(&self) -> Option<&Station> {
        self.stations.get(self.selected)
    }

    /// Zero-based index of the current selection.
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Move the selection one step, wrapping around the listing.
    ///
    /// With zero or one station this is a no-op that returns the existing
    /// selection unchanged — never an error.
    pub fn cycle(&mut self, direction: CycleDirection) -> Option<&Station> {
        let len = self.stations.len();
        if len > 1 {
            self.selected = match direction {
                CycleDirection::Next => (self.selected + 1) % len,
                CycleDirection::Previous => (self.selected + len - 1) % len,
            };
        }
        self.current()
    }

    /// Replace the listing from a directory refresh, keeping the current
    /// selection by station id when it survived the reload.
    pub fn replace(&mut self, stations: Vec<Station>) {
        let keep_id = self.current().map(|s| s.id.clone());
        self.stations = stations;
        self.selected = keep_id
            .and_then(|id| self.stations.iter().position(|s| s.id == id))
            .unwrap_or(0);
    }
}
