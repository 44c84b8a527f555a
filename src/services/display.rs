// SPDX-License-Identifier: MIT

//! Partial-vs-full redraw decision.
//!
//! A forecast change or a station switch invalidates layout-level content
//! (location title, forecast panel), which a partial update cannot safely
//! patch. A sensor-only change is confined to a region whose bounds are
//! known in advance, so it qualifies for a partial refresh — much cheaper
//! on e-ink panels.

use crate::services::coordinator::RefreshResult;

/// What the render collaborator should repaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderDecision {
    /// Nothing changed; leave the panel alone.
    Skip,
    /// Repaint only the sensor readings region.
    PartialSensorRegion,
    /// Repaint the entire display surface.
    FullRedraw,
}

/// Consumes refresh results and decides the redraw mode. Does not render.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayStateTracker;

impl DisplayStateTracker {
    pub fn new() -> Self {
        Self
    }

    pub fn on_refresh_result(&self, result: &RefreshResult) -> RenderDecision {
        if result.station_switched || result.forecast_changed {
            RenderDecision::FullRedraw
        } else if result.sensor_changed {
            RenderDecision::PartialSensorRegion
        } else {
            RenderDecision::Skip
        }
    }
}
