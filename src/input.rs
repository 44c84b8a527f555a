// SPDX-License-Identifier: MIT

//! Button event routing.
//!
//! The host's event loop calls [`InputRouter::on_button`] when a physical
//! button fires. The call does not return until the coordinator has at
//! least attempted the triggered refresh, so the activity indicator is
//! visibly tied to the press.
//!
//! Button mapping:
//! - Button 1: previous station
//! - Button 2: next station
//! - Button 3: force full refresh
//! - Button 4: reserved

use crate::services::coordinator::{RefreshCoordinator, RefreshResult};
use crate::services::directory::CycleDirection;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub type ButtonId = u8;

pub const BUTTON_PREVIOUS_STATION: ButtonId = 1;
pub const BUTTON_NEXT_STATION: ButtonId = 2;
pub const BUTTON_FORCE_REFRESH: ButtonId = 3;

/// Translates discrete button events into coordinator commands.
pub struct InputRouter {
    coordinator: Arc<RefreshCoordinator>,
}

impl InputRouter {
    pub fn new(coordinator: Arc<RefreshCoordinator>) -> Self {
        Self { coordinator }
    }

    /// Handle one button press. Unrecognized ids are ignored, not errors.
    pub async fn on_button(&self, id: ButtonId, now: DateTime<Utc>) -> RefreshResult {
        tracing::info!(button = id, "button pressed");
        match id {
            BUTTON_PREVIOUS_STATION => {
                self.coordinator
                    .cycle_station(CycleDirection::Previous, now)
                    .await
            }
            BUTTON_NEXT_STATION => {
                self.coordinator
                    .cycle_station(CycleDirection::Next, now)
                    .await
            }
            BUTTON_FORCE_REFRESH => self.coordinator.force_full_refresh(now).await,
            other => {
                tracing::debug!(button = other, "no action mapped, ignoring");
                RefreshResult::no_change()
            }
        }
    }
}
