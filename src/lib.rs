// SPDX-License-Identifier: MIT

//! Stationdeck: refresh coordination core for a dual-source weather display.
//!
//! Combines real-time readings from a personal weather station (fast
//! cadence, station-scoped, OAuth-protected) with a forecast service (slow
//! cadence, location-scoped) and decides, on each tick or button press,
//! what to re-fetch and how much of the display to repaint.

pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod services;
