// SPDX-License-Identifier: MIT

//! Data model: stations, weather payloads, snapshots.

pub mod snapshot;
pub mod station;
pub mod weather;

pub use snapshot::SourceSnapshot;
pub use station::{Location, Station};
pub use weather::{DailyForecast, Forecast, ForecastConditions, HourlyForecast, SensorReading};
