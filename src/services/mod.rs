// SPDX-License-Identifier: MIT

//! Services module - refresh logic and upstream clients.

pub mod cache;
pub mod coordinator;
pub mod directory;
pub mod display;
pub mod forecast_api;
pub mod sensor_api;
pub mod token;

pub use cache::SourceCache;
pub use coordinator::{
    ActivityIndicator, ForecastFetch, RefreshCoordinator, RefreshResult, RenderParams, SensorFetch,
};
pub use directory::{CycleDirection, StationDirectory};
pub use display::{DisplayStateTracker, RenderDecision};
pub use forecast_api::ForecastApiClient;
pub use sensor_api::SensorApiClient;
pub use token::{Credential, RenewedToken, TokenManager, TokenRenew};
