// SPDX-License-Identifier: MIT

//! The scheduling brain: decides on each tick or external trigger which
//! sources must be refreshed, issues the fetches, updates the caches, and
//! reports what actually changed.
//!
//! The sensor source is cheap and rate-generous but only meaningful fresh;
//! the forecast source is rate-limited and coarse-grained. Hence the two
//! independent cadences. A station switch forces both: the old payloads are
//! wrong *content* for the new station, not merely old.

use crate::error::{FetchResult, RefreshError};
use crate::models::{Forecast, Location, SensorReading, SourceSnapshot, Station};
use crate::services::cache::SourceCache;
use crate::services::directory::{CycleDirection, StationDirectory};
use crate::services::token::TokenManager;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Sensor-side fetch capability, implemented by the sensor API client.
#[async_trait]
pub trait SensorFetch: Send + Sync {
    /// Fetch the current reading for one station.
    async fn fetch_sensor_data(
        &self,
        access_token: &str,
        station: &Station,
    ) -> FetchResult<SensorReading>;

    /// Fetch the listing of stations reachable by the credential.
    async fn list_stations(&self, access_token: &str) -> FetchResult<Vec<Station>>;
}

/// Forecast fetch capability.
#[async_trait]
pub trait ForecastFetch: Send + Sync {
    async fn fetch_forecast(&self, location: Location) -> FetchResult<Forecast>;
}

/// Activity LED sink. A plain synchronous write; the host maps it to GPIO.
pub trait ActivityIndicator: Send + Sync {
    fn set_indicator(&self, on: bool);
}

/// What a refresh cycle actually replaced (not merely attempted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshResult {
    pub sensor_changed: bool,
    pub forecast_changed: bool,
    /// The selected station changed in the triggering command.
    pub station_switched: bool,
}

impl RefreshResult {
    pub fn no_change() -> Self {
        Self::default()
    }

    pub fn is_no_change(&self) -> bool {
        *self == Self::default()
    }
}

/// What triggered a refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshTrigger {
    Tick,
    ForceFull,
    StationChanged,
}

/// Scheduler state, created once at startup with all timestamps unset so
/// the first cycle fetches both sources.
///
/// The last-fetch timestamps advance on every *attempt* (success or
/// definitive failure); retrying a failing upstream on its normal cadence
/// instead of every tick keeps us from hammering it.
#[derive(Debug, Clone, Default)]
struct RefreshState {
    last_sensor_fetch: Option<DateTime<Utc>>,
    last_forecast_fetch: Option<DateTime<Utc>>,
    /// Location used by the last *successful* forecast fetch. Advancing it
    /// on failure would mask a pending location-driven refresh after a
    /// transient error.
    forecast_location_at_last_fetch: Option<Location>,
}

/// Everything the refresh algorithm mutates, behind one lock.
struct Inner {
    directory: StationDirectory,
    sensor_cache: SourceCache<SensorReading>,
    forecast_cache: SourceCache<Forecast>,
    state: RefreshState,
}

/// Snapshot of everything the render collaborator needs.
#[derive(Debug, Clone)]
pub struct RenderParams {
    pub sensor: Option<SourceSnapshot<SensorReading>>,
    pub forecast: Option<SourceSnapshot<Forecast>>,
    pub station: Option<Station>,
    /// 1-based position of the selection, for a "2/3" header badge.
    pub station_index: usize,
    pub station_count: usize,
    /// Data-age flags so the template can mark degraded panels.
    pub sensor_stale: bool,
    pub forecast_stale: bool,
}

/// Coordinates the two fetch cadences, the credential, and the station
/// cursor. All entry points funnel through one critical section: a
/// button-triggered refresh and a timer tick never interleave their fetch
/// steps. A trigger arriving mid-cycle waits, then re-evaluates staleness
/// (and typically finds nothing further due).
pub struct RefreshCoordinator {
    tokens: Arc<TokenManager>,
    sensor: Arc<dyn SensorFetch>,
    forecast: Arc<dyn ForecastFetch>,
    indicator: Arc<dyn ActivityIndicator>,
    sensor_interval: Duration,
    forecast_interval: Duration,
    inner: tokio::sync::Mutex<Inner>,
}

impl RefreshCoordinator {
    pub fn new(
        tokens: Arc<TokenManager>,
        sensor: Arc<dyn SensorFetch>,
        forecast: Arc<dyn ForecastFetch>,
        indicator: Arc<dyn ActivityIndicator>,
        sensor_interval: Duration,
        forecast_interval: Duration,
        stations: Vec<Station>,
    ) -> Self {
        Self {
            tokens,
            sensor,
            forecast,
            indicator,
            sensor_interval,
            forecast_interval,
            inner: tokio::sync::Mutex::new(Inner {
                directory: StationDirectory::new(stations),
                sensor_cache: SourceCache::new(),
                forecast_cache: SourceCache::new(),
                state: RefreshState::default(),
            }),
        }
    }

    /// Periodic driver entry point.
    pub async fn tick(&self, now: DateTime<Utc>) -> RefreshResult {
        let mut inner = self.inner.lock().await;
        self.refresh(&mut inner, now, RefreshTrigger::Tick).await
    }

    /// Refresh both sources regardless of staleness.
    pub async fn force_full_refresh(&self, now: DateTime<Utc>) -> RefreshResult {
        let mut inner = self.inner.lock().await;
        self.refresh(&mut inner, now, RefreshTrigger::ForceFull).await
    }

    /// Move the station cursor and refresh for the new selection.
    ///
    /// Cycling a directory with zero or one station selects nothing new and
    /// degrades to an ordinary staleness-driven evaluation.
    pub async fn cycle_station(
        &self,
        direction: CycleDirection,
        now: DateTime<Utc>,
    ) -> RefreshResult {
        let mut inner = self.inner.lock().await;

        let before = inner.directory.current().map(|s| s.id.clone());
        let after = inner.directory.cycle(direction).map(|s| {
            tracing::info!(station = %s.display_name, "switched station");
            s.id.clone()
        });

        let trigger = if after != before {
            RefreshTrigger::StationChanged
        } else {
            RefreshTrigger::Tick
        };
        self.refresh(&mut inner, now, trigger).await
    }

    /// Re-fetch the station directory listing (explicit command, never on
    /// the fast cadence). Keeps the current selection by id when possible.
    pub async fn reload_stations(&self, now: DateTime<Utc>) -> Result<usize, RefreshError> {
        let mut inner = self.inner.lock().await;

        let _led = IndicatorGuard::on(self.indicator.as_ref());
        let token = self.tokens.get_valid_access_token(now).await?;
        let stations = self.sensor.list_stations(&token).await?;

        tracing::info!(count = stations.len(), "station directory reloaded");
        inner.directory.replace(stations);
        Ok(inner.directory.len())
    }

    /// Snapshot for the render collaborator. Staleness flags report data
    /// age only; stale payloads are still served.
    pub async fn current_render_params(&self, now: DateTime<Utc>) -> RenderParams {
        let inner = self.inner.lock().await;
        RenderParams {
            sensor: inner.sensor_cache.get().cloned(),
            forecast: inner.forecast_cache.get().cloned(),
            station: inner.directory.current().cloned(),
            station_index: if inner.directory.is_empty() {
                0
            } else {
                inner.directory.selected_index() + 1
            },
            station_count: inner.directory.len(),
            sensor_stale: inner.sensor_cache.is_stale(now, self.sensor_interval),
            forecast_stale: inner.forecast_cache.is_stale(now, self.forecast_interval),
        }
    }

    /// The refresh algorithm. Runs entirely inside the caller's lock on
    /// `inner`; the only suspension points are the network calls.
    async fn refresh(
        &self,
        inner: &mut Inner,
        now: DateTime<Utc>,
        trigger: RefreshTrigger,
    ) -> RefreshResult {
        let forced = trigger == RefreshTrigger::ForceFull;
        let station_switched = trigger == RefreshTrigger::StationChanged;

        let mut result = RefreshResult {
            station_switched,
            ..RefreshResult::no_change()
        };

        let Some(station) = inner.directory.current().cloned() else {
            // Empty directory: nothing to target, skip both without error.
            tracing::warn!("station directory is empty, skipping refresh");
            return result;
        };

        let sensor_due = forced
            || station_switched
            || is_due(inner.state.last_sensor_fetch, now, self.sensor_interval);

        let location_moved = inner
            .state
            .forecast_location_at_last_fetch
            .is_some_and(|loc| loc != station.location);
        let forecast_due = forced
            || station_switched
            || location_moved
            || is_due(inner.state.last_forecast_fetch, now, self.forecast_interval);

        if !sensor_due && !forecast_due {
            return result;
        }

        // Indicator on for the duration of this cycle's network calls; the
        // guard turns it back off on every exit path.
        let _led = IndicatorGuard::on(self.indicator.as_ref());

        if sensor_due {
            // A sensor auth failure must never block the forecast path, so
            // the error stops here.
            match self.tokens.get_valid_access_token(now).await {
                Ok(token) => {
                    match self.sensor.fetch_sensor_data(&token, &station).await {
                        Ok(reading) => {
                            tracing::debug!(
                                station = %station.display_name,
                                temp = reading.headline_temp(),
                                "sensor data updated"
                            );
                            inner.sensor_cache.put(reading, now);
                            result.sensor_changed = true;
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "sensor fetch failed, keeping last snapshot");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "token renewal failed, sensor data degraded");
                }
            }
            inner.state.last_sensor_fetch = Some(now);
        }

        if forecast_due {
            match self.forecast.fetch_forecast(station.location).await {
                Ok(forecast) => {
                    inner.forecast_cache.put(forecast, now);
                    inner.state.forecast_location_at_last_fetch = Some(station.location);
                    result.forecast_changed = true;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "forecast fetch failed, keeping last snapshot");
                }
            }
            inner.state.last_forecast_fetch = Some(now);
        }

        result
    }
}

/// A fetch attempt is due if none was ever made, or the last one is at
/// least `interval` old.
fn is_due(last: Option<DateTime<Utc>>, now: DateTime<Utc>, interval: Duration) -> bool {
    match last {
        None => true,
        Some(t) => now - t >= chrono::Duration::from_std(interval).unwrap_or(chrono::Duration::MAX),
    }
}

/// Turns the activity indicator on, and off again when dropped — including
/// on early returns out of a failed fetch path.
struct IndicatorGuard<'a> {
    indicator: &'a dyn ActivityIndicator,
}

impl<'a> IndicatorGuard<'a> {
    fn on(indicator: &'a dyn ActivityIndicator) -> Self {
        indicator.set_indicator(true);
        Self { indicator }
    }
}

impl Drop for IndicatorGuard<'_> {
    fn drop(&mut self) {
        self.indicator.set_indicator(false);
    }
}
