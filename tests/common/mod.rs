// SPDX-License-Identifier: MIT

//! Shared mock collaborators for the refresh-core integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use stationdeck::error::{AuthError, FetchError, FetchResult};
use stationdeck::models::{
    Forecast, ForecastConditions, Location, SensorReading, Station,
};
use stationdeck::services::{
    ActivityIndicator, Credential, ForecastFetch, RefreshCoordinator, RenewedToken, SensorFetch,
    TokenManager, TokenRenew,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Timestamp helper: seconds since the epoch.
pub fn t(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

pub fn station(id: &str, name: &str, lat: f64, lon: f64) -> Station {
    Station::new(id, name, lat, lon)
}

pub fn reading(name: &str, temp: f64) -> SensorReading {
    SensorReading {
        station_name: name.to_string(),
        temperature: temp,
        humidity: 45,
        pressure: 1013.2,
        co2: Some(600),
        noise: None,
        measured_at: t(0),
        outdoor_temp: None,
        outdoor_humidity: None,
        wind_speed: None,
        wind_direction: None,
        gust_speed: None,
        rain_1h: None,
        rain_24h: None,
    }
}

pub fn forecast(description: &str) -> Forecast {
    Forecast {
        current: ForecastConditions {
            temp: 18.0,
            feels_like: 17.0,
            description: description.to_string(),
            icon: "04d".to_string(),
        },
        hourly: Vec::new(),
        daily: Vec::new(),
    }
}

/// Sensor fetch mock: counts calls, fails on demand, optionally delays to
/// widen race windows.
#[derive(Default)]
pub struct MockSensor {
    pub fetch_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub fail: AtomicBool,
    pub delay: Option<Duration>,
    pub stations: Mutex<Vec<Station>>,
}

impl MockSensor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Self::default()
        })
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SensorFetch for MockSensor {
    async fn fetch_sensor_data(
        &self,
        _access_token: &str,
        station: &Station,
    ) -> FetchResult<SensorReading> {
        let n = self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(FetchError::Network("connection reset".to_string()));
        }
        // Encode the call number in the temperature so tests can tell
        // snapshots apart.
        Ok(reading(&station.display_name, 20.0 + n as f64))
    }

    async fn list_stations(&self, _access_token: &str) -> FetchResult<Vec<Station>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(FetchError::Network("connection reset".to_string()));
        }
        Ok(self.stations.lock().unwrap().clone())
    }
}

/// Forecast fetch mock: counts calls, records the location of the last
/// request, fails on demand.
#[derive(Default)]
pub struct MockForecast {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
    pub last_location: Mutex<Option<Location>>,
}

impl MockForecast {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn fetches(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_location(&self) -> Option<Location> {
        *self.last_location.lock().unwrap()
    }
}

#[async_trait]
impl ForecastFetch for MockForecast {
    async fn fetch_forecast(&self, location: Location) -> FetchResult<Forecast> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_location.lock().unwrap() = Some(location);
        if self.fail.load(Ordering::SeqCst) {
            return Err(FetchError::RateLimited);
        }
        Ok(forecast(&format!("forecast for {:.1},{:.1}", location.lat, location.lon)))
    }
}

/// Token renewer mock: hands out tokens, optionally slowly or not at all.
#[derive(Default)]
pub struct MockRenewer {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
    pub delay: Option<Duration>,
}

impl MockRenewer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_delay(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Self::default()
        })
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn renewals(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenRenew for MockRenewer {
    async fn renew_token(
        &self,
        _client_id: &str,
        _client_secret: &str,
        _refresh_token: &str,
    ) -> Result<RenewedToken, AuthError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(AuthError::ExpiredOrRevoked);
        }
        Ok(RenewedToken {
            access_token: format!("access-{}", n),
            expires_at: Utc::now() + chrono::Duration::hours(3),
            refresh_token: Some(format!("refresh-{}", n + 1)),
        })
    }
}

/// Records every indicator transition.
#[derive(Default)]
pub struct RecordingIndicator {
    pub events: Mutex<Vec<bool>>,
}

impl RecordingIndicator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<bool> {
        self.events.lock().unwrap().clone()
    }

    /// The indicator must never leak "on": every recorded sequence has to
    /// alternate starting with `true` and end with `false`.
    pub fn assert_balanced(&self) {
        let events = self.events();
        for pair in events.chunks(2) {
            assert_eq!(pair, [true, false], "unbalanced indicator events: {:?}", events);
        }
    }
}

impl ActivityIndicator for RecordingIndicator {
    fn set_indicator(&self, on: bool) {
        self.events.lock().unwrap().push(on);
    }
}

/// Fully wired test harness around one coordinator.
pub struct Harness {
    pub coordinator: Arc<RefreshCoordinator>,
    pub sensor: Arc<MockSensor>,
    pub forecast: Arc<MockForecast>,
    pub renewer: Arc<MockRenewer>,
    pub indicator: Arc<RecordingIndicator>,
}

/// Build a coordinator with the production cadences (300s sensor, 7200s
/// forecast) over the given stations.
pub fn harness(stations: Vec<Station>) -> Harness {
    harness_with(stations, MockSensor::new(), MockRenewer::new())
}

pub fn harness_with(
    stations: Vec<Station>,
    sensor: Arc<MockSensor>,
    renewer: Arc<MockRenewer>,
) -> Harness {
    let forecast = MockForecast::new();
    let indicator = RecordingIndicator::new();

    let tokens = Arc::new(TokenManager::new(
        Credential::new("id".into(), "secret".into(), "seed-refresh".into()),
        renewer.clone(),
    ));

    let coordinator = Arc::new(RefreshCoordinator::new(
        tokens,
        sensor.clone(),
        forecast.clone(),
        indicator.clone(),
        Duration::from_secs(300),
        Duration::from_secs(7200),
        stations,
    ));

    Harness {
        coordinator,
        sensor,
        forecast,
        renewer,
        indicator,
    }
}
