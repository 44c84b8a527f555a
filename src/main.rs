// SPDX-License-Identifier: MIT

//! Stationdeck host daemon.
//!
//! Wires the upstream clients to the refresh coordinator, drives the
//! periodic tick loop, and maps stdin commands to button events so the core
//! can be exercised without display hardware (`p`/`n` cycle stations, `r`
//! forces a refresh, `q` quits; bare button numbers work too).

use anyhow::Context;
use chrono::Utc;
use stationdeck::{
    config::Config,
    input::{InputRouter, BUTTON_FORCE_REFRESH, BUTTON_NEXT_STATION, BUTTON_PREVIOUS_STATION},
    services::{
        ActivityIndicator, Credential, DisplayStateTracker, ForecastApiClient, RefreshCoordinator,
        RefreshResult, RenderDecision, SensorApiClient, TokenManager,
    },
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        sensor_interval = config.sensor_interval.as_secs(),
        forecast_interval = config.forecast_interval.as_secs(),
        "Starting stationdeck"
    );

    let sensor_client = Arc::new(SensorApiClient::new());
    let forecast_client = Arc::new(ForecastApiClient::new(
        config.forecast_api_key.clone(),
        config.units.clone(),
    ));

    let tokens = Arc::new(TokenManager::new(
        Credential::new(
            config.sensor_client_id.clone(),
            config.sensor_client_secret.clone(),
            config.sensor_refresh_token.clone(),
        ),
        sensor_client.clone(),
    ));

    let coordinator = Arc::new(RefreshCoordinator::new(
        tokens,
        sensor_client,
        forecast_client,
        Arc::new(LogIndicator),
        config.sensor_interval,
        config.forecast_interval,
        Vec::new(),
    ));

    // Initial directory load; a failure here is fatal since there is
    // nothing to display without a station.
    let count = coordinator
        .reload_stations(Utc::now())
        .await
        .context("Failed to load station directory")?;
    anyhow::ensure!(count > 0, "No weather stations found for this account");
    tracing::info!(count, "Station directory loaded");

    let tracker = DisplayStateTracker::new();
    let router = InputRouter::new(coordinator.clone());

    let mut ticker = tokio::time::interval(config.tick_period);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let result = coordinator.tick(Utc::now()).await;
                present(&coordinator, &tracker, result).await;
            }
            line = lines.next_line() => {
                match line? {
                    None => break, // stdin closed
                    Some(line) => {
                        let cmd = line.trim();
                        if cmd == "q" {
                            break;
                        }
                        let Some(id) = button_for(cmd) else {
                            continue;
                        };
                        let result = router.on_button(id, Utc::now()).await;
                        present(&coordinator, &tracker, result).await;
                    }
                }
            }
        }
    }

    tracing::info!("Shutting down");
    Ok(())
}

/// Map a stdin command to the button id the hardware would send.
fn button_for(cmd: &str) -> Option<u8> {
    match cmd {
        "p" => Some(BUTTON_PREVIOUS_STATION),
        "n" => Some(BUTTON_NEXT_STATION),
        "r" => Some(BUTTON_FORCE_REFRESH),
        other => other.parse().ok(),
    }
}

/// Stand-in for the render collaborator: logs what a real display host
/// would repaint.
async fn present(
    coordinator: &RefreshCoordinator,
    tracker: &DisplayStateTracker,
    result: RefreshResult,
) {
    let decision = tracker.on_refresh_result(&result);
    if decision == RenderDecision::Skip {
        tracing::debug!("no change, skipping render");
        return;
    }

    let params = coordinator.current_render_params(Utc::now()).await;
    let station = params
        .station
        .as_ref()
        .map(|s| s.display_name.as_str())
        .unwrap_or("<none>");

    tracing::info!(
        ?decision,
        station,
        station_index = params.station_index,
        station_count = params.station_count,
        temp = params.sensor.as_ref().map(|s| s.payload.headline_temp()),
        sensor_stale = params.sensor_stale,
        forecast_stale = params.forecast_stale,
        forecast = params
            .forecast
            .as_ref()
            .map(|f| f.payload.current.description.as_str()),
        "render"
    );
}

/// Activity LED stand-in; a hardware host drives a GPIO pin instead.
struct LogIndicator;

impl ActivityIndicator for LogIndicator {
    fn set_indicator(&self, on: bool) {
        tracing::debug!(on, "activity indicator");
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stationdeck=debug,info".into()),
        )
        .init();
}
