// SPDX-License-Identifier: MIT

//! HTTP-level tests for the sensor API client against a mock server.

use stationdeck::error::{AuthError, FetchError};
use stationdeck::models::Station;
use stationdeck::services::{SensorApiClient, SensorFetch, TokenRenew};

fn stations_data_body() -> String {
    serde_json::json!({
        "body": {
            "devices": [
                {
                    "_id": "70:ee:50:aa:bb:cc",
                    "station_name": "Home",
                    "place": {
                        "location": [13.40, 52.52],
                        "altitude": 45,
                        "timezone": "Europe/Berlin"
                    },
                    "dashboard_data": {
                        "Temperature": 21.4,
                        "Humidity": 48,
                        "Pressure": 1017.3,
                        "CO2": 742,
                        "Noise": 38,
                        "time_utc": 1700000000
                    },
                    "modules": [
                        {
                            "type": "NAModule1",
                            "dashboard_data": {
                                "Temperature": 7.9,
                                "Humidity": 81
                            }
                        },
                        {
                            "type": "NAModule3",
                            "dashboard_data": {
                                "Rain": 0.2,
                                "sum_rain_24": 3.4
                            }
                        },
                        {
                            "type": "NAModule2"
                        }
                    ]
                },
                {
                    "_id": "70:ee:50:dd:ee:ff",
                    "module_name": "Cabin",
                    "place": {
                        "location": [11.40, 47.27]
                    }
                }
            ]
        }
    })
    .to_string()
}

#[tokio::test]
async fn renew_token_parses_rotated_refresh_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/oauth2/token")
        .match_body(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            mockito::Matcher::UrlEncoded("refresh_token".into(), "old-refresh".into()),
        ]))
        .with_status(200)
        .with_body(
            serde_json::json!({
                "access_token": "new-access",
                "refresh_token": "new-refresh",
                "expires_in": 10800
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = SensorApiClient::with_base_url(server.url());
    let renewed = client
        .renew_token("client-id", "client-secret", "old-refresh")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(renewed.access_token, "new-access");
    assert_eq!(renewed.refresh_token.as_deref(), Some("new-refresh"));
    assert!(renewed.expires_at > chrono::Utc::now());
}

#[tokio::test]
async fn rejected_renewal_is_an_auth_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/oauth2/token")
        .with_status(400)
        .with_body(r#"{"error":"invalid_grant"}"#)
        .create_async()
        .await;

    let client = SensorApiClient::with_base_url(server.url());
    let err = client
        .renew_token("client-id", "client-secret", "revoked")
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::ExpiredOrRevoked);
}

#[tokio::test]
async fn fetch_sensor_data_folds_module_readings() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/getstationsdata")
        .with_status(200)
        .with_body(stations_data_body())
        .create_async()
        .await;

    let client = SensorApiClient::with_base_url(server.url());
    let station = Station::new("70:ee:50:aa:bb:cc", "Home", 52.52, 13.40);
    let reading = client.fetch_sensor_data("token", &station).await.unwrap();

    assert_eq!(reading.station_name, "Home");
    assert_eq!(reading.temperature, 21.4);
    assert_eq!(reading.humidity, 48);
    assert_eq!(reading.co2, Some(742));

    // Outdoor module merged in; headline temp prefers it
    assert_eq!(reading.outdoor_temp, Some(7.9));
    assert_eq!(reading.outdoor_humidity, Some(81));
    assert_eq!(reading.headline_temp(), 7.9);

    // Rain gauge merged, unreachable wind gauge left unset
    assert_eq!(reading.rain_1h, Some(0.2));
    assert_eq!(reading.rain_24h, Some(3.4));
    assert_eq!(reading.wind_speed, None);
}

#[tokio::test]
async fn list_stations_maps_lon_lat_order() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/getstationsdata")
        .with_status(200)
        .with_body(stations_data_body())
        .create_async()
        .await;

    let client = SensorApiClient::with_base_url(server.url());
    let stations = client.list_stations("token").await.unwrap();

    assert_eq!(stations.len(), 2);
    assert_eq!(stations[0].id, "70:ee:50:aa:bb:cc");
    assert_eq!(stations[0].display_name, "Home");
    // The wire carries [lon, lat]
    assert_eq!(stations[0].location.lat, 52.52);
    assert_eq!(stations[0].location.lon, 13.40);
    // Falls back to module_name when station_name is absent
    assert_eq!(stations[1].display_name, "Cabin");
}

#[tokio::test]
async fn rate_limit_is_classified() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/getstationsdata")
        .with_status(429)
        .with_body("Too Many Requests")
        .create_async()
        .await;

    let client = SensorApiClient::with_base_url(server.url());
    let err = client.list_stations("token").await.unwrap_err();

    assert_eq!(err, FetchError::RateLimited);
}

#[tokio::test]
async fn upstream_rejection_carries_status_and_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/getstationsdata")
        .with_status(403)
        .with_body("scope missing")
        .create_async()
        .await;

    let client = SensorApiClient::with_base_url(server.url());
    let err = client.list_stations("token").await.unwrap_err();

    match err {
        FetchError::UpstreamRejected(msg) => {
            assert!(msg.contains("403"));
            assert!(msg.contains("scope missing"));
        }
        other => panic!("expected UpstreamRejected, got {:?}", other),
    }
}
