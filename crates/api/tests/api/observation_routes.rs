use crate::helpers::{
    mock_hawaii_store, mock_year_store, spawn_app, spawn_app_with_store, MockObservationAccess,
};
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use climate_api::{db::Error, ObservationStore, TemperatureReading};
use hyper::{header, Method};
use serde_json::{from_slice, json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::ACCEPT, "application/json")
        .body(Body::empty())
        .unwrap();

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request.");

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> Value {
    let (status, body) = get(app, uri).await;
    assert_eq!(status, StatusCode::OK, "unexpected status for {}", uri);
    from_slice(&body).expect("response body is not json")
}

#[tokio::test]
async fn home_lists_available_routes() {
    let test_app = spawn_app_with_store(mock_hawaii_store());

    let (status, body) = get(&test_app.app, "/").await;

    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("Climate Analysis API"));
    assert!(html.contains("/api/v1.0/precipitation"));
    assert!(html.contains("/api/v1.0/tobs"));
}

#[tokio::test]
async fn precipitation_covers_last_year_with_one_value_per_date() {
    let test_app = spawn_app_with_store(mock_hawaii_store());

    let body = get_json(&test_app.app, "/api/v1.0/precipitation").await;

    assert_eq!(
        body,
        json!({
            "2016-08-23": 0.15,
            "2016-08-24": 2.15,
            "2017-08-18": 0.06,
            "2017-08-23": 0.0
        })
    );
}

#[tokio::test]
async fn precipitation_keeps_missing_readings_as_null() {
    let store = ObservationStore::new(
        vec![
            climate_api::Measurement::new("S1", "2017-08-22", None, 75.0),
            climate_api::Measurement::new("S1", "2017-08-23", Some(0.0), 80.0),
        ],
        vec![climate_api::Station::new("S1")],
    );
    let test_app = spawn_app_with_store(store);

    let body = get_json(&test_app.app, "/api/v1.0/precipitation").await;

    assert_eq!(body, json!({"2017-08-22": null, "2017-08-23": 0.0}));
}

#[tokio::test]
async fn stations_lists_every_station_once() {
    let test_app = spawn_app_with_store(mock_hawaii_store());

    let body = get_json(&test_app.app, "/api/v1.0/stations").await;

    assert_eq!(body, json!(["USC00519397", "USC00513117", "USC00519281"]));
}

#[tokio::test]
async fn tobs_returns_most_active_station_for_last_year() {
    let test_app = spawn_app_with_store(mock_hawaii_store());

    let body = get_json(&test_app.app, "/api/v1.0/tobs").await;

    assert_eq!(
        body,
        json!([
            {"Date": "2016-08-23", "Temperature": 77.0},
            {"Date": "2016-08-24", "Temperature": 77.0},
            {"Date": "2017-08-18", "Temperature": 79.0}
        ])
    );
}

#[tokio::test]
async fn tobs_window_is_relative_to_latest_date() {
    let mut observations = MockObservationAccess::new();
    observations
        .expect_most_active_station()
        .times(1)
        .returning(|| Ok(String::from("USC00519281")));
    observations
        .expect_latest_date()
        .times(1)
        .returning(|| Ok(String::from("2017-08-23")));
    observations
        .expect_temperatures_for_station_since()
        .withf(|station, cutoff| station == "USC00519281" && cutoff == "2016-08-23")
        .times(1)
        .returning(|_, _| {
            Ok(vec![TemperatureReading {
                date: String::from("2016-08-23"),
                tobs: 77.0,
            }])
        });
    let test_app = spawn_app(Arc::new(observations));

    let body = get_json(&test_app.app, "/api/v1.0/tobs").await;

    assert_eq!(body, json!([{"Date": "2016-08-23", "Temperature": 77.0}]));
}

#[tokio::test]
async fn empty_dataset_fails_tobs_route_without_taking_down_the_app() {
    let test_app = spawn_app_with_store(ObservationStore::default());

    let (status, _) = get(&test_app.app, "/api/v1.0/tobs").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&test_app.app, "/api/v1.0/precipitation").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let body = get_json(&test_app.app, "/api/v1.0/stations").await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn temperature_from_start_has_null_end_date() {
    let test_app = spawn_app_with_store(mock_hawaii_store());

    let body = get_json(&test_app.app, "/api/v1.0/temperature/2017-01-01").await;

    assert_eq!(
        body,
        json!({
            "Start Date": "2017-01-01",
            "End Date": null,
            "Min Temperature": 79.0,
            "Avg Temperature": 80.0,
            "Max Temperature": 81.0
        })
    );
}

#[tokio::test]
async fn temperature_between_dates_is_inclusive() {
    let test_app = spawn_app_with_store(mock_year_store());

    let body = get_json(&test_app.app, "/api/v1.0/temperature/2016-08-23/2017-08-22").await;

    assert_eq!(
        body,
        json!({
            "Start Date": "2016-08-23",
            "End Date": "2017-08-22",
            "Min Temperature": 70.0,
            "Avg Temperature": 72.5,
            "Max Temperature": 75.0
        })
    );
}

#[tokio::test]
async fn temperature_with_no_matching_rows_is_all_null() {
    let test_app = spawn_app_with_store(mock_year_store());

    for uri in [
        "/api/v1.0/temperature/2017-08-23/2016-08-23",
        "/api/v1.0/temperature/2030-01-01",
        "/api/v1.0/temperature/yesterday",
    ] {
        let body = get_json(&test_app.app, uri).await;
        assert_eq!(body["Min Temperature"], Value::Null, "{}", uri);
        assert_eq!(body["Avg Temperature"], Value::Null, "{}", uri);
        assert_eq!(body["Max Temperature"], Value::Null, "{}", uri);
    }
}

#[tokio::test]
async fn repeated_requests_return_identical_bodies() {
    let test_app = spawn_app_with_store(mock_hawaii_store());

    for uri in [
        "/api/v1.0/precipitation",
        "/api/v1.0/stations",
        "/api/v1.0/tobs",
        "/api/v1.0/temperature/2016-08-23/2017-08-23",
    ] {
        let first = get(&test_app.app, uri).await;
        let second = get(&test_app.app, uri).await;
        assert_eq!(first, second, "{}", uri);
    }
}

#[tokio::test]
async fn store_failure_is_an_internal_error() {
    let mut observations = MockObservationAccess::new();
    observations.expect_stations().times(1).returning(|| {
        Err(Error::Schema {
            table: "station",
            row: 0,
            reason: String::from("station is required"),
        })
    });
    let test_app = spawn_app(Arc::new(observations));

    let (status, _) = get(&test_app.app, "/api/v1.0/stations").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let test_app = spawn_app_with_store(mock_hawaii_store());

    let (status, _) = get(&test_app.app, "/api/v1.0/humidity").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
