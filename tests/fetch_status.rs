use std::time::Duration;

use httpmock::prelude::*;
use reqwest::StatusCode;
use smart_plug_monitor::{fetch, DeviceSnapshot, FetchError, TasmotaClient};

const STATUS_8_BODY: &str = r#"{
    "StatusSNS": {
        "Time": "2022-09-01T01:07:30",
        "ENERGY": {
            "TotalStartTime": "2020-12-11T16:15:26",
            "Total": 1048.895,
            "Yesterday": 0.923,
            "Today": 0.337,
            "Power": 367,
            "ApparentPower": 507,
            "ReactivePower": 350,
            "Factor": 0.72,
            "Voltage": 235,
            "Current": 2.156
        }
    }
}"#;

const TIMEOUT: Duration = Duration::from_millis(200);

fn address(server: &MockServer) -> String {
    server.address().to_string()
}

#[tokio::test]
async fn decodes_status_8_response() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(GET).path("/cm").query_param("cmnd", "Status 8");
            then.status(200)
                .header("content-type", "application/json")
                .body(STATUS_8_BODY);
        })
        .await;

    let snapshot = fetch(&address(&server), TIMEOUT).await.unwrap();

    m.assert_async().await;
    assert_eq!(
        snapshot,
        DeviceSnapshot {
            timestamp: "2022-09-01T01:07:30".to_owned(),
            voltage: 235,
            current: 2.156,
            power: 367,
            apparent_power: 507,
            reactive_power: 350,
            power_factor: 0.72,
            power_today: 0.337,
            power_yesterday: 0.923,
        }
    );
}

#[tokio::test]
async fn non_200_status_is_reported() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cm");
            then.status(500);
        })
        .await;

    let err = fetch(&address(&server), TIMEOUT).await.unwrap_err();
    assert!(
        matches!(err, FetchError::HttpStatus(StatusCode::INTERNAL_SERVER_ERROR)),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn other_success_codes_are_still_failures() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cm");
            then.status(204);
        })
        .await;

    let err = fetch(&address(&server), TIMEOUT).await.unwrap_err();
    assert!(matches!(err, FetchError::HttpStatus(StatusCode::NO_CONTENT)), "got: {err:?}");
}

#[tokio::test]
async fn slow_device_times_out() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cm");
            then.status(200)
                .body(STATUS_8_BODY)
                .delay(Duration::from_millis(1000));
        })
        .await;

    let err = fetch(&address(&server), Duration::from_millis(100)).await.unwrap_err();
    assert!(matches!(err, FetchError::Timeout), "got: {err:?}");
}

#[tokio::test]
async fn missing_energy_object_is_a_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cm");
            then.status(200).body(r#"{"StatusSNS": {}}"#);
        })
        .await;

    let err = fetch(&address(&server), TIMEOUT).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)), "got: {err:?}");
}

#[tokio::test]
async fn wrongly_typed_field_is_a_decode_error() {
    let server = MockServer::start_async().await;
    let body = STATUS_8_BODY.replace(r#""Voltage": 235"#, r#""Voltage": "235""#);
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cm");
            then.status(200).body(body);
        })
        .await;

    let err = fetch(&address(&server), TIMEOUT).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)), "got: {err:?}");
}

#[tokio::test]
async fn client_can_be_reused_across_fetches() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(GET).path("/cm").query_param("cmnd", "Status 8");
            then.status(200).body(STATUS_8_BODY);
        })
        .await;

    let client = TasmotaClient::new(&address(&server), TIMEOUT);
    for _ in 0..3 {
        assert_eq!(client.fetch_status().await.unwrap().power, 367);
    }
    m.assert_hits_async(3).await;
}
