//! Integration tests for the status poller against a stub printer host.

use std::time::Duration;

use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};
use yocto_client::{ApiClient, PollerConfig, ServerAddress, StatusPoller, StatusSubscription};
use yocto_core::StatusSnapshot;

const WAIT: Duration = Duration::from_secs(5);

fn client_for(server: &MockServer) -> ApiClient {
    let addr = server.address();
    ApiClient::new(ServerAddress::with_port(addr.ip().to_string(), addr.port()))
}

fn printing_body() -> serde_json::Value {
    json!({
        "printer_connected": true,
        "temperatures": [200.1],
        "manual_control_enabled": true,
        "fan_speed": [0.5]
    })
}

fn enriched() -> StatusSnapshot {
    StatusSnapshot::from_value(json!({
        "printer_connected": true,
        "temperatures": [200.1],
        "manual_control_enabled": true,
        "fan_speed": [0.5],
        "host_connected": true
    }))
    .unwrap()
}

async fn next_update(sub: &mut StatusSubscription) -> StatusSnapshot {
    tokio::time::timeout(WAIT, sub.next())
        .await
        .expect("timed out waiting for a status update")
        .expect("poller closed")
}

async fn status_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == "/api/status")
        .count()
}

#[tokio::test]
async fn test_success_failure_success_scenario() {
    yocto_core::logging::init_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(printing_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(printing_body()))
        .mount(&server)
        .await;

    let config = PollerConfig::default().with_interval(Duration::from_millis(50));
    let poller = StatusPoller::new(client_for(&server), config);
    let mut sub = poller.subscribe();

    assert_eq!(next_update(&mut sub).await, enriched());
    assert_eq!(next_update(&mut sub).await, StatusSnapshot::default_status());
    assert_eq!(next_update(&mut sub).await, enriched());
}

#[tokio::test]
async fn test_host_connected_forced_true() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "host_connected": false,
            "manual_control_enabled": false,
            "extruders": 2
        })))
        .mount(&server)
        .await;

    let poller = StatusPoller::new(client_for(&server), PollerConfig::default());
    let mut sub = poller.subscribe();

    let status = next_update(&mut sub).await;
    assert_eq!(
        status,
        StatusSnapshot::from_value(json!({
            "host_connected": true,
            "manual_control_enabled": false,
            "extruders": 2
        }))
        .unwrap()
    );
}

#[tokio::test]
async fn test_unreachable_host_publishes_default_and_keeps_polling() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = ApiClient::new(ServerAddress::with_port("127.0.0.1", port));
    let config = PollerConfig::default().with_interval(Duration::from_millis(20));
    let poller = StatusPoller::new(client, config);
    let mut sub = poller.subscribe();

    for _ in 0..5 {
        assert!(next_update(&mut sub).await.is_default());
    }
    assert!(poller.is_polling());
}

#[tokio::test]
async fn test_malformed_json_publishes_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"temperatures\": [20"))
        .mount(&server)
        .await;

    let poller = StatusPoller::new(client_for(&server), PollerConfig::default());
    let mut sub = poller.subscribe();

    assert_eq!(next_update(&mut sub).await, StatusSnapshot::default_status());
}

#[tokio::test]
async fn test_command_triggers_one_extra_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(printing_body()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/home"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK!"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    // Long interval so the only extra request can come from the command
    let config = PollerConfig::default().with_interval(Duration::from_secs(60));
    let poller = StatusPoller::new(client.clone(), config);
    let mut sub = poller.subscribe();
    next_update(&mut sub).await;
    assert_eq!(status_requests(&server).await, 1);

    let refresh = poller.refresh_handle();
    client.home(Some(&refresh)).await.unwrap();

    assert_eq!(next_update(&mut sub).await, enriched());
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(status_requests(&server).await, 2);
}

#[tokio::test]
async fn test_upload_triggers_one_extra_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(printing_body()))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/upload_gcode"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK!"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let config = PollerConfig::default().with_interval(Duration::from_secs(60));
    let poller = StatusPoller::new(client.clone(), config);
    let mut sub = poller.subscribe();
    next_update(&mut sub).await;

    let refresh = poller.refresh_handle();
    client
        .upload_gcode("cube.gcode", b"G28".to_vec(), Some(&refresh))
        .await
        .unwrap();

    assert_eq!(next_update(&mut sub).await, enriched());
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(status_requests(&server).await, 2);
}

#[tokio::test]
async fn test_failed_command_does_not_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(printing_body()))
        .mount(&server)
        .await;

    let config = PollerConfig::default().with_interval(Duration::from_secs(60));
    let poller = StatusPoller::new(client_for(&server), config);
    let mut sub = poller.subscribe();
    next_update(&mut sub).await;

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let dead = ApiClient::new(ServerAddress::with_port("127.0.0.1", port));

    let refresh = poller.refresh_handle();
    assert!(dead.home(Some(&refresh)).await.is_err());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(status_requests(&server).await, 1);
}

#[tokio::test]
async fn test_command_without_poller_is_noop_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/home"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK!"))
        .mount(&server)
        .await;

    client_for(&server).home(None).await.unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(status_requests(&server).await, 0);
}
