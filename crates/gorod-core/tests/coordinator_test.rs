// Integration tests for the coordinator against a mocked cloud.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gorod_api::CloudClient;
use gorod_api::transport::TransportConfig;
use gorod_api::user_agent::UserAgent;
use gorod_core::{Camera, Coordinator, CoreError};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup_with_places(places: serde_json::Value) -> (MockServer, Coordinator) {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v3/subscriber-places"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": places })))
        .mount(&server)
        .await;

    let client = CloudClient::with_base_url(
        server.uri().parse().unwrap(),
        UserAgent::random(),
        &TransportConfig::default(),
    )
    .unwrap();

    let coordinator = Coordinator::new(client);
    coordinator.refresh().await.unwrap();
    (server, coordinator)
}

fn one_place() -> serde_json::Value {
    json!([{ "id": 1, "place": { "id": 101 } }])
}

async fn mock_camera_sources(
    server: &MockServer,
    place_id: i64,
    access_controls: serde_json::Value,
    public_cameras: serde_json::Value,
    private_cameras: serde_json::Value,
) {
    Mock::given(method("GET"))
        .and(path(format!("/rest/v1/places/{place_id}/accesscontrols")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": access_controls })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/rest/v2/places/{place_id}/public/cameras")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": public_cameras })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/rest/v1/places/{place_id}/screen-sections")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sections": [] })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/rest/v1/places/{place_id}/cameras")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": private_cameras })))
        .mount(server)
        .await;
}

// ── Places ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_skips_entries_without_a_place() {
    let (_server, coordinator) = setup_with_places(json!([
        { "id": 1, "place": { "id": 101 } },
        { "id": 2, "blocked": true },
        { "id": 3, "place": { "id": 102 } },
    ]))
    .await;

    let places = coordinator.places().await;
    let ids: Vec<i64> = places.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![101, 102]);
}

// ── Camera aggregation ──────────────────────────────────────────────

#[tokio::test]
async fn test_cameras_are_aggregated_and_deduplicated_first_wins() {
    let (server, coordinator) = setup_with_places(one_place()).await;

    mock_camera_sources(
        &server,
        101,
        // Access control camera: id 401 under its door name.
        json!([
            { "id": 7, "name": "Подъезд 1", "externalCameraId": 401 },
            { "id": 8, "name": "Шлагбаум" },
        ]),
        // Public listing repeats 401 under a different name and adds 402.
        json!([
            { "id": 401, "name": "Подъезд 1 (дубль)" },
            { "externalCameraId": 402, "name": "Двор" },
        ]),
        // Private listing repeats 402 and adds 403.
        json!([
            { "id": 402, "name": "Двор (дубль)" },
            { "id": 403, "name": "Парковка" },
        ]),
    )
    .await;

    let cameras = coordinator.get_cameras_info().await.unwrap();
    assert_eq!(
        cameras,
        vec![
            Camera { id: 401, name: "Подъезд 1".into() },
            Camera { id: 402, name: "Двор".into() },
            Camera { id: 403, name: "Парковка".into() },
        ]
    );
}

#[tokio::test]
async fn test_cameras_across_places_keep_place_order() {
    let (server, coordinator) = setup_with_places(json!([
        { "id": 1, "place": { "id": 101 } },
        { "id": 2, "place": { "id": 102 } },
    ]))
    .await;

    mock_camera_sources(&server, 101, json!([]), json!([]), json!([{ "id": 401, "name": "A" }]))
        .await;
    mock_camera_sources(&server, 102, json!([]), json!([]), json!([{ "id": 402, "name": "B" }]))
        .await;

    let cameras = coordinator.get_cameras_info().await.unwrap();
    let ids: Vec<i64> = cameras.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![401, 402]);
}

#[tokio::test]
async fn test_update_camera_state_missing_camera_is_typed() {
    let (server, coordinator) = setup_with_places(one_place()).await;
    mock_camera_sources(&server, 101, json!([]), json!([]), json!([])).await;

    let err = coordinator.update_camera_state(999).await.unwrap_err();
    assert!(matches!(err, CoreError::CameraNotFound { id: 999 }));
}

#[tokio::test]
async fn test_camera_stream_errors_degrade_to_none() {
    let (server, coordinator) = setup_with_places(one_place()).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/forpost/cameras/401/video"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert_eq!(coordinator.get_camera_stream(401).await, None);
}

#[tokio::test]
async fn test_snapshot_uses_default_sizing() {
    let (server, coordinator) = setup_with_places(one_place()).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/forpost/cameras/401/snapshots"))
        .and(query_param("width", "300"))
        .and(query_param("height", "169"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8]))
        .expect(1)
        .mount(&server)
        .await;

    let bytes = coordinator
        .get_camera_snapshot(401, None, None)
        .await
        .unwrap();
    assert_eq!(bytes.as_ref(), &[0xFF, 0xD8]);
}

// ── Locks ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_locks_derived_per_entrance_or_access_control() {
    let (server, coordinator) = setup_with_places(one_place()).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/places/101/accesscontrols"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "id": 7,
                    "name": "Подъезд 1",
                    "allowOpen": true,
                    "entrances": [
                        { "id": 71, "name": "Дверь 1", "allowOpen": true },
                        { "id": 72, "name": "Дверь 2", "allowOpen": false },
                    ],
                },
                { "id": 8, "name": "Шлагбаум", "allowOpen": true, "entrances": [] },
            ]
        })))
        .mount(&server)
        .await;

    let locks = coordinator.get_locks_info().await.unwrap();
    assert_eq!(locks.len(), 3);
    assert_eq!(locks[0].entrance_id, Some(71));
    assert_eq!(locks[1].entrance_id, Some(72));
    assert_eq!(locks[2].entrance_id, None);
    assert_eq!(locks[2].access_control_id, 8);
}

#[tokio::test]
async fn test_update_lock_state_missing_entrance_is_typed() {
    let (server, coordinator) = setup_with_places(one_place()).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/places/101/accesscontrols"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": 7, "name": "Подъезд 1", "entrances": [{ "id": 71 }] }]
        })))
        .mount(&server)
        .await;

    let err = coordinator
        .update_lock_state(101, 7, Some(99))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::EntranceNotFound { id: 99 }));

    let err = coordinator
        .update_lock_state(101, 9, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::AccessControlNotFound { id: 9 }));
}

// ── Balances ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_balances_skip_places_without_billing() {
    let (server, coordinator) = setup_with_places(json!([
        { "id": 1, "place": { "id": 101 } },
        { "id": 2, "place": { "id": 102 } },
    ]))
    .await;

    Mock::given(method("GET"))
        .and(path("/api/mh-payment/mobile/v1/finance"))
        .and(query_param("placeId", "101"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "balance": 450.5, "blocked": false }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/mh-payment/mobile/v1/finance"))
        .and(query_param("placeId", "102"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": null })))
        .mount(&server)
        .await;

    let balances = coordinator.get_balances_info().await.unwrap();
    assert_eq!(balances.len(), 1);
    assert_eq!(balances[0].place_id, 101);
    assert_eq!(balances[0].balance, Some(450.5));
}

#[tokio::test]
async fn test_update_balance_state_missing_data_is_typed() {
    let (server, coordinator) = setup_with_places(one_place()).await;

    Mock::given(method("GET"))
        .and(path("/api/mh-payment/mobile/v1/finance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": null })))
        .mount(&server)
        .await;

    let err = coordinator.update_balance_state(101).await.unwrap_err();
    assert!(matches!(err, CoreError::BalanceNotFound { place_id: 101 }));
}
