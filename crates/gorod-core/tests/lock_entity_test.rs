// Integration tests for the lock entity's optimistic state machine.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gorod_api::CloudClient;
use gorod_api::transport::TransportConfig;
use gorod_api::user_agent::UserAgent;
use gorod_core::{Coordinator, Lock, LockEntity, LockState};

async fn setup() -> (MockServer, Arc<Coordinator>) {
    let server = MockServer::start().await;
    let client = CloudClient::with_base_url(
        server.uri().parse().unwrap(),
        UserAgent::random(),
        &TransportConfig::default(),
    )
    .unwrap();
    (server, Arc::new(Coordinator::new(client)))
}

fn lock_info() -> Lock {
    Lock {
        place_id: 101,
        access_control_id: 7,
        entrance_id: Some(71),
        name: "Дверь 1".into(),
        openable: true,
    }
}

#[tokio::test]
async fn test_unlock_then_relock_after_the_delay() {
    let (server, coordinator) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/places/101/accesscontrols/7/entrances/71/actions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut lock = LockEntity::new(coordinator, lock_info())
        .with_relock_delay(Duration::from_millis(50));
    assert_eq!(lock.state(), LockState::Locked);
    assert!(lock.is_available());

    let state = lock.unlock().await;
    assert_eq!(state, LockState::Unlocked);
    assert!(!lock.is_locked());

    // The scheduled transition brings it back to Locked.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(lock.state(), LockState::Locked);
}

#[tokio::test]
async fn test_transport_failure_jams_instead_of_propagating() {
    let (server, coordinator) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/places/101/accesscontrols/7/entrances/71/actions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut lock = LockEntity::new(coordinator, lock_info());
    let state = lock.unlock().await;
    assert_eq!(state, LockState::Jammed);
    assert!(lock.is_jammed());
}

#[tokio::test]
async fn test_cancel_relock_keeps_the_door_unlocked() {
    let (server, coordinator) = setup().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/places/101/accesscontrols/7/entrances/71/actions"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut lock = LockEntity::new(coordinator, lock_info())
        .with_relock_delay(Duration::from_millis(50));
    lock.unlock().await;
    lock.cancel_relock();

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(lock.state(), LockState::Unlocked);
}

#[tokio::test]
async fn test_unique_id_includes_the_entrance() {
    let (_server, coordinator) = setup().await;

    let with_entrance = LockEntity::new(Arc::clone(&coordinator), lock_info());
    assert_eq!(with_entrance.unique_id(), "101_7_71_Дверь 1");

    let mut info = lock_info();
    info.entrance_id = None;
    info.name = "Шлагбаум".into();
    let without_entrance = LockEntity::new(coordinator, info);
    assert_eq!(without_entrance.unique_id(), "101_7_none_Шлагбаум");
}

#[tokio::test]
async fn test_update_refreshes_the_backend_state() {
    let (server, coordinator) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/places/101/accesscontrols"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": 7,
                "name": "Подъезд 1",
                "entrances": [{ "id": 71, "name": "Дверь 1", "allowOpen": false }],
            }]
        })))
        .mount(&server)
        .await;

    let mut lock = LockEntity::new(coordinator, lock_info());
    lock.update().await.unwrap();
    assert!(!lock.is_available());
}
