// Integration tests for the auth state machine against a mocked cloud.

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gorod_api::CloudClient;
use gorod_api::transport::TransportConfig;
use gorod_api::user_agent::UserAgent;
use gorod_core::{AuthFlow, AuthStage, CoreError};

const PHONE: &str = "79991234567";

async fn setup() -> (MockServer, CloudClient) {
    let server = MockServer::start().await;
    let client = CloudClient::with_base_url(
        server.uri().parse().unwrap(),
        UserAgent::random(),
        &TransportConfig::default(),
    )
    .unwrap();
    (server, client)
}

fn password(value: &str) -> SecretString {
    SecretString::from(value.to_owned())
}

async fn mock_profile(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/subscribers/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "subscriber": { "id": 5001, "name": "Иван И.", "accountId": "900100200" }
            }
        })))
        .mount(server)
        .await;
}

// ── Password path ───────────────────────────────────────────────────

#[tokio::test]
async fn test_password_path_reaches_account_resolved() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("/auth/v2/login/{PHONE}")))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/auth/v2/auth/{PHONE}/password")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "at-1", "refreshToken": "rt-1", "operatorId": 2,
        })))
        .mount(&server)
        .await;
    mock_profile(&server).await;

    let mut flow = AuthFlow::new(&client);
    assert_eq!(flow.stage(), AuthStage::Start);

    assert_eq!(flow.begin(PHONE).await.unwrap(), AuthStage::PasswordRequired);
    assert_eq!(
        flow.submit_password(&password("secret")).await.unwrap(),
        AuthStage::Authenticated
    );

    let account = flow.resolve_account().await.unwrap();
    assert_eq!(account.name, "Иван И.");
    assert_eq!(account.subscriber_id, 5001);
    assert_eq!(account.account_id.as_deref(), Some("900100200"));
    assert_eq!(account.access_token, "at-1");
    assert_eq!(account.operator_id, 2);
    // The device identity got both ids stamped in.
    assert_eq!(account.user_agent.operator_id, "2");
    assert_eq!(account.user_agent.account_id, "900100200");
}

#[tokio::test]
async fn test_failed_password_leaves_the_stage_for_a_retry() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("/auth/v2/login/{PHONE}")))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/auth/v2/auth/{PHONE}/password")))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let mut flow = AuthFlow::new(&client);
    flow.begin(PHONE).await.unwrap();

    let err = flow.submit_password(&password("wrong")).await.unwrap_err();
    match err {
        CoreError::AuthenticationFailed { key, .. } => assert_eq!(key, "invalid_password"),
        other => panic!("unexpected error: {other:?}"),
    }
    // Same form, same stage -- the wizard re-prompts.
    assert_eq!(flow.stage(), AuthStage::PasswordRequired);
}

// ── SMS path ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sms_path_reaches_account_resolved() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("/auth/v2/login/{PHONE}")))
        .respond_with(ResponseTemplate::new(300).set_body_json(json!([
            {
                "accountId": "900100200",
                "address": "Ленина 1",
                "operatorId": 2,
                "subscriberId": 5001,
                "placeId": 101,
            },
            {
                "accountId": "900100201",
                "address": "Ленина 2",
                "operatorId": 2,
                "subscriberId": 5002,
                "placeId": 102,
            },
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/auth/v2/confirmation/{PHONE}")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/auth/v3/auth/{PHONE}/confirmation")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "at-2", "refreshToken": "rt-2", "operatorId": 2,
        })))
        .mount(&server)
        .await;
    mock_profile(&server).await;

    let mut flow = AuthFlow::new(&client);
    assert_eq!(flow.begin(PHONE).await.unwrap(), AuthStage::ContractSelection);
    assert_eq!(flow.contracts().len(), 2);

    assert_eq!(
        flow.select_contract(5002).await.unwrap(),
        AuthStage::SmsPending
    );
    assert_eq!(flow.submit_code("1234").await.unwrap(), AuthStage::Authenticated);

    flow.resolve_account().await.unwrap();
    let account = flow.into_account().unwrap();
    assert_eq!(account.access_token, "at-2");
}

#[tokio::test]
async fn test_selecting_an_unknown_contract_is_typed() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("/auth/v2/login/{PHONE}")))
        .respond_with(ResponseTemplate::new(300).set_body_json(json!([
            { "operatorId": 2, "subscriberId": 5001, "placeId": 101 },
        ])))
        .mount(&server)
        .await;

    let mut flow = AuthFlow::new(&client);
    flow.begin(PHONE).await.unwrap();

    let err = flow.select_contract(999).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::ContractNotFound { subscriber_id: 999 }
    ));
    assert_eq!(flow.stage(), AuthStage::ContractSelection);
}

// ── Transition table ────────────────────────────────────────────────

#[tokio::test]
async fn test_inputs_in_the_wrong_state_are_invalid_transitions() {
    let (_server, client) = setup().await;
    let mut flow = AuthFlow::new(&client);

    // Nothing but `begin` is valid in Start.
    let err = flow.submit_password(&password("x")).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::InvalidTransition {
            stage: "start",
            action: "submit_password"
        }
    ));

    let err = flow.select_contract(1).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::InvalidTransition { stage: "start", .. }
    ));

    let err = flow.submit_code("1234").await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::InvalidTransition { stage: "start", .. }
    ));

    let err = flow.resolve_account().await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::InvalidTransition { stage: "start", .. }
    ));

    assert!(flow.into_account().is_none());
}

#[tokio::test]
async fn test_begin_twice_is_an_invalid_transition() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("/auth/v2/login/{PHONE}")))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut flow = AuthFlow::new(&client);
    flow.begin(PHONE).await.unwrap();

    let err = flow.begin(PHONE).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::InvalidTransition {
            stage: "password_required",
            action: "begin"
        }
    ));
}
