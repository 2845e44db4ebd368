// Integration tests for `RelayClient` using wiremock.

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gorod_api::relay::{RELAY_RTSP_PORT, RelayClient, RelayError};

async fn setup() -> (MockServer, RelayClient) {
    let server = MockServer::start().await;
    let client = RelayClient::new(&server.uri()).unwrap();
    (server, client)
}

#[tokio::test]
async fn test_validate_happy_path_returns_rtsp_host() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/streams"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    // Probe cleanup is best-effort; answer it so the mock server stays quiet.
    Mock::given(method("DELETE"))
        .and(path("/api/streams"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let host = client.validate().await.unwrap();
    assert_eq!(host, "127.0.0.1");
    assert_eq!(
        client.rtsp_url("eg_401"),
        format!("rtsp://127.0.0.1:{RELAY_RTSP_PORT}/eg_401")
    );
}

#[tokio::test]
async fn test_validate_unreachable_api() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client.validate().await.unwrap_err();
    assert!(matches!(err, RelayError::Unreachable));
    assert_eq!(err.form_key(), "go2rtc_unreachable");
}

#[tokio::test]
async fn test_validate_streams_api_rejects_writes() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/streams"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/streams"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.validate().await.unwrap_err();
    assert!(matches!(
        err,
        RelayError::StreamsApiFailed { status: Some(403) }
    ));
    assert_eq!(err.form_key(), "go2rtc_streams_api_failed");
}

#[tokio::test]
async fn test_upsert_stream_falls_back_to_patch() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/streams"))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/streams"))
        .and(query_param("name", "eg_401"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client
        .upsert_stream("eg_401", "ffmpeg:https://edge.example/s.flv#video=copy")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_frame_jpeg_missing_frame_is_none() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/frame.jpeg"))
        .and(query_param("src", "eg_401"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let frame = client.frame_jpeg("eg_401", Some(300), None).await.unwrap();
    assert!(frame.is_none());
}

#[test]
fn test_invalid_base_url_is_typed() {
    let err = RelayClient::new("not a url").unwrap_err();
    assert!(matches!(err, RelayError::InvalidUrl));
    assert_eq!(err.form_key(), "go2rtc_invalid_url");

    let err = RelayClient::new("   ").unwrap_err();
    assert!(matches!(err, RelayError::RequiredFields));
}
