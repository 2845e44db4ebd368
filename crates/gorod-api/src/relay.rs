// go2rtc media-relay client.
//
// The camera entity can register its FLV source with an external go2rtc
// instance and hand consumers an RTSP URL instead. This module covers the
// three interactions that needs: a validation probe (reachability plus a
// write check against the streams API, with best-effort cleanup), stream
// registration, and frame fetching.

use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;
use url::Url;
use uuid::Uuid;

/// RTSP port go2rtc listens on by default.
pub const RELAY_RTSP_PORT: u16 = 8554;

/// Source used by the validation write probe. Intentionally dead -- the
/// probe only checks that the streams API accepts writes.
const PROBE_SOURCE: &str = "rtsp://127.0.0.1:8554/does_not_exist";

/// Relay failures, keyed like the configuration form they surface on.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Relay base URL is required")]
    RequiredFields,

    #[error("Relay base URL is not a valid http(s) URL")]
    InvalidUrl,

    #[error("Relay is unreachable")]
    Unreachable,

    #[error("Relay streams API rejected the request{}", fmt_status(.status))]
    StreamsApiFailed { status: Option<u16> },
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map_or_else(String::new, |s| format!(" (HTTP {s})"))
}

impl RelayError {
    /// The stable form-error key for this failure.
    pub fn form_key(&self) -> &'static str {
        match self {
            Self::RequiredFields => "go2rtc_required_fields",
            Self::InvalidUrl => "go2rtc_invalid_url",
            Self::Unreachable => "go2rtc_unreachable",
            Self::StreamsApiFailed { .. } => "go2rtc_streams_api_failed",
        }
    }
}

/// Trim surrounding whitespace and any trailing slash. Empty input stays
/// empty.
pub fn normalize_base_url(value: &str) -> String {
    value.trim().trim_end_matches('/').to_owned()
}

/// Extract the host from an `http(s)://host[:port]` base URL.
pub fn derive_rtsp_host(base_url: &str) -> Option<String> {
    Url::parse(base_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_owned))
}

/// go2rtc ingest source for a vendor stream URL: video passthrough,
/// audio transcoded so WebRTC and HLS consumers both get a track.
pub fn ffmpeg_source(source_url: &str) -> String {
    format!("ffmpeg:{source_url}#video=copy#audio=aac#audio=opus")
}

/// Client for one go2rtc instance.
#[derive(Debug)]
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
    rtsp_host: String,
}

impl RelayClient {
    /// Create a client for the given base URL (e.g. `http://127.0.0.1:1984`).
    pub fn new(base_url: &str) -> Result<Self, RelayError> {
        Self::with_timeout(base_url, Duration::from_secs(10))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, RelayError> {
        let base_url = normalize_base_url(base_url);
        if base_url.is_empty() {
            return Err(RelayError::RequiredFields);
        }
        let rtsp_host = derive_rtsp_host(&base_url).ok_or(RelayError::InvalidUrl)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|_| RelayError::Unreachable)?;
        Ok(Self {
            http,
            base_url,
            rtsp_host,
        })
    }

    /// The host RTSP consumers should connect to.
    pub fn rtsp_host(&self) -> &str {
        &self.rtsp_host
    }

    /// RTSP URL for a registered stream.
    pub fn rtsp_url(&self, stream_name: &str) -> String {
        format!("rtsp://{}:{RELAY_RTSP_PORT}/{stream_name}", self.rtsp_host)
    }

    /// Validate the instance: `GET {base}/api` must answer 200, and the
    /// streams API must accept a PUT. The probe stream is deleted again,
    /// best-effort. Returns the derived RTSP host.
    pub async fn validate(&self) -> Result<String, RelayError> {
        let ping = self
            .http
            .get(format!("{}/api", self.base_url))
            .send()
            .await
            .map_err(|_| RelayError::Unreachable)?;
        if ping.status().as_u16() != 200 {
            return Err(RelayError::Unreachable);
        }

        let probe_name = {
            let id = Uuid::new_v4().simple().to_string();
            format!("gorod_check_{}", &id[..8])
        };

        let result = self.put_stream(&probe_name, PROBE_SOURCE).await;
        self.delete_stream(&probe_name).await;
        result?;

        Ok(self.rtsp_host.clone())
    }

    /// Register (or replace) a stream. PUT first; go2rtc versions that
    /// reject re-registration get a PATCH with the same parameters.
    pub async fn upsert_stream(&self, name: &str, src: &str) -> Result<(), RelayError> {
        if self.put_stream(name, src).await.is_ok() {
            return Ok(());
        }

        let url = self.streams_url(&[("name", name), ("src", src)]);
        let resp = self
            .http
            .patch(url)
            .send()
            .await
            .map_err(|_| RelayError::Unreachable)?;
        let status = resp.status().as_u16();
        if status >= 400 {
            let body = resp.text().await.unwrap_or_default();
            debug!(status, body, "relay PATCH failed");
            return Err(RelayError::StreamsApiFailed {
                status: Some(status),
            });
        }
        Ok(())
    }

    /// Fetch one JPEG frame of a registered stream. Missing frames are
    /// `None`, not an error.
    pub async fn frame_jpeg(
        &self,
        name: &str,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<Option<Bytes>, RelayError> {
        let mut params: Vec<(&str, String)> = vec![("src", name.to_owned())];
        if let Some(width) = width {
            params.push(("width", width.to_string()));
        }
        if let Some(height) = height {
            params.push(("height", height.to_string()));
        }
        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
            .finish();

        let resp = self
            .http
            .get(format!("{}/api/frame.jpeg?{query}", self.base_url))
            .send()
            .await
            .map_err(|_| RelayError::Unreachable)?;
        if resp.status().as_u16() != 200 {
            return Ok(None);
        }
        resp.bytes()
            .await
            .map(Some)
            .map_err(|_| RelayError::Unreachable)
    }

    /// Remove a stream. 200/204/404 all count as gone; anything else is
    /// only logged -- cleanup is best-effort.
    pub async fn delete_stream(&self, name: &str) {
        let url = self.streams_url(&[("src", name)]);
        match self.http.delete(url).send().await {
            Ok(resp) => {
                let status = resp.status().as_u16();
                if !matches!(status, 200 | 204 | 404) {
                    let body = resp.text().await.unwrap_or_default();
                    debug!(status, body, "relay cleanup failed");
                }
            }
            Err(err) => debug!(error = %err, "relay cleanup request failed"),
        }
    }

    async fn put_stream(&self, name: &str, src: &str) -> Result<(), RelayError> {
        let url = self.streams_url(&[("name", name), ("src", src)]);
        let resp = self
            .http
            .put(url)
            .send()
            .await
            .map_err(|_| RelayError::Unreachable)?;
        let status = resp.status().as_u16();
        if matches!(status, 200 | 201 | 204) {
            Ok(())
        } else {
            let body = resp.text().await.unwrap_or_default();
            debug!(status, body, "relay streams check failed");
            Err(RelayError::StreamsApiFailed {
                status: Some(status),
            })
        }
    }

    fn streams_url(&self, params: &[(&str, &str)]) -> String {
        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();
        format!("{}/api/streams?{query}", self.base_url)
    }
}
