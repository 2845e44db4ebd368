// Camera entity.
//
// Snapshots go straight through the coordinator, keeping the last good
// frame for consumers that poll. Stream sources are single-use vendor FLV
// URLs; with a relay configured the source is registered with go2rtc and
// consumers get a stable RTSP URL instead.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use gorod_api::cloud::models::CameraId;
use gorod_api::relay::{RelayClient, ffmpeg_source};

use crate::coordinator::Coordinator;
use crate::error::CoreError;
use crate::model::Camera;

/// Relay configuration as stored on the account.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub base_url: String,
    /// Override for the host RTSP consumers connect to; defaults to the
    /// host of `base_url`.
    pub rtsp_host: Option<String>,
}

struct RelayRuntime {
    client: RelayClient,
    rtsp_host: String,
}

pub struct CameraEntity {
    coordinator: Arc<Coordinator>,
    id: CameraId,
    name: String,
    image: Option<Bytes>,
    relay: Option<RelayRuntime>,
    stream_name: String,
    last_src: Option<String>,
}

impl CameraEntity {
    /// Build the entity. An unusable relay configuration (missing or
    /// malformed base URL) degrades to direct streaming.
    pub fn new(
        coordinator: Arc<Coordinator>,
        camera: &Camera,
        relay: Option<RelaySettings>,
    ) -> Self {
        let relay = relay.and_then(|settings| match RelayClient::new(&settings.base_url) {
            Ok(client) => {
                let rtsp_host = settings
                    .rtsp_host
                    .filter(|host| !host.trim().is_empty())
                    .unwrap_or_else(|| client.rtsp_host().to_owned());
                Some(RelayRuntime { client, rtsp_host })
            }
            Err(err) => {
                warn!(error = %err, "relay disabled: unusable base URL");
                None
            }
        });

        Self {
            coordinator,
            id: camera.id,
            name: camera.name.clone(),
            image: None,
            relay,
            stream_name: format!("eg_{}", camera.id),
            last_src: None,
        }
    }

    pub fn id(&self) -> CameraId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unique_id(&self) -> String {
        format!("{}_{}", self.id, self.name)
    }

    /// Whether streams go through the relay.
    pub fn uses_relay(&self) -> bool {
        self.relay.is_some()
    }

    /// Fetch a snapshot, falling back to the last good frame when the
    /// backend has none to offer.
    pub async fn camera_image(
        &mut self,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Option<Bytes> {
        match self
            .coordinator
            .get_camera_snapshot(self.id, width, height)
            .await
        {
            Ok(image) if !image.is_empty() => {
                self.image = Some(image);
            }
            Ok(_) => debug!(camera_id = self.id, "empty snapshot, keeping last frame"),
            Err(err) => warn!(camera_id = self.id, error = %err, "snapshot failed"),
        }
        self.image.clone()
    }

    /// Resolve the stream source. `Ok(None)` means the camera currently
    /// has no stream; relay registration failures are typed errors.
    pub async fn stream_source(&mut self) -> Result<Option<String>, CoreError> {
        let Some(stream_url) = self.coordinator.get_camera_stream(self.id).await else {
            warn!(camera_id = self.id, name = %self.name, "empty source stream url");
            return Ok(None);
        };

        let Some(relay) = &self.relay else {
            return Ok(Some(stream_url));
        };

        let src = ffmpeg_source(&stream_url);
        if self.last_src.as_deref() != Some(src.as_str()) {
            relay.client.upsert_stream(&self.stream_name, &src).await?;
            self.last_src = Some(src);
            debug!(stream = %self.stream_name, "relay stream updated");
        }

        Ok(Some(format!(
            "rtsp://{}:{}/{}",
            relay.rtsp_host,
            gorod_api::relay::RELAY_RTSP_PORT,
            self.stream_name
        )))
    }

    /// Re-aggregate and refresh this camera's record.
    pub async fn update(&mut self) -> Result<(), CoreError> {
        let camera = self.coordinator.update_camera_state(self.id).await?;
        self.name = camera.name;
        Ok(())
    }
}
