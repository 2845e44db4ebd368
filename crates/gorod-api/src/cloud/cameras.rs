// Camera endpoints.
//
// Three listings feed the camera aggregation (private, public, and the
// screen-sections grouping); snapshots and stream grants go through the
// "forpost" video backend, which is not place-scoped.

use tracing::debug;

use bytes::Bytes;

use crate::error::Error;

use super::client::CloudClient;
use super::models::{CameraId, CameraRecord, PlaceId, Section, SectionsEnvelope, StreamGrant};

impl CloudClient {
    /// List the private cameras of a place.
    ///
    /// `GET /rest/v1/places/{place}/cameras`
    pub async fn query_cameras(&self, place_id: PlaceId) -> Result<Vec<CameraRecord>, Error> {
        debug!(place_id, "querying cameras");
        let resp = self
            .transport()
            .get(&format!("/rest/v1/places/{place_id}/cameras"), Some(place_id))
            .await?;
        Self::parse_envelope(resp).await
    }

    /// List the public cameras visible from a place.
    ///
    /// `GET /rest/v2/places/{place}/public/cameras`
    pub async fn query_public_cameras(
        &self,
        place_id: PlaceId,
    ) -> Result<Vec<CameraRecord>, Error> {
        debug!(place_id, "querying public cameras");
        let resp = self
            .transport()
            .get(
                &format!("/rest/v2/places/{place_id}/public/cameras"),
                Some(place_id),
            )
            .await?;
        Self::parse_envelope(resp).await
    }

    /// List the screen sections of a place.
    ///
    /// `GET /rest/v1/places/{place}/screen-sections` -- note the
    /// `{"sections": ...}` envelope instead of the usual `data`.
    pub async fn query_sections(&self, place_id: PlaceId) -> Result<Vec<Section>, Error> {
        debug!(place_id, "querying screen sections");
        let resp = self
            .transport()
            .get(
                &format!("/rest/v1/places/{place_id}/screen-sections"),
                Some(place_id),
            )
            .await?;
        let envelope: SectionsEnvelope = Self::parse_json(resp).await?;
        Ok(envelope.sections)
    }

    /// Fetch a single-use stream URL for a camera.
    ///
    /// `GET /rest/v1/forpost/cameras/{camera}/video?LightStream=0`
    pub async fn query_camera_stream(&self, camera_id: CameraId) -> Result<Option<String>, Error> {
        debug!(camera_id, "querying camera stream");
        let resp = self
            .transport()
            .get(
                &format!("/rest/v1/forpost/cameras/{camera_id}/video?LightStream=0"),
                None,
            )
            .await?;
        let grant: StreamGrant = Self::parse_envelope(resp).await?;
        Ok(grant.url)
    }

    /// Fetch a camera snapshot as raw JPEG bytes.
    ///
    /// `GET /rest/v1/forpost/cameras/{camera}/snapshots?width=&height=`
    pub async fn query_camera_snapshot(
        &self,
        camera_id: CameraId,
        width: u32,
        height: u32,
    ) -> Result<Bytes, Error> {
        debug!(camera_id, width, height, "querying camera snapshot");
        self.transport()
            .get_bytes(
                &format!(
                    "/rest/v1/forpost/cameras/{camera_id}/snapshots?width={width}&height={height}"
                ),
                None,
            )
            .await
    }
}
