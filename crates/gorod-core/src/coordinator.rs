// ── Polling aggregation coordinator ──
//
// Owns the cloud client and the subscriber's places list. The places list
// is fetched once by `refresh()` and cached for the coordinator's
// lifetime; a place added server-side needs a new coordinator. Aggregation
// methods iterate the cached places sequentially and build flat lists the
// entities and the CLI consume.

use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::{info, warn};

use gorod_api::CloudClient;
use gorod_api::cloud::models::{AccessControlId, CameraId, EntranceId, Place, PlaceId};

use crate::error::CoreError;
use crate::model::{Balance, Camera, Lock, dedupe_by_id, locks_from_access_control};

/// Snapshot width when the caller does not specify one.
pub const DEFAULT_SNAPSHOT_WIDTH: u32 = 300;

/// Resolve the snapshot dimensions: width defaults to
/// [`DEFAULT_SNAPSHOT_WIDTH`], height to a 16:9 fit of the width.
pub fn resolve_snapshot_size(width: Option<u32>, height: Option<u32>) -> (u32, u32) {
    let width = width.unwrap_or(DEFAULT_SNAPSHOT_WIDTH);
    let height = height.unwrap_or_else(|| (f64::from(width) * 9.0 / 16.0).round() as u32);
    (width, height)
}

/// Coordinator for one authenticated account.
pub struct Coordinator {
    client: CloudClient,
    places: RwLock<Vec<Place>>,
}

impl Coordinator {
    pub fn new(client: CloudClient) -> Self {
        Self {
            client,
            places: RwLock::new(Vec::new()),
        }
    }

    /// The underlying cloud client.
    pub fn client(&self) -> &CloudClient {
        &self.client
    }

    /// Fetch the subscriber's places. Called once at setup; entries
    /// without a nested place are skipped.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        info!("loading subscriber places");
        let subscriber_places = self.client.query_places().await?;
        let places: Vec<Place> = subscriber_places
            .into_iter()
            .filter_map(|entry| entry.place)
            .collect();
        info!(count = places.len(), "places loaded");
        *self.places.write().await = places;
        Ok(())
    }

    /// The cached places.
    pub async fn places(&self) -> Vec<Place> {
        self.places.read().await.clone()
    }

    async fn place_ids(&self) -> Vec<PlaceId> {
        self.places.read().await.iter().map(|p| p.id).collect()
    }

    // ── Cameras ──────────────────────────────────────────────────────

    /// Build the deduplicated camera list across all places.
    pub async fn get_cameras_info(&self) -> Result<Vec<Camera>, CoreError> {
        info!("getting cameras info");
        self.collect_cameras().await
    }

    /// Re-aggregate and return one camera. A camera that disappeared
    /// server-side is a [`CoreError::CameraNotFound`].
    pub async fn update_camera_state(&self, camera_id: CameraId) -> Result<Camera, CoreError> {
        info!(camera_id, "updating camera state");
        let cameras = self.collect_cameras().await?;
        cameras
            .into_iter()
            .find(|camera| camera.id == camera_id)
            .ok_or(CoreError::CameraNotFound { id: camera_id })
    }

    /// Fetch a single-use stream URL. Transport failures degrade to
    /// `None` -- a camera without a stream is unavailable, not fatal.
    pub async fn get_camera_stream(&self, camera_id: CameraId) -> Option<String> {
        info!(camera_id, "getting camera stream");
        match self.client.query_camera_stream(camera_id).await {
            Ok(url) => url,
            Err(err) => {
                warn!(camera_id, error = %err, "camera stream query failed");
                None
            }
        }
    }

    /// Fetch snapshot bytes, applying the default sizing rules.
    pub async fn get_camera_snapshot(
        &self,
        camera_id: CameraId,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<Bytes, CoreError> {
        let (width, height) = resolve_snapshot_size(width, height);
        info!(camera_id, width, height, "getting camera snapshot");
        Ok(self
            .client
            .query_camera_snapshot(camera_id, width, height)
            .await?)
    }

    async fn collect_cameras(&self) -> Result<Vec<Camera>, CoreError> {
        let mut cameras: Vec<Camera> = Vec::new();

        for place_id in self.place_ids().await {
            let access_controls = self.client.query_access_controls(place_id).await?;
            cameras.extend(
                access_controls
                    .iter()
                    .filter_map(Camera::from_access_control),
            );

            let public_cameras = self.client.query_public_cameras(place_id).await?;
            cameras.extend(public_cameras.iter().filter_map(Camera::from_record));

            // The vendor app fetches the screen-sections grouping at this
            // point; the grouping is not used for the flat list yet.
            self.client.query_sections(place_id).await?;

            let private_cameras = self.client.query_cameras(place_id).await?;
            cameras.extend(private_cameras.iter().filter_map(Camera::from_record));
        }

        Ok(dedupe_by_id(cameras))
    }

    // ── Locks ────────────────────────────────────────────────────────

    /// Build the lock list across all places.
    pub async fn get_locks_info(&self) -> Result<Vec<Lock>, CoreError> {
        info!("getting locks info");

        let mut locks: Vec<Lock> = Vec::new();
        for place_id in self.place_ids().await {
            let access_controls = self.client.query_access_controls(place_id).await?;
            for access_control in &access_controls {
                locks.extend(locks_from_access_control(place_id, access_control));
            }
        }
        Ok(locks)
    }

    /// Re-fetch one lock's state.
    pub async fn update_lock_state(
        &self,
        place_id: PlaceId,
        access_control_id: AccessControlId,
        entrance_id: Option<EntranceId>,
    ) -> Result<Lock, CoreError> {
        info!(place_id, access_control_id, ?entrance_id, "updating lock state");

        let access_controls = self.client.query_access_controls(place_id).await?;
        let access_control = access_controls
            .iter()
            .find(|ac| ac.id == access_control_id)
            .ok_or(CoreError::AccessControlNotFound {
                id: access_control_id,
            })?;

        let Some(entrance_id) = entrance_id else {
            return Ok(Lock {
                place_id,
                access_control_id: access_control.id,
                entrance_id: None,
                name: access_control.name.clone().unwrap_or_default(),
                openable: access_control.allow_open.unwrap_or(false),
            });
        };

        let entrance = access_control
            .entrances
            .iter()
            .find(|entrance| entrance.id == entrance_id)
            .ok_or(CoreError::EntranceNotFound { id: entrance_id })?;

        Ok(Lock {
            place_id,
            access_control_id: access_control.id,
            entrance_id: Some(entrance.id),
            name: entrance.name.clone().unwrap_or_default(),
            openable: entrance.allow_open.unwrap_or(false),
        })
    }

    /// Fire the open action on a lock.
    pub async fn open_lock(
        &self,
        place_id: PlaceId,
        access_control_id: AccessControlId,
        entrance_id: Option<EntranceId>,
    ) -> Result<(), CoreError> {
        info!(place_id, access_control_id, ?entrance_id, "opening lock");
        Ok(self
            .client
            .open_lock(place_id, access_control_id, entrance_id)
            .await?)
    }

    // ── Balances ─────────────────────────────────────────────────────

    /// Fetch the balances of all places. Places without billing data are
    /// skipped.
    pub async fn get_balances_info(&self) -> Result<Vec<Balance>, CoreError> {
        info!("getting balances info");

        let mut balances: Vec<Balance> = Vec::new();
        for place_id in self.place_ids().await {
            if let Some(finance) = self.client.query_balance(place_id).await? {
                balances.push(Balance::from_finance(place_id, finance));
            }
        }
        Ok(balances)
    }

    /// Re-fetch one place's balance.
    pub async fn update_balance_state(&self, place_id: PlaceId) -> Result<Balance, CoreError> {
        info!(place_id, "updating balance state");
        let finance = self
            .client
            .query_balance(place_id)
            .await?
            .ok_or(CoreError::BalanceNotFound { place_id })?;
        Ok(Balance::from_finance(place_id, finance))
    }
}
