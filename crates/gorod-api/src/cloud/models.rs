// Cloud API response types.
//
// Models for the vendor's JSON payloads. Most endpoints wrap their payload
// in `{"data": ...}`; the auth endpoints return bare bodies. Fields use
// `#[serde(default)]` liberally because the API is inconsistent about
// field presence across operators, with a `flatten` catch-all where the
// payload is known to carry undocumented fields.

use serde::{Deserialize, Serialize};

/// Numeric identifiers used across the API.
pub type PlaceId = i64;
pub type AccessControlId = i64;
pub type EntranceId = i64;
pub type CameraId = i64;

// ── Response envelopes ───────────────────────────────────────────────

/// Standard `{"data": ...}` envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// The screen-sections endpoint uses its own key.
#[derive(Debug, Deserialize)]
pub struct SectionsEnvelope {
    #[serde(default)]
    pub sections: Vec<Section>,
}

// ── Authentication ───────────────────────────────────────────────────

/// One subscriber agreement attached to a phone number. Selected once
/// during SMS authentication, then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub operator_id: i64,
    pub subscriber_id: i64,
    pub place_id: PlaceId,
}

/// Outcome of the contract lookup that opens every auth flow.
#[derive(Debug, Clone)]
pub enum ContractsOutcome {
    /// HTTP 200: the account authenticates with a password.
    PasswordRequired,
    /// HTTP 300: the account authenticates by picking a contract and
    /// confirming an SMS code.
    Contracts(Vec<Contract>),
}

/// Token triple returned by both the password and the SMS endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub operator_id: i64,
}

/// Subscriber profile, fetched right after authentication.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub subscriber: Subscriber,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
}

// ── Places ───────────────────────────────────────────────────────────

/// Entry of the subscriber-places listing. The place itself is nested;
/// entries without one are skipped by the aggregation layer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberPlace {
    #[serde(default)]
    pub place: Option<Place>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A physical site/address associated with the account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: PlaceId,
    #[serde(default)]
    pub address: Option<PlaceAddress>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceAddress {
    #[serde(default)]
    pub visible_address: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Access controls ──────────────────────────────────────────────────

/// A door/gate controller, optionally split into entrances.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessControl {
    pub id: AccessControlId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub allow_open: Option<bool>,
    #[serde(default)]
    pub external_camera_id: Option<CameraId>,
    #[serde(default)]
    pub entrances: Vec<Entrance>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entrance {
    pub id: EntranceId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub allow_open: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Cameras ──────────────────────────────────────────────────────────

/// Camera record from the private and public camera listings. The stream
/// backend ("forpost") keys cameras by `externalCameraId`; records without
/// one fall back to their own id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraRecord {
    #[serde(default)]
    pub id: Option<CameraId>,
    #[serde(default)]
    pub external_camera_id: Option<CameraId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CameraRecord {
    /// The id the stream backend knows this camera by.
    pub fn stream_id(&self) -> Option<CameraId> {
        self.external_camera_id.or(self.id)
    }
}

/// Screen section from the screen-sections listing. Queried during camera
/// aggregation; the vendor app groups cameras by section, this client does
/// not use the grouping yet.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Single-use stream grant from the forpost video endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamGrant {
    #[serde(default, rename = "URL")]
    pub url: Option<String>,
}

// ── Finance ──────────────────────────────────────────────────────────

/// Per-place finance snapshot.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceInfo {
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default)]
    pub block_type: Option<String>,
    #[serde(default)]
    pub blocked: Option<bool>,
    #[serde(default)]
    pub target_date: Option<String>,
    #[serde(default)]
    pub amount_sum: Option<f64>,
    #[serde(default)]
    pub payment_link: Option<String>,
}
