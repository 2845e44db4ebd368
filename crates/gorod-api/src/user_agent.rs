// Synthesized device identity.
//
// The backend fingerprints clients through a structured user-agent string.
// Each stored account gets a randomized identity, created once and persisted;
// the instance UUID must stay stable for the account's lifetime or the
// backend treats requests as coming from a new device.

use std::fmt;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// App build advertised in the user-agent header.
pub const APP_VERSION_NAME: &str = "8.23.0";
pub const APP_VERSION_CODE: &str = "82300000";

/// Android release advertised in the user-agent header.
pub const ANDROID_OS_VERSION: &str = "15";

/// Device pool for new identities. Matches the handsets the vendor's own
/// app ships on; one is picked at random per account.
const DEVICE_POOL: &[(&str, &str)] = &[
    ("Google", "Pixel 5a"),
    ("Google", "Pixel 6"),
    ("Google", "Pixel 6 Pro"),
    ("Google", "Pixel 6a"),
    ("Google", "Pixel 7"),
    ("Google", "Pixel 7 Pro"),
    ("Google", "Pixel 7a"),
    ("Google", "Pixel 8"),
    ("Google", "Pixel 8 Pro"),
    ("Google", "Pixel 8a"),
];

/// The literal the app sends for identifiers that are not known yet.
const UNKNOWN: &str = "null";

/// App version pair as rendered into the header: `name (code)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppVersion {
    pub name: String,
    pub code: String,
}

impl Default for AppVersion {
    fn default() -> Self {
        Self {
            name: APP_VERSION_NAME.into(),
            code: APP_VERSION_CODE.into(),
        }
    }
}

/// Randomized but stable device identity for one stored account.
///
/// `account_id` and `operator_id` start out unknown and are stamped once
/// during authentication; `place_id` is a per-request value and is passed
/// explicitly to [`header_value`](Self::header_value) rather than mutated
/// in place between calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAgent {
    pub manufacturer: String,
    pub model: String,
    pub os_version: String,
    pub app_version: AppVersion,
    pub account_id: String,
    pub operator_id: String,
    pub instance_id: String,
    pub place_id: String,
}

impl UserAgent {
    /// Create a fresh identity: random device from the pool, new v4 UUID.
    pub fn random() -> Self {
        let (manufacturer, model) = DEVICE_POOL
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(("Google", "Pixel 6"));

        Self {
            manufacturer: manufacturer.into(),
            model: model.into(),
            os_version: ANDROID_OS_VERSION.into(),
            app_version: AppVersion::default(),
            account_id: String::new(),
            operator_id: UNKNOWN.into(),
            instance_id: Uuid::new_v4().to_string(),
            place_id: UNKNOWN.into(),
        }
    }

    /// Parse a previously persisted identity.
    pub fn from_json(value: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(value)
    }

    /// Serialize for persistence in the account store.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Stamp the operator id learned from an auth response.
    pub fn set_operator(&mut self, operator_id: i64) {
        self.operator_id = operator_id.to_string();
    }

    /// Stamp the account id learned from the subscriber profile.
    pub fn set_account(&mut self, account_id: &str) {
        self.account_id = account_id.to_owned();
    }

    /// Render the header value, with the place id of the request being
    /// issued. `None` falls back to the stored (usually `"null"`) value.
    pub fn header_value(&self, place_id: Option<i64>) -> String {
        let place = place_id.map_or_else(|| self.place_id.clone(), |id| id.to_string());
        format!(
            "{} {} | Android {} | ntk | {} ({}) | {} | {} | {} | {}",
            self.manufacturer,
            self.model,
            self.os_version,
            self.app_version.name,
            self.app_version.code,
            self.account_id,
            self.operator_id,
            self.instance_id,
            place,
        )
    }
}

impl fmt::Display for UserAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header_value(None))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::UserAgent;

    #[test]
    fn json_round_trip_preserves_all_eight_fields() {
        let mut agent = UserAgent::random();
        agent.set_operator(14);
        agent.set_account("ACC-42");
        agent.place_id = "1337".into();

        let json = agent.to_json().unwrap();
        let restored = UserAgent::from_json(&json).unwrap();

        assert_eq!(agent, restored);
        assert_eq!(restored.manufacturer, agent.manufacturer);
        assert_eq!(restored.model, agent.model);
        assert_eq!(restored.os_version, agent.os_version);
        assert_eq!(restored.app_version, agent.app_version);
        assert_eq!(restored.account_id, "ACC-42");
        assert_eq!(restored.operator_id, "14");
        assert_eq!(restored.instance_id, agent.instance_id);
        assert_eq!(restored.place_id, "1337");
    }

    #[test]
    fn header_renders_the_app_format() {
        let mut agent = UserAgent::random();
        agent.manufacturer = "Google".into();
        agent.model = "Pixel 7".into();
        agent.instance_id = "uuid-1".into();

        let header = agent.header_value(None);
        assert!(header.starts_with("Google Pixel 7 | Android 15 | ntk | 8.23.0 (82300000) | "));
        assert!(header.ends_with("| null | uuid-1 | null"));
    }

    #[test]
    fn header_place_is_a_per_request_override() {
        let agent = UserAgent::random();
        let header = agent.header_value(Some(5150));
        assert!(header.ends_with("| 5150"));
        // The stored identity is untouched by rendering.
        assert_eq!(agent.place_id, "null");
    }

    #[test]
    fn fresh_identities_get_distinct_instance_ids() {
        assert_ne!(
            UserAgent::random().instance_id,
            UserAgent::random().instance_id
        );
    }
}
