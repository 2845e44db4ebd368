//! Persisted account store for gorod.
//!
//! TOML file with a versioned schema, credential resolution
//! (env + keyring + plaintext), and translation to a ready-to-use
//! `gorod_api::CloudClient`. The schema is migrated in place on load:
//! v1 entries predate the synthesized device identity, v2 entries predate
//! the media-relay settings.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use gorod_api::transport::TransportConfig;
use gorod_api::user_agent::UserAgent;
use gorod_api::CloudClient;
use gorod_core::AccountInfo;

/// Current schema version.
pub const SCHEMA_VERSION: u32 = 3;

/// Relay defaults applied by the v2 -> v3 migration.
pub const DEFAULT_RELAY_BASE_URL: &str = "http://127.0.0.1:1984";
pub const DEFAULT_RELAY_RTSP_HOST: &str = "127.0.0.1";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials stored for account '{account}'")]
    NoCredentials { account: String },

    #[error("no account named '{account}' in the store")]
    AccountNotFound { account: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("stored device identity is corrupt: {0}")]
    Identity(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Schema ──────────────────────────────────────────────────────────

/// Top-level store: schema version plus the named accounts.
#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Account commands act on when none is named.
    pub default_account: Option<String>,

    #[serde(default)]
    pub accounts: HashMap<String, AccountEntry>,
}

fn default_version() -> u32 {
    SCHEMA_VERSION
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            default_account: None,
            accounts: HashMap::new(),
        }
    }
}

/// One stored account. The optional fields were introduced by schema
/// migrations and are filled with defaults on load; after
/// [`migrate_settings`] runs they are always present.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AccountEntry {
    pub name: String,
    #[serde(default)]
    pub account_id: Option<String>,
    pub subscriber_id: i64,
    /// Plaintext fallback; the keyring copy wins when present.
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub operator_id: i64,
    /// Serialized [`UserAgent`] JSON. Added in v2.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Media-relay settings. Added in v3.
    #[serde(default)]
    pub use_relay: Option<bool>,
    #[serde(default)]
    pub relay_base_url: Option<String>,
    #[serde(default)]
    pub relay_rtsp_host: Option<String>,
}

impl AccountEntry {
    /// Build an entry from a freshly resolved auth flow.
    pub fn from_account(info: &AccountInfo) -> Result<Self, ConfigError> {
        Ok(Self {
            name: info.name.clone(),
            account_id: info.account_id.clone(),
            subscriber_id: info.subscriber_id,
            access_token: info.access_token.clone(),
            refresh_token: info.refresh_token.clone(),
            operator_id: info.operator_id,
            user_agent: Some(info.user_agent.to_json()?),
            use_relay: Some(false),
            relay_base_url: Some(DEFAULT_RELAY_BASE_URL.into()),
            relay_rtsp_host: Some(DEFAULT_RELAY_RTSP_HOST.into()),
        })
    }

    pub fn use_relay(&self) -> bool {
        self.use_relay.unwrap_or(false)
    }

    /// The stored device identity, synthesizing one for pre-v2 entries
    /// that were never migrated.
    pub fn user_agent(&self) -> Result<UserAgent, ConfigError> {
        match self.user_agent.as_deref() {
            Some(json) => Ok(UserAgent::from_json(json)?),
            None => {
                let mut agent = UserAgent::random();
                agent.set_operator(self.operator_id);
                Ok(agent)
            }
        }
    }
}

// ── Migration ───────────────────────────────────────────────────────

/// Bring a loaded store up to [`SCHEMA_VERSION`]. Returns `true` when
/// anything changed and the store should be saved back.
pub fn migrate_settings(settings: &mut Settings) -> Result<bool, ConfigError> {
    let mut changed = false;

    // v1 -> v2: synthesize the device identity, stamped with the stored
    // operator id.
    if settings.version == 1 {
        debug!("migrating account store from version 1");
        for entry in settings.accounts.values_mut() {
            if entry.user_agent.is_none() {
                let mut agent = UserAgent::random();
                agent.set_operator(entry.operator_id);
                entry.user_agent = Some(agent.to_json()?);
            }
        }
        settings.version = 2;
        changed = true;
        debug!("migration to version 2 successful");
    }

    // v2 -> v3: media-relay settings with defaults.
    if settings.version == 2 {
        debug!("migrating account store from version 2");
        for entry in settings.accounts.values_mut() {
            entry.use_relay.get_or_insert(false);
            entry
                .relay_base_url
                .get_or_insert_with(|| DEFAULT_RELAY_BASE_URL.into());
            entry
                .relay_rtsp_host
                .get_or_insert_with(|| DEFAULT_RELAY_RTSP_HOST.into());
        }
        settings.version = 3;
        changed = true;
        debug!("migration to version 3 successful");
    }

    Ok(changed)
}

// ── Upsert ──────────────────────────────────────────────────────────

/// Result of storing a freshly authenticated account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// New account stored.
    Created,
    /// An existing account matched on identity; its session was replaced.
    Reauthed,
    /// The exact same session is already stored; nothing changed.
    AlreadyConfigured,
}

/// Store an account. Token identity short-circuits (the same session is
/// already there); a name/account/subscriber match refreshes the session
/// material of the existing entry, keeping its relay settings.
pub fn upsert_account(settings: &mut Settings, entry: AccountEntry) -> UpsertOutcome {
    if settings
        .accounts
        .values()
        .any(|existing| existing.access_token == entry.access_token)
    {
        return UpsertOutcome::AlreadyConfigured;
    }

    let matched = settings.accounts.iter_mut().find(|(_, existing)| {
        existing.name == entry.name
            && existing.account_id == entry.account_id
            && existing.subscriber_id == entry.subscriber_id
    });

    if let Some((_, existing)) = matched {
        existing.access_token = entry.access_token;
        existing.refresh_token = entry.refresh_token;
        existing.operator_id = entry.operator_id;
        existing.user_agent = entry.user_agent;
        return UpsertOutcome::Reauthed;
    }

    let key = entry.name.clone();
    if settings.default_account.is_none() {
        settings.default_account = Some(key.clone());
    }
    settings.accounts.insert(key, entry);
    UpsertOutcome::Created
}

/// Find the entry a command should act on: the named one, the default,
/// or -- when exactly one account exists -- that one.
pub fn select_account<'a>(
    settings: &'a Settings,
    name: Option<&str>,
) -> Result<(&'a str, &'a AccountEntry), ConfigError> {
    let key = name
        .map(str::to_owned)
        .or_else(|| settings.default_account.clone())
        .or_else(|| {
            (settings.accounts.len() == 1)
                .then(|| settings.accounts.keys().next().cloned())
                .flatten()
        })
        .ok_or_else(|| ConfigError::AccountNotFound {
            account: "(default)".into(),
        })?;

    settings
        .accounts
        .get_key_value(&key)
        .map(|(k, v)| (k.as_str(), v))
        .ok_or(ConfigError::AccountNotFound { account: key })
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the store path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("ru", "gorod", "gorod").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("accounts.toml");
            p
        },
        |dirs| dirs.config_dir().join("accounts.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("gorod");
    p
}

// ── Loading / saving ────────────────────────────────────────────────

/// Load the store from a specific file plus `GOROD_*` environment
/// overrides, applying schema migrations in memory.
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("GOROD_").only(&["default_account"]));

    let mut settings: Settings = figment.extract()?;
    if migrate_settings(&mut settings)? {
        debug!("account store migrated to version {}", settings.version);
    }
    Ok(settings)
}

/// Load the store from the canonical path.
pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from(&config_path())
}

/// Load, falling back to an empty store.
pub fn load_settings_or_default() -> Settings {
    load_settings().unwrap_or_default()
}

/// Serialize the store to TOML at a specific path.
pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(settings)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Serialize the store to the canonical path.
pub fn save_settings(settings: &Settings) -> Result<(), ConfigError> {
    save_settings_to(settings, &config_path())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the access token for an account: env var, then keyring, then
/// the plaintext copy in the store.
pub fn resolve_access_token(
    entry: &AccountEntry,
    account_name: &str,
) -> Result<SecretString, ConfigError> {
    // 1. Environment override
    if let Ok(val) = std::env::var("GOROD_ACCESS_TOKEN") {
        return Ok(SecretString::from(val));
    }

    // 2. System keyring
    if let Ok(keyring_entry) = keyring::Entry::new("gorod", &format!("{account_name}/access-token"))
    {
        if let Ok(secret) = keyring_entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in the store
    if !entry.access_token.is_empty() {
        return Ok(SecretString::from(entry.access_token.clone()));
    }

    Err(ConfigError::NoCredentials {
        account: account_name.into(),
    })
}

/// Mirror the tokens into the keyring. Best-effort: headless systems
/// without a secret service keep the plaintext copy.
pub fn store_tokens(account_name: &str, access_token: &str, refresh_token: Option<&str>) {
    let write = |slot: &str, value: &str| {
        match keyring::Entry::new("gorod", &format!("{account_name}/{slot}")) {
            Ok(entry) => {
                if let Err(err) = entry.set_password(value) {
                    warn!(account = account_name, slot, error = %err, "keyring write failed");
                }
            }
            Err(err) => warn!(account = account_name, slot, error = %err, "keyring unavailable"),
        }
    };

    write("access-token", access_token);
    if let Some(refresh_token) = refresh_token {
        write("refresh-token", refresh_token);
    }
}

// ── Client construction ─────────────────────────────────────────────

/// Build a session-carrying `CloudClient` for a stored account.
pub fn entry_to_client(
    entry: &AccountEntry,
    account_name: &str,
    transport: &TransportConfig,
) -> Result<CloudClient, ConfigError> {
    let token = resolve_access_token(entry, account_name)?;
    let agent = entry.user_agent()?;

    CloudClient::for_session(agent, token, Some(entry.operator_id.to_string()), transport)
        .map_err(|err| ConfigError::Validation {
            field: "transport".into(),
            reason: err.to_string(),
        })
}
