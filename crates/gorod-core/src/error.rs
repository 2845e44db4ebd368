// ── Core error types ──
//
// User-facing errors from gorod-core. Consumers never see raw HTTP status
// codes or JSON parse failures directly; the `From<gorod_api::Error>` impl
// translates transport-layer errors into domain-appropriate variants. The
// not-found family is how a stale entity surfaces after a refresh -- the
// entity goes unavailable, the process keeps running.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Authentication ───────────────────────────────────────────────
    /// Auth step rejected by the backend. `key` is the stable form-error
    /// tag (`invalid_password`, `limit_exceeded`, ...) for UIs that show
    /// inline errors next to the offending input.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        key: &'static str,
        message: String,
    },

    /// An auth-flow input arrived in a state that does not accept it.
    #[error("Cannot {action} while the auth flow is in the {stage} stage")]
    InvalidTransition {
        stage: &'static str,
        action: &'static str,
    },

    /// The selected contract is not in the list the backend returned.
    #[error("No contract for subscriber {subscriber_id}")]
    ContractNotFound { subscriber_id: i64 },

    // ── Stale-entity errors ──────────────────────────────────────────
    #[error("Camera {id} not found")]
    CameraNotFound { id: i64 },

    #[error("Access control {id} not found")]
    AccessControlNotFound { id: i64 },

    #[error("Entrance {id} not found")]
    EntranceNotFound { id: i64 },

    #[error("Finance data not found for place {place_id}")]
    BalanceNotFound { place_id: i64 },

    // ── Relay ────────────────────────────────────────────────────────
    /// Media-relay failure, keyed like the relay configuration form.
    #[error("Relay error: {message}")]
    Relay {
        key: &'static str,
        message: String,
    },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Returns `true` if re-authentication might resolve this error.
    pub fn is_auth_expired(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed {
                key: "unauthorized",
                ..
            }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<gorod_api::Error> for CoreError {
    fn from(err: gorod_api::Error) -> Self {
        use gorod_api::Error as Api;
        match err {
            Api::MissingPhone
            | Api::InvalidLogin
            | Api::Unregistered
            | Api::InvalidPassword
            | Api::LimitExceeded
            | Api::InvalidFormat
            | Api::Unauthorized => CoreError::AuthenticationFailed {
                key: err.form_key(),
                message: err.to_string(),
            },
            Api::UnknownStatus { status } => CoreError::Api {
                message: err.to_string(),
                status,
            },
            Api::Status { status, ref body } => CoreError::Api {
                message: format!("HTTP {status}: {body}"),
                status: Some(status),
            },
            Api::Transport(ref e) => CoreError::Api {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            },
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Deserialization { message, .. } => CoreError::Api {
                message: format!("Malformed response: {message}"),
                status: None,
            },
        }
    }
}

impl From<gorod_api::RelayError> for CoreError {
    fn from(err: gorod_api::RelayError) -> Self {
        CoreError::Relay {
            key: err.form_key(),
            message: err.to_string(),
        }
    }
}
