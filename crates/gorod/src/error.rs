//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` / `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use gorod_config::ConfigError;
use gorod_core::CoreError;

/// Exit codes.
#[allow(dead_code)]
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const JAMMED: i32 = 5;
    pub const RELAY: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed ({key})")]
    #[diagnostic(
        code(gorod::auth_failed),
        help(
            "The backend rejected this step with '{key}'.\n\
             Check the input and retry, or run: gorod login"
        )
    )]
    AuthFailed { key: &'static str, message: String },

    #[error("Session expired for account '{account}'")]
    #[diagnostic(
        code(gorod::session_expired),
        help("Re-authenticate with: gorod login")
    )]
    SessionExpired { account: String },

    #[error("No credentials stored for account '{account}'")]
    #[diagnostic(
        code(gorod::no_credentials),
        help(
            "Authenticate with: gorod login\n\
             Or set the GOROD_ACCESS_TOKEN environment variable."
        )
    )]
    NoCredentials { account: String },

    #[error("No stored account named '{account}'")]
    #[diagnostic(
        code(gorod::account_not_found),
        help("List stored accounts with: gorod config show")
    )]
    AccountNotFound { account: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(gorod::not_found),
        help("Run: gorod {list_command} to see what the backend reports")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Locks ────────────────────────────────────────────────────────
    #[error("Lock '{lock}' is jammed -- the open request failed")]
    #[diagnostic(
        code(gorod::lock_jammed),
        help("The open action did not reach the door. Check connectivity and retry.")
    )]
    Jammed { lock: String },

    // ── Relay ────────────────────────────────────────────────────────
    #[error("Media relay check failed ({key})")]
    #[diagnostic(
        code(gorod::relay),
        help(
            "Verify the go2rtc instance:\n\
             - base URL reachable (GET <base>/api answers 200)\n\
             - streams API writable"
        )
    )]
    Relay { key: &'static str, message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(gorod::api_error))]
    ApiError {
        message: String,
        status: Option<u16>,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(gorod::config),
        help("The account store lives at the path shown by: gorod config path")
    )]
    Config { message: String },

    // ── Interactive / IO ─────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(gorod::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AuthFailed { .. }
            | Self::SessionExpired { .. }
            | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::AccountNotFound { .. } | Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Jammed { .. } => exit_code::JAMMED,
            Self::Relay { .. } => exit_code::RELAY,
            _ => exit_code::GENERAL,
        }
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(err: dialoguer::Error) -> Self {
        Self::Io(std::io::Error::other(err))
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthenticationFailed { key, message } => {
                CliError::AuthFailed { key, message }
            }

            CoreError::InvalidTransition { stage, action } => CliError::ApiError {
                message: format!("auth flow cannot {action} in the {stage} stage"),
                status: None,
            },

            CoreError::ContractNotFound { subscriber_id } => CliError::NotFound {
                resource_type: "contract".into(),
                identifier: subscriber_id.to_string(),
                list_command: "login".into(),
            },

            CoreError::CameraNotFound { id } => CliError::NotFound {
                resource_type: "camera".into(),
                identifier: id.to_string(),
                list_command: "cameras list".into(),
            },

            CoreError::AccessControlNotFound { id } => CliError::NotFound {
                resource_type: "access control".into(),
                identifier: id.to_string(),
                list_command: "locks list".into(),
            },

            CoreError::EntranceNotFound { id } => CliError::NotFound {
                resource_type: "entrance".into(),
                identifier: id.to_string(),
                list_command: "locks list".into(),
            },

            CoreError::BalanceNotFound { place_id } => CliError::NotFound {
                resource_type: "balance".into(),
                identifier: place_id.to_string(),
                list_command: "places".into(),
            },

            CoreError::Relay { key, message } => CliError::Relay { key, message },

            CoreError::Api { message, status } => CliError::ApiError { message, status },

            CoreError::Config { message } => CliError::Config { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { account } => CliError::NoCredentials { account },
            ConfigError::AccountNotFound { account } => CliError::AccountNotFound { account },
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
