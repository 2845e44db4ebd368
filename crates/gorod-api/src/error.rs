use thiserror::Error;

/// Top-level error type for the `gorod-api` crate.
///
/// The authentication variants form a closed taxonomy mirroring the error
/// keys the mobile app shows on its login forms; `form_key()` exposes that
/// mapping. `gorod-core` translates these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// A phone-scoped call was issued before `query_contracts` cached one.
    #[error("No phone number on this client -- call query_contracts first")]
    MissingPhone,

    /// The backend rejected the phone number (HTTP 400 on contract lookup).
    #[error("Invalid login")]
    InvalidLogin,

    /// The phone number has no contracts (HTTP 204 on contract lookup).
    #[error("Phone number is not registered")]
    Unregistered,

    /// Password authentication rejected (HTTP 400).
    #[error("Invalid password")]
    InvalidPassword,

    /// SMS code request throttled by the backend (HTTP 429).
    #[error("SMS code request limit exceeded")]
    LimitExceeded,

    /// SMS code rejected (HTTP 406).
    #[error("SMS code has an invalid format")]
    InvalidFormat,

    /// Access token missing, expired, or revoked (HTTP 401).
    #[error("Unauthorized -- re-authentication required")]
    Unauthorized,

    /// The endpoint answered with a status outside its documented set.
    #[error("Unexpected API status{}", fmt_status(.status))]
    UnknownStatus { status: Option<u16> },

    // ── Transport ───────────────────────────────────────────────────
    /// Non-success HTTP status, not yet translated by an endpoint.
    /// Endpoint modules pattern-match on `status` to produce the typed
    /// variants above; anything unmatched collapses to `UnknownStatus`.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map_or_else(String::new, |s| format!(" (HTTP {s})"))
}

impl Error {
    /// The stable form-error key shown next to the input that caused
    /// the failure. Unrecognized conditions collapse to `unknown_status`,
    /// as the mobile app does.
    pub fn form_key(&self) -> &'static str {
        match self {
            Self::MissingPhone => "missing_phone",
            Self::InvalidLogin => "invalid_login",
            Self::Unregistered => "unregistered",
            Self::InvalidPassword => "invalid_password",
            Self::LimitExceeded => "limit_exceeded",
            Self::InvalidFormat => "invalid_format",
            Self::Unauthorized => "unauthorized",
            Self::UnknownStatus { .. }
            | Self::Status { .. }
            | Self::Transport(_)
            | Self::InvalidUrl(_)
            | Self::Deserialization { .. } => "unknown_status",
        }
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::UnknownStatus { status } => *status,
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if re-authentication might resolve this error.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Collapse an untranslated error into `UnknownStatus`, keeping the
    /// typed variants intact. Endpoint modules call this after matching
    /// the statuses they recognize.
    pub(crate) fn into_unknown(self) -> Self {
        match self {
            Self::Status { status, .. } => Self::UnknownStatus {
                status: Some(status),
            },
            Self::Transport(e) => {
                let status = e.status().map(|s| s.as_u16());
                Self::UnknownStatus { status }
            }
            other => other,
        }
    }
}
