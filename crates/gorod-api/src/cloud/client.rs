// Cloud API client.
//
// Wraps `CloudTransport` with envelope unwrapping and the one piece of
// client-local state the auth flow needs: the phone number, cached by
// `query_contracts` and reused by the later auth steps. Endpoint modules
// (auth, places, cameras, finance) are implemented as inherent methods
// via separate files to keep this module focused on request mechanics.

use std::sync::RwLock;

use secrecy::SecretString;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::Error;
use crate::transport::{CloudTransport, TransportConfig};
use crate::user_agent::UserAgent;

use super::models::Envelope;

/// Client for the Elektronny Gorod cloud API.
pub struct CloudClient {
    transport: CloudTransport,
    /// Phone the auth flow is running for. Set by `query_contracts`,
    /// required by the password/SMS steps.
    phone: RwLock<Option<String>>,
}

impl CloudClient {
    /// Create a client against the production host with a fresh transport.
    pub fn new(user_agent: UserAgent, config: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            transport: CloudTransport::new(user_agent, config)?,
            phone: RwLock::new(None),
        })
    }

    /// Create a client against an arbitrary base URL (tests, staging).
    pub fn with_base_url(
        base_url: Url,
        user_agent: UserAgent,
        config: &TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            transport: CloudTransport::with_base_url(base_url, user_agent, config)?,
            phone: RwLock::new(None),
        })
    }

    /// Create a client for a stored account: token and operator already
    /// known, no auth flow required.
    pub fn for_session(
        user_agent: UserAgent,
        access_token: SecretString,
        operator: Option<String>,
        config: &TransportConfig,
    ) -> Result<Self, Error> {
        let client = Self::new(user_agent, config)?;
        client.transport.restore_session(access_token, operator);
        Ok(client)
    }

    /// The underlying transport (session stamping, identity snapshot).
    pub fn transport(&self) -> &CloudTransport {
        &self.transport
    }

    // ── Phone cache ─────────────────────────────────────────────────

    pub(crate) fn set_phone(&self, phone: &str) {
        *self.phone.write().expect("phone lock poisoned") = Some(phone.to_owned());
    }

    /// The phone the auth flow was started for, or `MissingPhone`.
    pub(crate) fn ensure_phone(&self) -> Result<String, Error> {
        self.phone
            .read()
            .expect("phone lock poisoned")
            .clone()
            .ok_or(Error::MissingPhone)
    }

    // ── Body parsing ────────────────────────────────────────────────

    /// Parse a bare JSON body.
    pub(crate) async fn parse_json<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let body = resp.text().await.map_err(Error::Transport)?;
        serde_json::from_str(&body).map_err(|e| {
            let preview = &body[..body.len().min(200)];
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    /// Parse a `{"data": ...}` envelope and return the payload.
    pub(crate) async fn parse_envelope<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let envelope: Envelope<T> = Self::parse_json(resp).await?;
        Ok(envelope.data)
    }

    /// Parse an envelope whose payload may be null, empty, or missing --
    /// some operators answer billing queries with an empty body.
    pub(crate) async fn parse_optional_envelope<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<Option<T>, Error> {
        let body = resp.text().await.map_err(Error::Transport)?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        let envelope: Envelope<Option<T>> = serde_json::from_str(&body).map_err(|e| {
            let preview = &body[..body.len().min(200)];
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;
        Ok(envelope.data)
    }
}
