// Cloud HTTP transport.
//
// One pooled `reqwest::Client` per transport, shared by every endpoint.
// Injects the bearer token, the rendered user-agent, and the `operator`
// header on each request; the place id for place-scoped endpoints is an
// explicit per-request parameter, never shared mutable state.

use std::sync::RwLock;
use std::time::Duration;

use bytes::Bytes;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::user_agent::UserAgent;

/// Production cloud host.
pub const BASE_API_URL: &str = "https://myhome.proptech.ru";

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(Error::Transport)
    }
}

/// HTTP transport for the Elektronny Gorod cloud.
///
/// Holds the session material (bearer token, operator id) behind locks so
/// the auth flow can stamp them in once they are known; requests issued
/// afterwards pick them up automatically.
pub struct CloudTransport {
    http: reqwest::Client,
    base_url: Url,
    user_agent: RwLock<UserAgent>,
    access_token: RwLock<Option<SecretString>>,
    operator: RwLock<Option<String>>,
}

impl CloudTransport {
    /// Create a transport against the production host.
    pub fn new(user_agent: UserAgent, config: &TransportConfig) -> Result<Self, Error> {
        let base_url = Url::parse(BASE_API_URL)?;
        Self::with_base_url(base_url, user_agent, config)
    }

    /// Create a transport against an arbitrary base URL (tests, staging).
    pub fn with_base_url(
        base_url: Url,
        user_agent: UserAgent,
        config: &TransportConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            http: config.build_client()?,
            base_url,
            user_agent: RwLock::new(user_agent),
            access_token: RwLock::new(None),
            operator: RwLock::new(None),
        })
    }

    /// The cloud base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Session material ─────────────────────────────────────────────

    /// Install the session obtained from a successful authentication.
    ///
    /// Stamps the operator id into the user-agent as well -- the backend
    /// expects both the header and the identity string to carry it.
    pub fn set_session(&self, access_token: SecretString, operator_id: i64) {
        *self.access_token.write().expect("token lock poisoned") = Some(access_token);
        *self.operator.write().expect("operator lock poisoned") = Some(operator_id.to_string());
        self.user_agent
            .write()
            .expect("user-agent lock poisoned")
            .set_operator(operator_id);
    }

    /// Install a previously stored session (operator already known).
    pub fn restore_session(&self, access_token: SecretString, operator: Option<String>) {
        *self.access_token.write().expect("token lock poisoned") = Some(access_token);
        *self.operator.write().expect("operator lock poisoned") = operator;
    }

    /// Stamp the account id learned from the subscriber profile.
    pub fn set_account(&self, account_id: &str) {
        self.user_agent
            .write()
            .expect("user-agent lock poisoned")
            .set_account(account_id);
    }

    /// Copy of the current device identity, for persistence.
    pub fn user_agent_snapshot(&self) -> UserAgent {
        self.user_agent
            .read()
            .expect("user-agent lock poisoned")
            .clone()
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL for an API path (absolute, may carry a query).
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request. Statuses below 400 are handed to the endpoint
    /// layer untouched (the auth endpoint distinguishes 200/204/300);
    /// 400 and above become [`Error::Status`] for per-endpoint translation.
    pub(crate) async fn get(&self, path: &str, place: Option<i64>) -> Result<reqwest::Response, Error> {
        self.request(Method::GET, path, place, None).await
    }

    /// Send a GET request and return the raw body bytes (camera snapshots).
    pub(crate) async fn get_bytes(&self, path: &str, place: Option<i64>) -> Result<Bytes, Error> {
        let resp = self.request(Method::GET, path, place, None).await?;
        resp.bytes().await.map_err(Error::Transport)
    }

    /// Send a POST request with a JSON body.
    pub(crate) async fn post<B: Serialize + Sync>(
        &self,
        path: &str,
        place: Option<i64>,
        body: &B,
    ) -> Result<reqwest::Response, Error> {
        let payload = serde_json::to_string(body).map_err(|e| Error::Deserialization {
            message: format!("failed to encode request body: {e}"),
            body: String::new(),
        })?;
        self.request(Method::POST, path, place, Some(payload)).await
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        place: Option<i64>,
        body: Option<String>,
    ) -> Result<reqwest::Response, Error> {
        let url = self.api_url(path)?;
        debug!("{} {}", method, url);

        // Assemble header values before touching the wire so no lock guard
        // lives across an await point.
        let agent_header = self
            .user_agent
            .read()
            .expect("user-agent lock poisoned")
            .header_value(place);
        let bearer = self
            .access_token
            .read()
            .expect("token lock poisoned")
            .as_ref()
            .map(|token| format!("Bearer {}", token.expose_secret()));
        let operator = self
            .operator
            .read()
            .expect("operator lock poisoned")
            .clone();

        let mut builder = self
            .http
            .request(method.clone(), url)
            .header(reqwest::header::USER_AGENT, agent_header);
        if let Some(bearer) = bearer {
            builder = builder.header(reqwest::header::AUTHORIZATION, bearer);
        }
        if let Some(operator) = operator {
            builder = builder.header("operator", operator);
        }
        if let Some(payload) = body {
            builder = builder
                .header(
                    reqwest::header::CONTENT_TYPE,
                    "application/json; charset=UTF-8",
                )
                .body(payload);
        }

        let resp = builder.send().await.map_err(Error::Transport)?;
        let status = resp.status();
        trace!("{} -> {}", method, status);

        if status.as_u16() < 400 {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(Error::Status {
            status: status.as_u16(),
            body: body[..body.len().min(200)].to_owned(),
        })
    }
}
