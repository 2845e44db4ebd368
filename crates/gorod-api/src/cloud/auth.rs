// Authentication endpoints.
//
// The contract lookup opens every flow and decides between password and
// SMS authentication; both terminal steps return the same token triple.
// Status codes are interpreted per endpoint -- 200 and 300 carry
// different meanings here than on the data endpoints.

use serde_json::json;
use tracing::debug;

use crate::error::Error;
use crate::hash::AuthTimestamp;

use super::client::CloudClient;
use super::models::{AuthTokens, Contract, ContractsOutcome, Profile};

impl CloudClient {
    /// Look up the contracts attached to a phone number.
    ///
    /// `GET /auth/v2/login/{phone}`
    /// - 300 + contract list body: SMS flow, pick a contract
    /// - 200: password flow
    /// - 204: phone not registered
    /// - 400: invalid login
    ///
    /// Caches the phone for the follow-up auth calls.
    pub async fn query_contracts(&self, phone: &str) -> Result<ContractsOutcome, Error> {
        self.set_phone(phone);
        debug!("querying contracts");

        let resp = match self.transport().get(&format!("/auth/v2/login/{phone}"), None).await {
            Ok(resp) => resp,
            Err(Error::Status { status: 400, .. }) => return Err(Error::InvalidLogin),
            Err(err) => return Err(err.into_unknown()),
        };

        match resp.status().as_u16() {
            300 => {
                let contracts: Vec<Contract> = Self::parse_json(resp).await?;
                Ok(ContractsOutcome::Contracts(contracts))
            }
            200 => Ok(ContractsOutcome::PasswordRequired),
            204 => Err(Error::Unregistered),
            status => Err(Error::UnknownStatus {
                status: Some(status),
            }),
        }
    }

    /// Authenticate with the password digests.
    ///
    /// `POST /auth/v2/auth/{phone}/password` with the ISO timestamp and
    /// the two digests computed against it (see [`crate::hash`]).
    pub async fn verify_password(
        &self,
        timestamp: &AuthTimestamp,
        hash1: &str,
        hash2: &str,
    ) -> Result<AuthTokens, Error> {
        let phone = self.ensure_phone()?;
        debug!("verifying password");

        let payload = json!({
            "login": phone,
            "timestamp": timestamp.isoformat(),
            "hash1": hash1,
            "hash2": hash2,
        });

        let resp = match self
            .transport()
            .post(&format!("/auth/v2/auth/{phone}/password"), None, &payload)
            .await
        {
            Ok(resp) => resp,
            Err(Error::Status { status: 400, .. }) => return Err(Error::InvalidPassword),
            Err(err) => return Err(err.into_unknown()),
        };

        Self::parse_json(resp).await
    }

    /// Request an SMS code for the selected contract.
    ///
    /// `POST /auth/v2/confirmation/{phone}`; 429 means the backend is
    /// throttling code requests for this number.
    pub async fn request_sms_code(&self, contract: &Contract) -> Result<(), Error> {
        let phone = self.ensure_phone()?;
        debug!(subscriber = contract.subscriber_id, "requesting SMS code");

        let payload = json!({
            "accountId": contract.account_id,
            "address": contract.address,
            "operatorId": contract.operator_id,
            "subscriberId": contract.subscriber_id.to_string(),
            "placeId": contract.place_id,
        });

        match self
            .transport()
            .post(&format!("/auth/v2/confirmation/{phone}"), None, &payload)
            .await
        {
            Ok(_) => Ok(()),
            Err(Error::Status { status: 429, .. }) => Err(Error::LimitExceeded),
            Err(err) => Err(err.into_unknown()),
        }
    }

    /// Verify the SMS code and obtain the token triple.
    ///
    /// `POST /auth/v3/auth/{phone}/confirmation`; 406 means the code was
    /// rejected. The code goes out under both confirm keys -- that is what
    /// the mobile app sends.
    pub async fn verify_sms_code(
        &self,
        contract: &Contract,
        code: &str,
    ) -> Result<AuthTokens, Error> {
        let phone = self.ensure_phone()?;
        debug!(subscriber = contract.subscriber_id, "verifying SMS code");

        let payload = json!({
            "accountId": contract.account_id,
            "confirm1": code,
            "confirm2": code,
            "login": phone,
            "operatorId": contract.operator_id,
            "subscriberId": contract.subscriber_id.to_string(),
        });

        let resp = match self
            .transport()
            .post(&format!("/auth/v3/auth/{phone}/confirmation"), None, &payload)
            .await
        {
            Ok(resp) => resp,
            Err(Error::Status { status: 406, .. }) => return Err(Error::InvalidFormat),
            Err(err) => return Err(err.into_unknown()),
        };

        Self::parse_json(resp).await
    }

    /// Fetch the subscriber profile for the current session.
    ///
    /// `GET /rest/v1/subscribers/profiles`; 401 means the token is
    /// missing or stale.
    pub async fn query_profile(&self) -> Result<Profile, Error> {
        debug!("querying subscriber profile");

        let resp = match self.transport().get("/rest/v1/subscribers/profiles", None).await {
            Ok(resp) => resp,
            Err(Error::Status { status: 401, .. }) => return Err(Error::Unauthorized),
            Err(err) => return Err(err.into_unknown()),
        };

        Self::parse_envelope(resp).await
    }
}
