// ── Authentication state machine ──
//
// Explicit rendition of the login wizard: an enum of states and one method
// per input, with every transition spelled out. A method called in a state
// that does not accept it returns `InvalidTransition`; an API failure
// leaves the machine where it was so the caller can re-prompt and retry
// the same step.
//
//   Start ──begin──> PasswordRequired ──submit_password──┐
//     │                                                  ├─> Authenticated
//     └─begin──> ContractSelection ──select_contract──> SmsPending
//                                        submit_code ────┘
//   Authenticated ──resolve_account──> AccountResolved

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use gorod_api::CloudClient;
use gorod_api::cloud::models::{AuthTokens, Contract, ContractsOutcome};
use gorod_api::hash::{AuthTimestamp, hash_password, hash_password_timestamp};
use gorod_api::user_agent::UserAgent;

use crate::error::CoreError;

/// Observable stage of the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum AuthStage {
    Start,
    PasswordRequired,
    ContractSelection,
    SmsPending,
    Authenticated,
    AccountResolved,
}

/// Everything a consumer needs to persist a freshly authenticated account.
#[derive(Debug, Clone)]
pub struct AccountInfo {
    /// Display name: the subscriber's name, falling back to the phone.
    pub name: String,
    pub account_id: Option<String>,
    pub subscriber_id: i64,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub operator_id: i64,
    /// Device identity stamped with the operator and account ids.
    pub user_agent: UserAgent,
}

enum AuthState {
    Start,
    PasswordRequired {
        phone: String,
    },
    ContractSelection {
        phone: String,
        contracts: Vec<Contract>,
    },
    SmsPending {
        phone: String,
        contract: Contract,
    },
    Authenticated {
        phone: String,
        tokens: AuthTokens,
    },
    AccountResolved {
        account: AccountInfo,
    },
}

/// The login wizard. Borrows the client; on success the client's transport
/// carries the session, ready for a [`crate::Coordinator`].
pub struct AuthFlow<'a> {
    client: &'a CloudClient,
    state: AuthState,
}

impl<'a> AuthFlow<'a> {
    pub fn new(client: &'a CloudClient) -> Self {
        Self {
            client,
            state: AuthState::Start,
        }
    }

    /// The current stage.
    pub fn stage(&self) -> AuthStage {
        match &self.state {
            AuthState::Start => AuthStage::Start,
            AuthState::PasswordRequired { .. } => AuthStage::PasswordRequired,
            AuthState::ContractSelection { .. } => AuthStage::ContractSelection,
            AuthState::SmsPending { .. } => AuthStage::SmsPending,
            AuthState::Authenticated { .. } => AuthStage::Authenticated,
            AuthState::AccountResolved { .. } => AuthStage::AccountResolved,
        }
    }

    /// Contracts to choose from; empty outside `ContractSelection`.
    pub fn contracts(&self) -> &[Contract] {
        match &self.state {
            AuthState::ContractSelection { contracts, .. } => contracts,
            _ => &[],
        }
    }

    /// The resolved account; `None` before `resolve_account` succeeds.
    pub fn account(&self) -> Option<&AccountInfo> {
        match &self.state {
            AuthState::AccountResolved { account } => Some(account),
            _ => None,
        }
    }

    /// Consume the flow, yielding the resolved account if it got that far.
    pub fn into_account(self) -> Option<AccountInfo> {
        match self.state {
            AuthState::AccountResolved { account } => Some(account),
            _ => None,
        }
    }

    fn invalid(&self, action: &'static str) -> CoreError {
        CoreError::InvalidTransition {
            stage: self.stage().into(),
            action,
        }
    }

    // ── Inputs ───────────────────────────────────────────────────────

    /// Feed the phone number. Routes to password entry or contract
    /// selection depending on how the account authenticates.
    pub async fn begin(&mut self, phone: &str) -> Result<AuthStage, CoreError> {
        if !matches!(self.state, AuthState::Start) {
            return Err(self.invalid("begin"));
        }

        debug!("starting auth flow");
        let outcome = self.client.query_contracts(phone).await?;
        self.state = match outcome {
            ContractsOutcome::PasswordRequired => AuthState::PasswordRequired {
                phone: phone.to_owned(),
            },
            ContractsOutcome::Contracts(contracts) => AuthState::ContractSelection {
                phone: phone.to_owned(),
                contracts,
            },
        };
        Ok(self.stage())
    }

    /// Feed the password. Computes the timestamp and both digests, never
    /// sending the raw password over the wire.
    pub async fn submit_password(&mut self, password: &SecretString) -> Result<AuthStage, CoreError> {
        let AuthState::PasswordRequired { phone } = &self.state else {
            return Err(self.invalid("submit_password"));
        };
        let phone = phone.clone();

        let timestamp = AuthTimestamp::now();
        let hash1 = hash_password(password.expose_secret());
        let hash2 = hash_password_timestamp(&phone, password.expose_secret(), &timestamp.simple());

        let tokens = self
            .client
            .verify_password(&timestamp, &hash1, &hash2)
            .await?;
        self.install_session(&tokens);
        info!("password authentication successful");

        self.state = AuthState::Authenticated { phone, tokens };
        Ok(self.stage())
    }

    /// Pick a contract by subscriber id and request the SMS code for it.
    pub async fn select_contract(&mut self, subscriber_id: i64) -> Result<AuthStage, CoreError> {
        let AuthState::ContractSelection { phone, contracts } = &self.state else {
            return Err(self.invalid("select_contract"));
        };
        let phone = phone.clone();
        let contract = contracts
            .iter()
            .find(|contract| contract.subscriber_id == subscriber_id)
            .cloned()
            .ok_or(CoreError::ContractNotFound { subscriber_id })?;

        self.client.request_sms_code(&contract).await?;
        info!(subscriber_id, "SMS code requested");

        self.state = AuthState::SmsPending { phone, contract };
        Ok(self.stage())
    }

    /// Feed the SMS code.
    pub async fn submit_code(&mut self, code: &str) -> Result<AuthStage, CoreError> {
        let AuthState::SmsPending { phone, contract } = &self.state else {
            return Err(self.invalid("submit_code"));
        };
        let phone = phone.clone();
        let contract = contract.clone();

        let tokens = self.client.verify_sms_code(&contract, code).await?;
        self.install_session(&tokens);
        info!("SMS authentication successful");

        self.state = AuthState::Authenticated { phone, tokens };
        Ok(self.stage())
    }

    /// Fetch the profile for the fresh session and assemble the account
    /// payload. Stamps the account id into the device identity.
    pub async fn resolve_account(&mut self) -> Result<&AccountInfo, CoreError> {
        let AuthState::Authenticated { phone, tokens } = &self.state else {
            return Err(self.invalid("resolve_account"));
        };
        let phone = phone.clone();
        let tokens = tokens.clone();

        let profile = self.client.query_profile().await?;
        if let Some(account_id) = profile.subscriber.account_id.as_deref() {
            self.client.transport().set_account(account_id);
        }

        let account = AccountInfo {
            name: profile.subscriber.name.unwrap_or(phone),
            account_id: profile.subscriber.account_id,
            subscriber_id: profile.subscriber.id,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            operator_id: tokens.operator_id,
            user_agent: self.client.transport().user_agent_snapshot(),
        };
        info!(subscriber_id = account.subscriber_id, "account resolved");

        self.state = AuthState::AccountResolved { account };
        match &self.state {
            AuthState::AccountResolved { account } => Ok(account),
            _ => unreachable!("state was just set"),
        }
    }

    fn install_session(&self, tokens: &AuthTokens) {
        self.client.transport().set_session(
            SecretString::from(tokens.access_token.clone()),
            tokens.operator_id,
        );
    }
}
