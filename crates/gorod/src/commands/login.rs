//! Interactive login wizard.
//!
//! Drives the auth state machine: phone, then password or contract
//! selection + SMS code, then profile resolution, then an optional relay
//! configuration step, and finally the account upsert. A rejected input
//! re-prompts on the same step -- the machine stays where it was.

use dialoguer::{Confirm, Input, Select};
use owo_colors::OwoColorize;
use secrecy::SecretString;

use gorod_api::CloudClient;
use gorod_api::relay::RelayClient;
use gorod_api::user_agent::UserAgent;
use gorod_config::{AccountEntry, UpsertOutcome};
use gorod_core::{AuthFlow, AuthStage, CoreError};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::commands::transport_config;
use crate::error::CliError;

const MAX_ATTEMPTS: usize = 3;

pub async fn handle(args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let client = CloudClient::new(UserAgent::random(), &transport_config(global))
        .map_err(CoreError::from)?;
    let mut flow = AuthFlow::new(&client);

    let phone = match args.phone {
        Some(phone) => phone,
        None => Input::<String>::new()
            .with_prompt("Phone number (7XXXXXXXXXX)")
            .interact_text()?,
    };
    let mut stage = flow.begin(phone.trim()).await?;

    loop {
        stage = match stage {
            AuthStage::PasswordRequired => password_step(&mut flow).await?,
            AuthStage::ContractSelection => contract_step(&mut flow).await?,
            AuthStage::SmsPending => sms_step(&mut flow).await?,
            AuthStage::Authenticated => {
                flow.resolve_account().await?;
                AuthStage::AccountResolved
            }
            AuthStage::AccountResolved => break,
            AuthStage::Start => unreachable!("begin already ran"),
        };
    }

    let Some(account) = flow.into_account() else {
        return Err(CliError::ApiError {
            message: "auth flow ended without an account".into(),
            status: None,
        });
    };
    println!(
        "Authenticated as {} (subscriber {})",
        account.name.bold(),
        account.subscriber_id
    );

    let mut entry = AccountEntry::from_account(&account)?;
    configure_relay(&mut entry).await?;
    store(entry)?;
    Ok(())
}

// ── Steps ───────────────────────────────────────────────────────────

async fn password_step(flow: &mut AuthFlow<'_>) -> Result<AuthStage, CliError> {
    let mut attempts = 0;
    loop {
        let password = SecretString::from(rpassword::prompt_password("Password: ")?);
        match flow.submit_password(&password).await {
            Ok(stage) => return Ok(stage),
            Err(CoreError::AuthenticationFailed { key, .. }) if attempts + 1 < MAX_ATTEMPTS => {
                attempts += 1;
                eprintln!("{}", format!("rejected: {key}, try again").yellow());
            }
            Err(err) => return Err(err.into()),
        }
    }
}

async fn contract_step(flow: &mut AuthFlow<'_>) -> Result<AuthStage, CliError> {
    let items: Vec<String> = flow
        .contracts()
        .iter()
        .map(|contract| {
            format!(
                "{} (account {})",
                contract.address.as_deref().unwrap_or("<no address>"),
                contract.account_id.as_deref().unwrap_or("-"),
            )
        })
        .collect();

    let index = Select::new()
        .with_prompt("Select a contract")
        .items(&items)
        .default(0)
        .interact()?;
    let subscriber_id = flow.contracts()[index].subscriber_id;

    Ok(flow.select_contract(subscriber_id).await?)
}

async fn sms_step(flow: &mut AuthFlow<'_>) -> Result<AuthStage, CliError> {
    let mut attempts = 0;
    loop {
        let code: String = Input::new().with_prompt("SMS code").interact_text()?;
        match flow.submit_code(code.trim()).await {
            Ok(stage) => return Ok(stage),
            Err(CoreError::AuthenticationFailed { key, .. }) if attempts + 1 < MAX_ATTEMPTS => {
                attempts += 1;
                eprintln!("{}", format!("rejected: {key}, try again").yellow());
            }
            Err(err) => return Err(err.into()),
        }
    }
}

// ── Relay configuration ─────────────────────────────────────────────

async fn configure_relay(entry: &mut AccountEntry) -> Result<(), CliError> {
    let wanted = Confirm::new()
        .with_prompt("Configure a go2rtc media relay for camera streams?")
        .default(false)
        .interact()?;
    if !wanted {
        return Ok(());
    }

    let base_url: String = Input::new()
        .with_prompt("go2rtc base URL")
        .default(gorod_config::DEFAULT_RELAY_BASE_URL.to_owned())
        .interact_text()?;

    let client = RelayClient::new(&base_url).map_err(CoreError::from)?;
    let rtsp_host = client.validate().await.map_err(CoreError::from)?;
    println!("Relay OK, RTSP host: {rtsp_host}");

    entry.use_relay = Some(true);
    entry.relay_base_url = Some(base_url.trim().trim_end_matches('/').to_owned());
    entry.relay_rtsp_host = Some(rtsp_host);
    Ok(())
}

// ── Persistence ─────────────────────────────────────────────────────

fn store(entry: AccountEntry) -> Result<(), CliError> {
    let name = entry.name.clone();
    let access_token = entry.access_token.clone();
    let refresh_token = entry.refresh_token.clone();

    let mut settings = gorod_config::load_settings_or_default();
    let outcome = gorod_config::upsert_account(&mut settings, entry);

    match outcome {
        UpsertOutcome::AlreadyConfigured => {
            println!("{}", "This session is already stored; nothing to do.".dimmed());
            return Ok(());
        }
        UpsertOutcome::Reauthed => {
            println!("Existing account '{name}' re-authenticated.");
        }
        UpsertOutcome::Created => {
            println!("Account '{name}' stored.");
        }
    }

    gorod_config::save_settings(&settings)?;
    gorod_config::store_tokens(&name, &access_token, refresh_token.as_deref());
    Ok(())
}
