//! Command handlers, one module per command group.

pub mod balance;
pub mod cameras;
pub mod config_cmd;
pub mod locks;
pub mod login;
pub mod places;
pub mod relay;

use std::sync::Arc;
use std::time::Duration;

use gorod_api::transport::TransportConfig;
use gorod_config::AccountEntry;
use gorod_core::Coordinator;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Everything a data command needs: an authenticated coordinator with the
/// places list already loaded, plus the stored account it came from.
pub struct Context {
    pub coordinator: Arc<Coordinator>,
    pub entry: AccountEntry,
    pub account_name: String,
}

pub fn transport_config(global: &GlobalOpts) -> TransportConfig {
    TransportConfig {
        timeout: Duration::from_secs(global.timeout),
    }
}

/// Build the coordinator for the selected stored account. The places list
/// is fetched once here; commands aggregate over that cache.
pub async fn connect(global: &GlobalOpts) -> Result<Context, CliError> {
    let settings = gorod_config::load_settings()?;
    let (name, entry) = gorod_config::select_account(&settings, global.account.as_deref())?;

    let client = gorod_config::entry_to_client(entry, name, &transport_config(global))?;
    let coordinator = Coordinator::new(client);
    coordinator.refresh().await.map_err(|err| {
        if err.is_auth_expired() {
            CliError::SessionExpired {
                account: name.to_owned(),
            }
        } else {
            err.into()
        }
    })?;

    Ok(Context {
        coordinator: Arc::new(coordinator),
        entry: entry.clone(),
        account_name: name.to_owned(),
    })
}

/// Route a data command to its handler.
pub async fn dispatch(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Places => places::handle(ctx, global).await,
        Command::Cameras(args) => cameras::handle(args.command, ctx, global).await,
        Command::Locks(args) => locks::handle(args.command, ctx, global).await,
        Command::Balance => balance::handle(ctx, global).await,
        Command::Relay(args) => relay::handle(&args.command, ctx).await,

        // Handled before `connect` in main.rs
        Command::Login(_) | Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
