//! `gorod config` -- inspect the account store.

use serde::Serialize;
use tabled::Tabled;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{cell, print_list, yes_no};

#[derive(Tabled, Serialize)]
struct AccountRow {
    #[tabled(rename = "Account")]
    name: String,
    #[tabled(rename = "Subscriber")]
    subscriber_id: i64,
    #[tabled(rename = "Operator")]
    operator_id: i64,
    #[tabled(rename = "Account ID")]
    account_id: String,
    #[tabled(rename = "Relay")]
    relay: String,
    #[tabled(rename = "Default")]
    default: String,
}

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            println!("{}", gorod_config::config_path().display());
            Ok(())
        }
        ConfigCommand::Show => show(global),
    }
}

fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let settings = gorod_config::load_settings()?;

    let mut rows: Vec<AccountRow> = settings
        .accounts
        .iter()
        .map(|(key, entry)| AccountRow {
            name: key.clone(),
            subscriber_id: entry.subscriber_id,
            operator_id: entry.operator_id,
            account_id: cell(&entry.account_id),
            relay: yes_no(entry.use_relay()),
            default: yes_no(settings.default_account.as_deref() == Some(key)),
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));

    print_list(&rows, global.output)
}
