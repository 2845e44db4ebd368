//! `gorod relay` -- go2rtc helpers.

use owo_colors::OwoColorize;

use gorod_api::relay::RelayClient;
use gorod_core::CoreError;

use crate::cli::{RelayCheckArgs, RelayCommand};
use crate::commands::Context;
use crate::error::CliError;

pub async fn handle(cmd: &RelayCommand, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        RelayCommand::Check(args) => check(args, ctx).await,
    }
}

async fn check(args: &RelayCheckArgs, ctx: &Context) -> Result<(), CliError> {
    let base_url = args
        .url
        .clone()
        .or_else(|| ctx.entry.relay_base_url.clone())
        .unwrap_or_default();

    let client = RelayClient::new(&base_url).map_err(CoreError::from)?;
    let rtsp_host = client.validate().await.map_err(CoreError::from)?;

    println!(
        "{} relay at {} is usable (RTSP host {})",
        "OK:".green().bold(),
        base_url,
        rtsp_host
    );
    Ok(())
}
