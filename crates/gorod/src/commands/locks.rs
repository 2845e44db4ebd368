//! `gorod locks` -- listing and opening doors.

use std::sync::Arc;

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::Tabled;

use gorod_core::{LockEntity, LockState};

use crate::cli::{GlobalOpts, LocksCommand, OpenArgs};
use crate::commands::Context;
use crate::error::CliError;
use crate::output::{cell, print_list, yes_no};

#[derive(Tabled, Serialize)]
struct LockRow {
    #[tabled(rename = "Place")]
    place_id: i64,
    #[tabled(rename = "Access control")]
    access_control_id: i64,
    #[tabled(rename = "Entrance")]
    entrance: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Openable")]
    openable: String,
}

pub async fn handle(cmd: LocksCommand, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        LocksCommand::List => list(ctx, global).await,
        LocksCommand::Open(args) => open(&args, ctx).await,
    }
}

async fn list(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let rows: Vec<LockRow> = ctx
        .coordinator
        .get_locks_info()
        .await?
        .into_iter()
        .map(|lock| LockRow {
            place_id: lock.place_id,
            access_control_id: lock.access_control_id,
            entrance: cell(&lock.entrance_id),
            name: lock.name,
            openable: yes_no(lock.openable),
        })
        .collect();

    print_list(&rows, global.output)
}

async fn open(args: &OpenArgs, ctx: &Context) -> Result<(), CliError> {
    // Fetch the current backend state first -- this validates the ids and
    // yields the display name.
    let info = ctx
        .coordinator
        .update_lock_state(args.place, args.access_control, args.entrance)
        .await?;

    let mut lock = LockEntity::new(Arc::clone(&ctx.coordinator), info);
    println!("Unlocking {}...", lock.name().bold());

    match lock.unlock().await {
        LockState::Unlocked => {
            println!("{}", "Door is open.".green());
            Ok(())
        }
        LockState::Jammed => Err(CliError::Jammed {
            lock: lock.unique_id(),
        }),
        state => Err(CliError::ApiError {
            message: format!("unexpected lock state: {state}"),
            status: None,
        }),
    }
}
