//! `gorod cameras` -- listing, snapshots, stream URLs.

use std::sync::Arc;

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::Tabled;

use gorod_core::{CameraEntity, RelaySettings};

use crate::cli::{CamerasCommand, GlobalOpts, OutputFormat, SnapshotArgs, StreamArgs};
use crate::commands::Context;
use crate::error::CliError;
use crate::output::{print_json, print_list};

#[derive(Tabled, Serialize)]
struct CameraRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
}

pub async fn handle(
    cmd: CamerasCommand,
    ctx: &Context,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        CamerasCommand::List => list(ctx, global).await,
        CamerasCommand::Snapshot(args) => snapshot(&args, ctx).await,
        CamerasCommand::Stream(args) => stream(&args, ctx, global).await,
    }
}

async fn list(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let rows: Vec<CameraRow> = ctx
        .coordinator
        .get_cameras_info()
        .await?
        .into_iter()
        .map(|camera| CameraRow {
            id: camera.id,
            name: camera.name,
        })
        .collect();

    print_list(&rows, global.output)
}

async fn snapshot(args: &SnapshotArgs, ctx: &Context) -> Result<(), CliError> {
    let bytes = ctx
        .coordinator
        .get_camera_snapshot(args.id, args.width, args.height)
        .await?;

    let file = args
        .file
        .clone()
        .unwrap_or_else(|| format!("camera_{}.jpg", args.id));
    std::fs::write(&file, &bytes)?;
    println!("Wrote {} ({} bytes)", file.bold(), bytes.len());
    Ok(())
}

async fn stream(args: &StreamArgs, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    // Validates the id against a fresh aggregation pass.
    let camera = ctx.coordinator.update_camera_state(args.id).await?;

    let relay = (args.relay || ctx.entry.use_relay())
        .then(|| {
            ctx.entry.relay_base_url.clone().map(|base_url| RelaySettings {
                base_url,
                rtsp_host: ctx.entry.relay_rtsp_host.clone(),
            })
        })
        .flatten();

    let mut entity = CameraEntity::new(Arc::clone(&ctx.coordinator), &camera, relay);
    let source = entity.stream_source().await?;

    match source {
        Some(url) => match global.output {
            OutputFormat::Table => println!("{url}"),
            OutputFormat::Json => print_json(&serde_json::json!({
                "id": camera.id,
                "name": camera.name,
                "url": url,
                "relay": entity.uses_relay(),
            }))?,
        },
        None => {
            return Err(CliError::NotFound {
                resource_type: "stream for camera".into(),
                identifier: args.id.to_string(),
                list_command: "cameras list".into(),
            });
        }
    }
    Ok(())
}
