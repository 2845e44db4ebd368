//! `gorod places` -- list the subscriber's places.

use serde::Serialize;
use tabled::Tabled;

use crate::cli::GlobalOpts;
use crate::commands::Context;
use crate::error::CliError;
use crate::output::print_list;

#[derive(Tabled, Serialize)]
struct PlaceRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Address")]
    address: String,
}

pub async fn handle(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let rows: Vec<PlaceRow> = ctx
        .coordinator
        .places()
        .await
        .into_iter()
        .map(|place| PlaceRow {
            id: place.id,
            address: place
                .address
                .and_then(|a| a.visible_address)
                .unwrap_or_else(|| "-".into()),
        })
        .collect();

    print_list(&rows, global.output)
}
