//! `gorod balance` -- per-place account balance.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use gorod_core::BalanceSensor;

use crate::cli::GlobalOpts;
use crate::commands::Context;
use crate::error::CliError;
use crate::output::{cell, print_list};

#[derive(Tabled, Serialize)]
struct BalanceRow {
    #[tabled(rename = "Place")]
    place_id: i64,
    #[tabled(rename = "Balance")]
    balance: String,
    #[tabled(rename = "Next payment")]
    payment: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Blocked")]
    blocked: String,
    #[tabled(rename = "Payment link")]
    link: String,
}

pub async fn handle(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    let balances = ctx.coordinator.get_balances_info().await?;

    let rows: Vec<BalanceRow> = balances
        .into_iter()
        .map(|balance| {
            let place_id = balance.place_id;
            let sensor = BalanceSensor::new(Arc::clone(&ctx.coordinator), balance);
            let attrs = sensor.extra_attributes();
            BalanceRow {
                place_id,
                balance: match (sensor.native_value(), sensor.unit()) {
                    (Some(value), Some(unit)) => format!("{value:.2} {unit}"),
                    _ => "-".into(),
                },
                payment: attrs
                    .amount_sum
                    .map_or_else(|| "-".into(), |sum| format!("{sum:.2}")),
                due: cell(&attrs.target_date),
                blocked: cell(&attrs.blocked),
                link: cell(&attrs.payment_link),
            }
        })
        .collect();

    print_list(&rows, global.output)
}
