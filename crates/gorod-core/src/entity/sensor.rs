// Balance sensor.
//
// Read-only numeric surface over one place's finance snapshot. A failed
// refresh clears the value -- an unknown balance must not keep showing the
// stale number.

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;
use tracing::warn;

use crate::coordinator::Coordinator;
use crate::model::Balance;

/// Currency the backend bills in.
const CURRENCY: &str = "₽";

/// Formatted companion attributes shown next to the balance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceAttributes {
    pub amount_sum: Option<f64>,
    pub target_date: Option<String>,
    pub payment_link: Option<String>,
    pub blocked: Option<bool>,
}

pub struct BalanceSensor {
    coordinator: Arc<Coordinator>,
    info: Balance,
    value: Option<f64>,
}

impl BalanceSensor {
    pub fn new(coordinator: Arc<Coordinator>, info: Balance) -> Self {
        let value = info.balance;
        Self {
            coordinator,
            info,
            value,
        }
    }

    pub fn unique_id(&self) -> String {
        format!("gorod_{}_balance", self.info.place_id)
    }

    pub fn name(&self) -> &'static str {
        "Account balance"
    }

    /// Balance rounded to cents, `None` while unknown.
    pub fn native_value(&self) -> Option<f64> {
        self.value.map(round2)
    }

    /// Unit of the value; absent while the balance is unknown.
    pub fn unit(&self) -> Option<&'static str> {
        self.value.is_some().then_some(CURRENCY)
    }

    pub fn extra_attributes(&self) -> BalanceAttributes {
        BalanceAttributes {
            amount_sum: self.info.payment_sum.map(round2),
            target_date: self
                .info
                .payment_date
                .as_deref()
                .map(format_payment_date),
            payment_link: self.info.payment_link.clone(),
            blocked: self.info.blocked,
        }
    }

    /// Re-fetch the balance. Failures clear the value.
    pub async fn update(&mut self) {
        match self
            .coordinator
            .update_balance_state(self.info.place_id)
            .await
        {
            Ok(info) => {
                self.value = info.balance;
                self.info = info;
            }
            Err(err) => {
                warn!(place_id = self.info.place_id, error = %err, "balance refresh failed");
                self.value = None;
            }
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Render an ISO payment date as `DD.MM.YYYY, HH:MM:SS`. Dates the parser
/// does not recognize pass through unchanged.
fn format_payment_date(raw: &str) -> String {
    const OUT: &str = "%d.%m.%Y, %H:%M:%S";

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(OUT).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(OUT).to_string();
    }
    raw.to_owned()
}

#[cfg(test)]
mod tests {
    use super::{format_payment_date, round2};

    #[test]
    fn rounding_is_to_cents() {
        assert!((round2(450.456) - 450.46).abs() < f64::EPSILON);
        assert!((round2(100.0) - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn payment_dates_are_reformatted() {
        assert_eq!(
            format_payment_date("2024-02-01T10:30:00+07:00"),
            "01.02.2024, 10:30:00"
        );
        assert_eq!(
            format_payment_date("2024-02-01T10:30:00"),
            "01.02.2024, 10:30:00"
        );
    }

    #[test]
    fn unparseable_dates_pass_through() {
        assert_eq!(format_payment_date("tomorrow"), "tomorrow");
    }
}
