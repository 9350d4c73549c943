use super::config::ForexRules;
use super::fields::FieldReader;
use super::{ValidationContext, Verdict};
use crate::model::{ForexRecord, WarehouseRecord};
use chrono::Duration;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

pub(crate) fn validate(
    fields: &Map<String, Value>,
    ctx: &ValidationContext<'_>,
    rules: &ForexRules,
) -> Verdict {
    let mut reader = FieldReader::new(fields);
    let from = reader.required_code("currency_from");
    let to = reader.required_code("currency_to");
    let date_valid = reader.required_date("date_valid");
    let rate = reader.required_decimal("rate");

    for (field, code) in [("currency_from", &from), ("currency_to", &to)] {
        if let Some(code) = code {
            if !ctx.reference.knows(code) {
                reader.reject(format!(
                    "currency {} in field `{}` is not in the warehouse",
                    code, field
                ));
            }
        }
    }
    if let (Some(from), Some(to)) = (&from, &to) {
        if from == to {
            reader.reject(format!("exchange from {} to itself", from));
        }
    }
    if let Some(rate) = rate {
        if rate <= Decimal::ZERO {
            reader.reject(format!("field `rate` must be positive, got {}", rate));
        }
    }

    if let Err(reason) = reader.finish() {
        return Verdict::Invalid(reason);
    }
    let (Some(currency_from), Some(currency_to), Some(date_valid), Some(rate)) =
        (from, to, date_valid, rate)
    else {
        return Verdict::Invalid("forex row is incomplete".to_string());
    };

    let mut notes = Vec::new();
    if rate < rules.rate_min || rate > rules.rate_max {
        notes.push(format!(
            "rate {} outside plausibility band [{}, {}]",
            rate, rules.rate_min, rules.rate_max
        ));
    }
    // A window past the calendar's end covers every representable date
    let horizon = Duration::try_days(rules.max_future_days)
        .and_then(|window| ctx.as_of.checked_add_signed(window));
    if horizon.is_some_and(|horizon| date_valid > horizon) {
        notes.push(format!(
            "date_valid {} is more than {} days after {}",
            date_valid, rules.max_future_days, ctx.as_of
        ));
    }

    Verdict::from_notes(
        WarehouseRecord::Forex(ForexRecord {
            currency_from,
            currency_to,
            date_valid,
            rate,
        }),
        notes,
    )
}
