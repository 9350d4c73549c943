use super::config::CurrencyRules;
use super::fields::FieldReader;
use super::{ValidationContext, Verdict};
use crate::model::{CurrencyRecord, WarehouseRecord};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

pub(crate) fn validate(
    fields: &Map<String, Value>,
    _ctx: &ValidationContext<'_>,
    rules: &CurrencyRules,
) -> Verdict {
    let mut reader = FieldReader::new(fields);
    let code = reader.required_code("code");
    let name = reader.required_text("name");
    let usd_rate = reader.optional_decimal("usd_rate");

    if let Some(name) = &name {
        if name.chars().count() > rules.name_max_len {
            reader.reject(format!(
                "field `name` is longer than {} characters",
                rules.name_max_len
            ));
        }
    }
    if let Some(rate) = usd_rate {
        if rate <= Decimal::ZERO {
            reader.reject(format!("field `usd_rate` must be positive, got {}", rate));
        }
    }

    if let Err(reason) = reader.finish() {
        return Verdict::Invalid(reason);
    }
    let (Some(code), Some(name)) = (code, name) else {
        return Verdict::Invalid("currency row is incomplete".to_string());
    };

    let mut notes = Vec::new();
    if let Some(rate) = usd_rate {
        if rate < rules.usd_rate_min || rate > rules.usd_rate_max {
            notes.push(format!(
                "usd_rate {} outside plausibility band [{}, {}]",
                rate, rules.usd_rate_min, rules.usd_rate_max
            ));
        }
    }

    Verdict::from_notes(
        WarehouseRecord::Currency(CurrencyRecord {
            code,
            name,
            usd_rate,
        }),
        notes,
    )
}
