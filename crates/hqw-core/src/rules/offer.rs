use super::config::OfferRules;
use super::fields::FieldReader;
use super::{ValidationContext, Verdict};
use crate::model::{OfferLifecycle, OfferRecord, WarehouseRecord};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

/// Scale of the warehouse price columns
const PRICE_SCALE: u32 = 10;

pub(crate) fn validate(
    fields: &Map<String, Value>,
    ctx: &ValidationContext<'_>,
    rules: &OfferRules,
) -> Verdict {
    let mut reader = FieldReader::new(fields);
    let hotel_id = reader.required_positive_u32("hotel_id");
    let original_price = reader.required_decimal("original_price");
    let original_currency = reader.required_code("original_currency");
    let price_usd = reader.optional_decimal("price_usd");
    let breakfast_included = reader.required_bool("breakfast_included");
    let valid_from = reader.required_datetime("valid_from");
    let valid_to = reader.required_datetime("valid_to");
    let checkin_date = reader.required_date("checkin_date");
    let checkout_date = reader.required_date("checkout_date");

    for (field, amount) in [("original_price", original_price), ("price_usd", price_usd)] {
        if let Some(amount) = amount {
            if amount < Decimal::ZERO {
                reader.reject(format!("field `{}` must not be negative, got {}", field, amount));
            }
        }
    }
    if let Some(code) = &original_currency {
        if !ctx.reference.knows(code) {
            reader.reject(format!(
                "currency {} in field `original_currency` is not in the warehouse",
                code
            ));
        }
    }
    if let (Some(from), Some(to)) = (valid_from, valid_to) {
        if to < from {
            reader.reject(format!("offer validity ends ({}) before it starts ({})", to, from));
        }
    }
    if let (Some(checkin), Some(checkout)) = (checkin_date, checkout_date) {
        if checkout <= checkin {
            reader.reject(format!(
                "checkout_date {} is not after checkin_date {}",
                checkout, checkin
            ));
        }
    }

    // Without an explicit USD price, convert through the forex table.
    let price_usd = match (price_usd, original_price, &original_currency, valid_from) {
        (Some(price), ..) => Some(price),
        (None, Some(price), Some(code), Some(from)) => {
            match ctx.reference.usd_rate_on_or_before(code, from.date()) {
                Some(rate) => match price.checked_mul(rate) {
                    Some(converted) => Some(converted.round_dp(PRICE_SCALE)),
                    None => {
                        reader.reject(format!("original_price {} overflows in USD", price));
                        None
                    }
                },
                None => {
                    reader.reject(format!(
                        "no forex rate from {} to USD on or before {}",
                        code,
                        from.date()
                    ));
                    None
                }
            }
        }
        _ => None,
    };

    if let Err(reason) = reader.finish() {
        return Verdict::Invalid(reason);
    }
    let (
        Some(hotel_id),
        Some(price_usd),
        Some(original_price),
        Some(original_currency),
        Some(breakfast_included),
        Some(valid_from),
        Some(valid_to),
        Some(checkin_date),
        Some(checkout_date),
    ) = (
        hotel_id,
        price_usd,
        original_price,
        original_currency,
        breakfast_included,
        valid_from,
        valid_to,
        checkin_date,
        checkout_date,
    )
    else {
        return Verdict::Invalid("offer row is incomplete".to_string());
    };

    let mut notes = Vec::new();
    let lifecycle = if valid_to.date() < ctx.as_of {
        notes.push(format!(
            "offer expired on {}; kept for statistics",
            valid_to.date()
        ));
        OfferLifecycle::Expired
    } else {
        OfferLifecycle::Current
    };
    if price_usd > rules.price_usd_max {
        notes.push(format!(
            "price_usd {} above plausibility limit {}",
            price_usd, rules.price_usd_max
        ));
    }

    Verdict::from_notes(
        WarehouseRecord::Offer(OfferRecord {
            hotel_id,
            price_usd,
            original_price,
            original_currency,
            breakfast_included,
            valid_from,
            valid_to,
            checkin_date,
            checkout_date,
            lifecycle,
        }),
        notes,
    )
}
