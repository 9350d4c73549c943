//! Typed access to raw staged fields
//!
//! A `FieldReader` converts one field at a time and remembers every
//! problem, so a rejected row reports all of its defects at once.

use crate::model::CurrencyCode;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y%m%d%H%M",
];

pub struct FieldReader<'a> {
    fields: &'a Map<String, Value>,
    problems: Vec<String>,
}

impl<'a> FieldReader<'a> {
    pub fn new(fields: &'a Map<String, Value>) -> Self {
        Self {
            fields,
            problems: Vec::new(),
        }
    }

    /// Record a rule failure found outside the typed accessors
    pub fn reject(&mut self, problem: impl Into<String>) {
        self.problems.push(problem.into());
    }

    /// All collected problems joined, or `Ok` when there were none
    pub fn finish(self) -> Result<(), String> {
        if self.problems.is_empty() {
            Ok(())
        } else {
            Err(self.problems.join("; "))
        }
    }

    fn present(&self, name: &str) -> Option<&'a Value> {
        match self.fields.get(name) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(v) => Some(v),
        }
    }

    fn required(&mut self, name: &str) -> Option<&'a Value> {
        let value = self.present(name);
        if value.is_none() {
            self.reject(format!("missing field `{}`", name));
        }
        value
    }

    fn convert<T>(
        &mut self,
        name: &str,
        value: Option<&'a Value>,
        expected: &str,
        parse: impl Fn(&Value) -> Option<T>,
    ) -> Option<T> {
        let value = value?;
        let parsed = parse(value);
        if parsed.is_none() {
            self.reject(format!("field `{}` is not {}: {}", name, expected, value));
        }
        parsed
    }

    pub fn required_text(&mut self, name: &str) -> Option<String> {
        let value = self.required(name);
        self.convert(name, value, "text", as_text)
    }

    pub fn required_decimal(&mut self, name: &str) -> Option<Decimal> {
        let value = self.required(name);
        self.convert(name, value, "a decimal number", as_decimal)
    }

    pub fn optional_decimal(&mut self, name: &str) -> Option<Decimal> {
        let value = self.present(name);
        self.convert(name, value, "a decimal number", as_decimal)
    }

    pub fn required_date(&mut self, name: &str) -> Option<NaiveDate> {
        let value = self.required(name);
        self.convert(name, value, "a date (YYYY-MM-DD)", as_date)
    }

    pub fn required_datetime(&mut self, name: &str) -> Option<NaiveDateTime> {
        let value = self.required(name);
        self.convert(name, value, "a timestamp", as_datetime)
    }

    pub fn required_bool(&mut self, name: &str) -> Option<bool> {
        let value = self.required(name);
        self.convert(name, value, "a boolean", as_bool)
    }

    pub fn required_positive_u32(&mut self, name: &str) -> Option<u32> {
        let value = self.required(name);
        self.convert(name, value, "a positive integer", |v| {
            as_u32(v).filter(|n| *n > 0)
        })
    }

    pub fn required_code(&mut self, name: &str) -> Option<CurrencyCode> {
        let value = self.required(name);
        self.convert(name, value, "an ISO 4217 currency code", |v| {
            as_text(v).and_then(|s| CurrencyCode::parse(&s))
        })
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn as_date(value: &Value) -> Option<NaiveDate> {
    let text = value.as_str()?.trim();
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

fn as_datetime(value: &Value) -> Option<NaiveDateTime> {
    let text = value.as_str()?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}
