//! Field checks shared by the request payloads.
//!
//! Errors are collected per field, so one response reports every problem
//! at once, and turned into an `AppError::ValidationError` by [`Validator::finish`].

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::{AppError, FieldErrors};

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";

/// Digits allowed in a NUMERIC(8,2) price.
const PRICE_MAX_DIGITS: u32 = 8;
const PRICE_DECIMAL_PLACES: u32 = 2;

#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: &str, msg: impl Into<String>) {
        self.errors.entry(field.to_string()).or_default().push(msg.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// `value`, or `fallback` when the field was left out, or a "required" error.
    pub fn present<T>(&mut self, field: &str, value: Option<T>, fallback: Option<T>) -> Option<T> {
        let found = value.or(fallback);
        if found.is_none() {
            self.error(field, REQUIRED);
        }
        found
    }

    /// Required, non-blank, trimmed text of bounded length.
    pub fn text(&mut self, field: &str, value: Option<String>, fallback: Option<&String>, max_len: usize) -> String {
        let Some(raw) = self.present(field, value, fallback.cloned()) else {
            return String::new();
        };
        let trimmed = raw.trim().to_string();
        if trimmed.is_empty() {
            self.error(field, BLANK);
        } else {
            self.max_length(field, &trimmed, max_len);
        }
        trimmed
    }

    /// Optional text: missing falls back, then to the empty string.
    pub fn optional_text(
        &mut self,
        field: &str,
        value: Option<String>,
        fallback: Option<&String>,
        max_len: Option<usize>,
    ) -> String {
        let text = value
            .map(|v| v.trim().to_string())
            .or_else(|| fallback.cloned())
            .unwrap_or_default();
        if let Some(max) = max_len {
            self.max_length(field, &text, max);
        }
        text
    }

    fn max_length(&mut self, field: &str, value: &str, max_len: usize) {
        if value.chars().count() > max_len {
            self.error(field, format!("Ensure this field has no more than {max_len} characters."));
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if !value.is_empty() && !is_valid_email(value) {
            self.error(field, "Enter a valid email address.");
        }
    }

    pub fn url(&mut self, field: &str, value: &str) {
        if !value.is_empty() && !is_valid_url(value) {
            self.error(field, "Enter a valid URL.");
        }
    }

    /// Parses a `YYYY-MM-DD` date.
    pub fn date(&mut self, field: &str, value: &str) -> Option<NaiveDate> {
        match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
            Ok(d) => Some(d),
            Err(_) => {
                self.error(field, "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.");
                None
            }
        }
    }

    /// Accepts a JSON string or number and checks it fits NUMERIC(8,2) and is not negative.
    /// The result always carries two decimal places.
    pub fn price(&mut self, field: &str, value: &Value) -> Option<Decimal> {
        let parsed = match value {
            Value::String(s) => Decimal::from_str(s.trim()).ok(),
            Value::Number(n) => Decimal::from_str(&n.to_string())
                .or_else(|_| Decimal::from_scientific(&n.to_string()))
                .ok(),
            _ => None,
        };
        let Some(price) = parsed else {
            self.error(field, "A valid number is required.");
            return None;
        };

        let before = self.errors.get(field).map_or(0, Vec::len);
        if price.is_sign_negative() && !price.is_zero() {
            self.error(field, "Price cannot be negative.");
        }
        let normalized = price.normalize();
        let decimals = normalized.scale();
        let whole_digits = whole_digits(normalized);
        if decimals > PRICE_DECIMAL_PLACES {
            self.error(field, format!("Ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places."));
        } else if whole_digits > PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES {
            self.error(
                field,
                format!(
                    "Ensure that there are no more than {} digits before the decimal point.",
                    PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES
                ),
            );
        }
        if self.errors.get(field).map_or(0, Vec::len) > before {
            return None;
        }

        let mut price = normalized;
        price.rescale(PRICE_DECIMAL_PLACES);
        Some(price)
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::invalid_fields(self.errors))
        }
    }
}

fn whole_digits(value: Decimal) -> u32 {
    let whole = value.abs().trunc().to_string();
    whole.trim_start_matches('0').len() as u32
}

fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    !local.is_empty()
        && !local.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn is_valid_url(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    match rest {
        Some(rest) => {
            let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
            (!host.is_empty() && host.contains('.')) || host.starts_with("localhost")
        }
        None => false,
    }
}
