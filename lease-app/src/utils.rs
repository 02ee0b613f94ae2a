use rust_decimal::Decimal;
use thiserror::Error;

use lease_core::calculations::common::round_half_up;

/// Error returned when form text cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid number '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Strips whitespace, thousands separators and currency or percent signs.
fn normalize_decimal_input(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | '%') && !c.is_whitespace())
        .collect()
}

/// Parses user-entered text into a [`Decimal`].
///
/// Accepts `"1,234.56"`, `"$42,000"` and `"7.25%"`. Empty input is zero.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::debug!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Like [`parse_decimal`] but `None` for empty or unparsable input.
pub fn parse_optional_decimal(s: &str) -> Option<Decimal> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return None;
    }
    normalized.parse().map_or_else(
        |e| {
            tracing::debug!(input = %s, "invalid optional decimal: {}", e);
            None
        },
        Some,
    )
}

/// Formats money as `$1,234.56`, negatives as `-$1,234.56`.
pub fn format_currency(value: Decimal) -> String {
    let rounded = round_half_up(value.abs());
    let text = format!("{rounded:.2}");
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}
