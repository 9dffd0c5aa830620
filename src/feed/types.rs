//! Price feed types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Reasons a quoted price cannot be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceParseError {
    /// Text is not a decimal number
    #[error("invalid price {text:?}: {reason}")]
    Invalid { text: String, reason: String },
    /// Parsed, but below zero
    #[error("negative price {0}")]
    Negative(Decimal),
}

/// A single timestamped quote for an instrument
///
/// The price is kept exactly as the source delivered it and parsed on demand,
/// so malformed quotes survive until the consumer decides how to treat them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    /// Instrument symbol (e.g., "005930")
    pub symbol: String,
    /// Price as quoted by the source
    pub price: String,
    /// Quote timestamp
    pub timestamp: DateTime<Utc>,
}

impl PriceObservation {
    /// Create a new observation
    pub fn new(
        symbol: impl Into<String>,
        price: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            price: price.into(),
            timestamp,
        }
    }

    /// Parse the quoted price
    pub fn parse_price(&self) -> Result<Decimal, PriceParseError> {
        parse_price(&self.price)
    }
}

/// Parse a textual price into a finite, non-negative decimal
///
/// Accepts plain and scientific notation only. Digit separators such as `_`
/// are rejected rather than ignored.
pub fn parse_price(text: &str) -> Result<Decimal, PriceParseError> {
    let trimmed = text.trim();
    if let Some(c) = trimmed.chars().find(|c| !is_numeric_char(*c)) {
        return Err(PriceParseError::Invalid {
            text: text.to_string(),
            reason: format!("unexpected character {c:?}"),
        });
    }

    let price = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|e| PriceParseError::Invalid {
            text: text.to_string(),
            reason: e.to_string(),
        })?;

    if price.is_sign_negative() && !price.is_zero() {
        return Err(PriceParseError::Negative(price));
    }

    Ok(price)
}

fn is_numeric_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E')
}
