//! Type-safe price representation using decimal arithmetic.
//!
//! Listing data carries prices as display strings such as `"$10.00"`. A
//! [`Price`] is parsed once, when an item enters the cart, so that totals are
//! accumulated in [`Decimal`] rather than floating point.

use core::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The input has a currency symbol but no amount.
    #[error("price {0:?} has no amount after the currency symbol")]
    MissingAmount(String),
    /// The amount is not a decimal number.
    #[error("price {0:?} is not a decimal number")]
    NotNumeric(String),
    /// The amount is below zero.
    #[error("price {0:?} is negative")]
    Negative(String),
}

/// A unit price as shown in the listing.
///
/// ## Examples
///
/// ```
/// use pocket_shop_core::Price;
///
/// let price = Price::parse("$5.50").unwrap();
/// assert_eq!(price.to_string(), "$5.50");
///
/// assert!(Price::parse("$abc").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Leading currency symbol, if the listing supplied one.
    symbol: Option<char>,
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    amount: Decimal,
}

impl Price {
    /// Parse a price string such as `"$10.00"`.
    ///
    /// A single leading character that cannot start a number is treated as
    /// the currency symbol and stripped. The rest must be a non-negative
    /// decimal with no surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, has nothing after the symbol,
    /// is not numeric, or is negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let mut chars = s.chars();
        let first = chars.next().ok_or(PriceError::Empty)?;

        let (symbol, digits) = if is_number_char(first) {
            (None, s)
        } else {
            (Some(first), chars.as_str())
        };

        if digits.is_empty() {
            return Err(PriceError::MissingAmount(s.to_owned()));
        }

        // `Decimal::from_str` also accepts `_` separators
        if !digits.chars().all(is_number_char) {
            return Err(PriceError::NotNumeric(s.to_owned()));
        }
        let amount =
            Decimal::from_str(digits).map_err(|_| PriceError::NotNumeric(s.to_owned()))?;

        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(s.to_owned()));
        }

        Ok(Self { symbol, amount })
    }

    /// The numeric amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// The currency symbol, if any.
    #[must_use]
    pub const fn symbol(&self) -> Option<char> {
        self.symbol
    }
}

const fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '-' | '+')
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(symbol) = self.symbol {
            write!(f, "{symbol}")?;
        }
        write!(f, "{}", self.amount)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Format an amount for display, rounded half away from zero to 2 places.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}
