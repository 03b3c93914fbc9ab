//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog prices arrive as plain numbers in the store's currency; [`Price`]
//! pairs such an amount with a [`CurrencyCode`] so it can be formatted for
//! display (`R$ 179,90`, `$19.99`).

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., reais, not centavos).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Format for display, using the currency's symbol and separators.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self.amount.round_dp(2);
        let raw = format!("{:.2}", rounded.abs());
        let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw.as_str(), "00"));

        let (group_sep, decimal_sep) = self.currency_code.separators();
        let grouped = group_digits(int_part, group_sep);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };

        format!(
            "{sign}{}{grouped}{decimal_sep}{frac_part}",
            self.currency_code.prefix()
        )
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Insert `sep` between every group of three digits, counting from the right.
fn group_digits(digits: &str, sep: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(c);
    }
    out
}

/// Error parsing a currency code.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported currency code: {0}")]
pub struct ParseCurrencyError(pub String);

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    BRL,
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Currency symbol as printed before the amount.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::BRL => "R$",
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// Three-letter ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BRL => "BRL",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }

    const fn prefix(self) -> &'static str {
        match self {
            Self::BRL => "R$ ",
            other => other.symbol(),
        }
    }

    /// (grouping, decimal) separators.
    const fn separators(self) -> (char, char) {
        match self {
            Self::BRL | Self::EUR => ('.', ','),
            Self::USD | Self::GBP | Self::CAD | Self::AUD => (',', '.'),
        }
    }
}

impl FromStr for CurrencyCode {
    type Err = ParseCurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BRL" => Ok(Self::BRL),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            _ => Err(ParseCurrencyError(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn price(amount: &str, currency: CurrencyCode) -> Price {
        Price::new(amount.parse().unwrap(), currency)
    }

    #[test]
    fn test_display_brl() {
        assert_eq!(price("179.9", CurrencyCode::BRL).display(), "R$ 179,90");
        assert_eq!(price("1234.5", CurrencyCode::BRL).display(), "R$ 1.234,50");
    }

    #[test]
    fn test_display_usd() {
        assert_eq!(price("19.99", CurrencyCode::USD).display(), "$19.99");
        assert_eq!(price("1000000", CurrencyCode::USD).display(), "$1,000,000.00");
    }

    #[test]
    fn test_display_rounds_to_cents() {
        assert_eq!(price("0.006", CurrencyCode::GBP).display(), "£0.01");
        assert_eq!(price("0", CurrencyCode::EUR).display(), "€0,00");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(price("-5.5", CurrencyCode::USD).display(), "-$5.50");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("brl".parse::<CurrencyCode>().unwrap(), CurrencyCode::BRL);
        assert_eq!(" EUR ".parse::<CurrencyCode>().unwrap(), CurrencyCode::EUR);
        assert_eq!(
            "XYZ".parse::<CurrencyCode>(),
            Err(ParseCurrencyError("XYZ".to_string()))
        );
    }
}
