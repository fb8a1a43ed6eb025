//! Currency descriptors and display formatting.
//!
//! Formatting always renders exactly two decimal digits; the sign precedes
//! the symbol. Nothing here feeds back into stored amounts.

use std::fmt;

use rust_decimal::RoundingStrategy;

use crate::{DISPLAY_DIGITS, Money};

/// Display metadata for a currency. Carries no arithmetic; amounts are
/// plain [`Money`] values regardless of currency.
#[derive(Debug, Clone, Eq)]
pub struct Currency {
    name: Option<String>,
    symbol: Option<String>,
    code: String,
}

impl Currency {
    pub fn new(
        name: Option<impl ToString>,
        symbol: Option<impl ToString>,
        code: impl ToString,
    ) -> Self {
        Self {
            name: name.map(|n| n.to_string()),
            symbol: symbol.map(|s| s.to_string()),
            code: code.to_string(),
        }
    }

    pub fn usd() -> Self {
        Self::new(Some("US Dollar"), Some("$"), "USD")
    }

    pub fn eur() -> Self {
        Self::new(Some("Euro"), Some("€"), "EUR")
    }

    pub fn jpy() -> Self {
        Self::new(Some("Japanese Yen"), Some("¥"), "JPY")
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl PartialEq for Currency {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = self.symbol.as_deref().unwrap_or_default();
        let name = self.name.as_deref().unwrap_or_default();
        write!(f, "{} {} -- {}", self.code, symbol, name)
    }
}

/// Renders an amount at two decimal digits with no currency marker.
pub fn format_number(amount: Money) -> String {
    amount.to_string()
}

/// Renders an amount at two decimal digits, prefixed with the currency
/// symbol when one is known, suffixed with the code otherwise. The sign
/// always precedes the numeral: `-€4.57`, `-4.57 CHF`.
pub fn format_currency(amount: Money, currency: &Currency) -> String {
    let magnitude = amount
        .to_decimal()
        .abs()
        .round_dp_with_strategy(DISPLAY_DIGITS, RoundingStrategy::MidpointNearestEven);
    let sign = if amount.raw() < 0 { "-" } else { "" };

    match currency.symbol() {
        Some(symbol) => format!("{sign}{symbol}{magnitude:.2}"),
        None => format!("{sign}{magnitude:.2} {}", currency.code()),
    }
}
