use std::fmt;

use serde::Serialize;

/// The closed set of currencies circulating in the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
    CHF,
    BRL,
}

impl Currency {
    /// Every supported currency, in bank-id order
    pub const ALL: [Currency; 6] = [
        Currency::USD,
        Currency::EUR,
        Currency::GBP,
        Currency::JPY,
        Currency::CHF,
        Currency::BRL,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::JPY => "JPY",
            Self::CHF => "CHF",
            Self::BRL => "BRL",
        }
    }

    /// Position in [`Currency::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Source of conversion rates between two currencies
///
/// `rate(from, to)` is the number of `to` units one unit of `from` buys.
/// Implementations must be pure and return a positive rate for every pair.
pub trait ExchangeRates: Send + Sync {
    fn rate(&self, from: Currency, to: Currency) -> f64;
}

impl<F> ExchangeRates for F
where
    F: Fn(Currency, Currency) -> f64 + Send + Sync,
{
    fn rate(&self, from: Currency, to: Currency) -> f64 {
        self(from, to)
    }
}

/// Fixed rate table quoted against the US dollar
#[derive(Debug, Clone)]
pub struct StaticRateTable {
    usd_value: [f64; 6],
}

impl StaticRateTable {
    pub fn new() -> Self {
        Self {
            // USD, EUR, GBP, JPY, CHF, BRL
            usd_value: [1.0, 1.08, 1.27, 0.0067, 1.12, 0.20],
        }
    }

    /// Override the dollar value of one currency
    pub fn with_usd_value(mut self, currency: Currency, value: f64) -> Self {
        self.usd_value[currency.index()] = value;
        self
    }
}

impl Default for StaticRateTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ExchangeRates for StaticRateTable {
    fn rate(&self, from: Currency, to: Currency) -> f64 {
        if from == to {
            return 1.0;
        }
        self.usd_value[from.index()] / self.usd_value[to.index()]
    }
}
