//! Currencies, exchange-rate tables and the rate provider abstractions.
//!
//! Every table stores rates in a single direction: how many units of the base
//! currency one unit of a given currency is worth. Quotes arriving from the
//! network in the opposite direction are inverted exactly once, in
//! [`ExchangeRateTable::from_quotes`].

use crate::core::error::{RateFetchError, RateTableError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Ngn,
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    /// The currency every persisted amount is denominated in.
    pub const BASE: Currency = Currency::Ngn;

    pub const ALL: [Currency; 4] = [Currency::Ngn, Currency::Usd, Currency::Eur, Currency::Gbp];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Ngn => "NGN",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Ngn => "₦",
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Currency::Ngn => "Nigerian Naira",
            Currency::Usd => "US Dollar",
            Currency::Eur => "Euro",
            Currency::Gbp => "British Pound",
        }
    }

    /// Number of digits after the decimal point when rendering amounts.
    pub fn fraction_digits(&self) -> usize {
        2
    }

    pub fn is_base(&self) -> bool {
        *self == Currency::BASE
    }

    fn index(&self) -> usize {
        match self {
            Currency::Ngn => 0,
            Currency::Usd => 1,
            Currency::Eur => 2,
            Currency::Gbp => 3,
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NGN" => Ok(Currency::Ngn),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            _ => Err(anyhow::anyhow!("Unsupported currency: {}", s)),
        }
    }
}

/// Amount of base currency equal to one unit of some currency.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct BasePerUnit(f64);

impl BasePerUnit {
    pub const ONE: BasePerUnit = BasePerUnit(1.0);

    /// Accepts only positive, finite values.
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value > 0.0).then_some(BasePerUnit(value))
    }

    /// Inverts a "units per one base" quote.
    pub fn from_quote(units_per_base: f64) -> Option<Self> {
        if units_per_base.is_finite() && units_per_base > 0.0 {
            Self::new(1.0 / units_per_base)
        } else {
            None
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

/// Complete set of rates, one per supported currency.
///
/// Invariants: the base currency maps to exactly 1, every other rate is
/// positive and finite, and no currency is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<Currency, f64>",
    into = "BTreeMap<Currency, f64>"
)]
pub struct ExchangeRateTable {
    rates: [BasePerUnit; 4],
}

impl ExchangeRateTable {
    /// Hardcoded last-resort table used when neither network nor cache can
    /// supply rates.
    pub fn defaults() -> Self {
        ExchangeRateTable {
            rates: [
                BasePerUnit(1.0),
                BasePerUnit(1500.0),
                BasePerUnit(1650.0),
                BasePerUnit(1900.0),
            ],
        }
    }

    /// Builds a table from values already expressed as base per unit.
    pub fn from_base_per_unit(values: &BTreeMap<Currency, f64>) -> Result<Self, RateTableError> {
        let mut rates = [BasePerUnit::ONE; 4];
        for currency in Currency::ALL {
            let value = *values
                .get(&currency)
                .ok_or(RateTableError::Missing(currency))?;
            if currency.is_base() {
                if value != 1.0 {
                    return Err(RateTableError::BaseNotOne(value));
                }
                continue;
            }
            rates[currency.index()] =
                BasePerUnit::new(value).ok_or(RateTableError::NotPositive(currency, value))?;
        }
        Ok(ExchangeRateTable { rates })
    }

    /// Builds a table from a rate source's `rates` object, which quotes how
    /// many units of each currency one unit of base buys. Codes outside the
    /// supported set are ignored.
    pub fn from_quotes(quotes: &HashMap<String, f64>) -> Result<Self, RateFetchError> {
        let mut rates = [BasePerUnit::ONE; 4];
        for currency in Currency::ALL.into_iter().filter(|c| !c.is_base()) {
            let quote = quotes.get(currency.code()).copied().ok_or_else(|| {
                RateFetchError::Malformed(format!("no quote for {currency}"))
            })?;
            rates[currency.index()] = BasePerUnit::from_quote(quote).ok_or_else(|| {
                RateFetchError::Malformed(format!("unusable quote {quote} for {currency}"))
            })?;
        }
        Ok(ExchangeRateTable { rates })
    }

    pub fn rate(&self, currency: Currency) -> BasePerUnit {
        self.rates[currency.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Currency, BasePerUnit)> + '_ {
        Currency::ALL.into_iter().map(|c| (c, self.rate(c)))
    }
}

impl Default for ExchangeRateTable {
    fn default() -> Self {
        Self::defaults()
    }
}

impl TryFrom<BTreeMap<Currency, f64>> for ExchangeRateTable {
    type Error = RateTableError;

    fn try_from(values: BTreeMap<Currency, f64>) -> Result<Self, Self::Error> {
        Self::from_base_per_unit(&values)
    }
}

impl From<ExchangeRateTable> for BTreeMap<Currency, f64> {
    fn from(table: ExchangeRateTable) -> Self {
        table.iter().map(|(c, r)| (c, r.get())).collect()
    }
}

/// Supplies a usable rate table. Implementations never fail: they fall back
/// to cached or default rates instead.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn get_rates(&self) -> ExchangeRateTable;
}

/// A live origin of exchange rates, such as an HTTP API.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&self) -> Result<ExchangeRateTable, RateFetchError>;
}
