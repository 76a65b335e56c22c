//! Conversion between the base currency and the user's display currency.

use crate::core::currency::{Currency, ExchangeRateTable};

/// Converts and formats amounts for one display currency against one rate
/// table. All methods are pure; amounts are passed and returned by value.
#[derive(Debug, Clone)]
pub struct CurrencyConverter {
    currency: Currency,
    rates: ExchangeRateTable,
}

impl CurrencyConverter {
    pub fn new(currency: Currency, rates: ExchangeRateTable) -> Self {
        CurrencyConverter { currency, rates }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn rates(&self) -> &ExchangeRateTable {
        &self.rates
    }

    pub fn symbol(&self) -> &'static str {
        self.currency.symbol()
    }

    /// Base amount expressed in the display currency.
    pub fn to_display(&self, amount_base: f64) -> f64 {
        if self.currency.is_base() {
            return amount_base;
        }
        amount_base / self.rates.rate(self.currency).get()
    }

    /// Display-currency amount expressed in base, for persisting.
    pub fn to_base(&self, amount_display: f64) -> f64 {
        if self.currency.is_base() {
            return amount_display;
        }
        amount_display * self.rates.rate(self.currency).get()
    }

    /// Renders a base amount in the display currency.
    pub fn format(&self, amount_base: f64) -> String {
        format_amount(self.to_display(amount_base), self.currency)
    }
}

/// Formats an amount already in `currency` the way the en-US locale does:
/// symbol prefix, comma thousands separators and fixed fraction digits.
pub fn format_amount(amount: f64, currency: Currency) -> String {
    if !amount.is_finite() {
        return format!("{}{}", currency.symbol(), amount);
    }

    let digits = currency.fraction_digits();
    let fixed = format!("{:.*}", digits, amount.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // Negative values keep their sign even when they round to zero
    let sign = if amount.is_sign_negative() { "-" } else { "" };

    match frac_part {
        Some(frac) => format!("{sign}{}{grouped}.{frac}", currency.symbol()),
        None => format!("{sign}{}{grouped}", currency.symbol()),
    }
}
