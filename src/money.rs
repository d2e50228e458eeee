//! Integer money amounts tagged with a currency.
//!
//! Amounts are stored in minor units (e.g., cents) so that sums and
//! differences are exact. Combining amounts of different currencies is an
//! error rather than a silent conversion.

use std::{fmt::Display, str::FromStr};

use serde::Serialize;

use crate::Error;

/// A three letter, upper case currency code, e.g. "USD".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Currency(String);

impl Currency {
    /// Create a currency from a three letter code.
    ///
    /// Lower case codes are accepted and converted to upper case.
    ///
    /// # Errors
    /// Returns [Error::InvalidCurrency] if `code` is not three ASCII letters.
    pub fn new(code: &str) -> Result<Self, Error> {
        let code = code.trim();

        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(Error::InvalidCurrency(code.to_owned()));
        }

        Ok(Self(code.to_ascii_uppercase()))
    }

    /// The currency code, e.g. "USD".
    pub fn code(&self) -> &str {
        &self.0
    }

    /// The symbol to display in front of amounts in this currency.
    ///
    /// Currencies without a well known symbol use their code followed by a space.
    pub fn symbol(&self) -> String {
        match self.0.as_str() {
            "USD" | "AUD" | "CAD" | "NZD" => "$".to_owned(),
            "EUR" => "€".to_owned(),
            "GBP" => "£".to_owned(),
            "JPY" | "CNY" => "¥".to_owned(),
            code => format!("{code} "),
        }
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::new(s)
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An amount of money in minor units (cents) of a single currency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    /// Create an amount of `amount` minor units of `currency`.
    pub fn new(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Zero in `currency`.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// The amount in minor units.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// The amount in major units, for display and charting only.
    pub fn as_major_units(&self) -> f64 {
        self.amount as f64 / 100.0
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    pub fn is_negative(&self) -> bool {
        self.amount < 0
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Add `other` to this amount.
    ///
    /// # Errors
    /// Returns [Error::CurrencyMismatch] if the currencies differ or
    /// [Error::AmountOverflow] if the sum does not fit in an `i64`.
    pub fn checked_add(&self, other: &Money) -> Result<Money, Error> {
        self.ensure_same_currency(other)?;

        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(Error::AmountOverflow)?;

        Ok(Money::new(amount, self.currency.clone()))
    }

    /// Subtract `other` from this amount.
    ///
    /// # Errors
    /// Returns [Error::CurrencyMismatch] if the currencies differ or
    /// [Error::AmountOverflow] if the difference does not fit in an `i64`.
    pub fn checked_sub(&self, other: &Money) -> Result<Money, Error> {
        self.ensure_same_currency(other)?;

        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or(Error::AmountOverflow)?;

        Ok(Money::new(amount, self.currency.clone()))
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), Error> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(Error::CurrencyMismatch {
                expected: self.currency.clone(),
                found: other.currency.clone(),
            })
        }
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();

        write!(f, "{sign}{}.{:02} {}", abs / 100, abs % 100, self.currency)
    }
}
