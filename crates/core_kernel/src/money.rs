//! Money types with precise decimal arithmetic
//!
//! Monetary values are carried as `rust_decimal` amounts tagged with a
//! currency so that sale totals, installment splits and boleto charges never
//! go through floating point.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;
use thiserror::Error;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    BRL,
    USD,
    EUR,
}

impl Currency {
    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        2
    }

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::BRL => "R$",
            Currency::USD => "$",
            Currency::EUR => "€",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::BRL => "BRL",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Arithmetic overflow in {0}")]
    Overflow(&'static str),
}

/// A monetary amount with associated currency
///
/// Amounts are stored with 4 decimal places internally; interest and
/// penalty calculations round back to the currency's precision with
/// [`Money::round_to_currency`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: amount.round_dp(4),
            currency,
        }
    }

    /// Creates a Brazilian real amount
    pub fn brl(amount: Decimal) -> Self {
        Self::new(amount, Currency::BRL)
    }

    /// Creates Money from an integer amount in minor units (e.g., centavos)
    pub fn from_minor(minor_units: i64, currency: Currency) -> Self {
        let divisor = Decimal::new(10_i64.pow(currency.decimal_places()), 0);
        Self::new(Decimal::new(minor_units, 0) / divisor, currency)
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: dec!(0),
            currency,
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// True when the amount has no digits below the currency's minor unit
    pub fn fits_currency_precision(&self) -> bool {
        self.amount.normalize().scale() <= self.currency.decimal_places()
    }

    /// Rounds to the currency's standard decimal places
    pub fn round_to_currency(&self) -> Self {
        Self {
            amount: self.amount.round_dp(self.currency.decimal_places()),
            currency: self.currency,
        }
    }

    /// Checked addition that returns an error on currency mismatch
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(MoneyError::Overflow("addition"))?;
        Ok(Self::new(amount, self.currency))
    }

    /// Checked subtraction that returns an error on currency mismatch
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        let amount = self
            .amount
            .checked_sub(other.amount)
            .ok_or(MoneyError::Overflow("subtraction"))?;
        Ok(Self::new(amount, self.currency))
    }

    /// Multiplies by a scalar (e.g., for rate calculations)
    pub fn multiply(&self, factor: Decimal) -> Result<Money, MoneyError> {
        let amount = self
            .amount
            .checked_mul(factor)
            .ok_or(MoneyError::Overflow("multiplication"))?;
        Ok(Self::new(amount, self.currency))
    }

    /// Allocates the money into n parts, to the cent.
    ///
    /// Leftover cents go to the first allocations, so the parts always sum
    /// back to the original amount. Amounts finer than the currency's minor
    /// unit cannot be split that way and are rejected.
    pub fn allocate(&self, n: u32) -> Result<Vec<Money>, MoneyError> {
        if n == 0 {
            return Err(MoneyError::InvalidAmount("Cannot allocate to zero parts".to_string()));
        }
        if !self.fits_currency_precision() {
            return Err(MoneyError::InvalidAmount(format!(
                "{} has more than {} decimal places",
                self.amount,
                self.currency.decimal_places()
            )));
        }

        let dp = self.currency.decimal_places();
        let total_minor = self
            .amount
            .checked_mul(Decimal::new(10_i64.pow(dp), 0))
            .ok_or(MoneyError::Overflow("allocation"))?
            .round()
            .mantissa();

        let base_amount = total_minor / n as i128;
        let remainder = (total_minor % n as i128) as u32;

        let mut allocations = Vec::with_capacity(n as usize);
        for i in 0..n {
            let minor = if i < remainder {
                base_amount + 1
            } else {
                base_amount
            };
            let minor = i64::try_from(minor).map_err(|_| MoneyError::Overflow("allocation"))?;
            allocations.push(Money::from_minor(minor, self.currency));
        }

        Ok(allocations)
    }

    /// Sums an iterator of amounts, failing on the first currency mismatch
    pub fn sum<'a, I>(currency: Currency, amounts: I) -> Result<Money, MoneyError>
    where
        I: IntoIterator<Item = &'a Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(currency), |acc, m| acc.checked_add(m))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero(Currency::default())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = self.currency.decimal_places();
        write!(
            f,
            "{} {:.dp$}",
            self.currency.symbol(),
            self.amount,
            dp = dp as usize
        )
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.amount, self.currency)
    }
}

/// A percentage rate (penalty, monthly interest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate {
    /// The rate as a decimal (e.g., 0.02 for 2%)
    value: Decimal,
}

impl Rate {
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Creates a rate from a percentage (e.g., 2.0 for 2%)
    pub fn from_percentage(percentage: Decimal) -> Self {
        Self {
            value: percentage / dec!(100),
        }
    }

    pub fn zero() -> Self {
        Self { value: Decimal::ZERO }
    }

    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    pub fn as_percentage(&self) -> Decimal {
        self.value * dec!(100)
    }

    /// Applies this rate to a money amount
    pub fn apply(&self, money: &Money) -> Result<Money, MoneyError> {
        money.multiply(self.value)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().round_dp(4))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_from_minor() {
        let m = Money::from_minor(10050, Currency::BRL);
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_currency_mismatch() {
        let brl = Money::brl(dec!(100.00));
        let usd = Money::new(dec!(100.00), Currency::USD);

        let result = brl.checked_add(&usd);
        assert!(matches!(result, Err(MoneyError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn test_allocation_puts_leftover_cents_first() {
        let m = Money::brl(dec!(100.00));
        let parts = m.allocate(3).unwrap();

        assert_eq!(parts[0].amount(), dec!(33.34));
        assert_eq!(parts[1].amount(), dec!(33.33));
        assert_eq!(parts[2].amount(), dec!(33.33));
    }

    #[test]
    fn test_allocate_zero_parts_fails() {
        assert!(Money::brl(dec!(10)).allocate(0).is_err());
    }

    #[test]
    fn test_rate_application() {
        let rate = Rate::from_percentage(dec!(2.0));
        let amount = Money::brl(dec!(1000.00));

        assert_eq!(rate.apply(&amount).unwrap().amount(), dec!(20.00));
    }

    #[test]
    fn test_allocate_rejects_sub_cent_amounts() {
        assert!(Money::brl(dec!(100.005)).allocate(3).is_err());
        assert!(Money::brl(dec!(100.500)).allocate(3).is_ok());
    }

    #[test]
    fn test_multiply_overflow_is_an_error() {
        let huge = Money::brl(Decimal::MAX);
        assert_eq!(huge.multiply(dec!(2)), Err(MoneyError::Overflow("multiplication")));
    }

    #[test]
    fn test_display_uses_symbol() {
        assert_eq!(Money::brl(dec!(12.5)).to_string(), "R$ 12.50");
    }
}
