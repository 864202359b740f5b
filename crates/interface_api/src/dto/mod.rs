//! Request and response bodies
//!
//! Request bodies are camelCase JSON validated with `validator` before
//! they reach a service. Dates arrive as strings and are normalized to the
//! business timezone by the handler.

pub mod documents;
pub mod installments;
pub mod subscription;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use validator::ValidationError;

use core_kernel::Currency;

/// Largest amount accepted on any request body
pub(crate) const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// Largest penalty or monthly interest percentage
pub(crate) const MAX_RATE_PERCENTAGE: Decimal = dec!(100);

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

pub(crate) fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_positive() && !value.is_zero() {
        Ok(())
    } else {
        Err(invalid("positive", "must be greater than zero"))
    }
}

/// A positive amount in whole cents, below [`MAX_AMOUNT`]
pub(crate) fn validate_amount(value: &Decimal) -> Result<(), ValidationError> {
    validate_positive(value)?;
    if value.normalize().scale() > Currency::default().decimal_places() {
        return Err(invalid("cents", "must not have fractions of a cent"));
    }
    if *value > MAX_AMOUNT {
        return Err(invalid("max_amount", "exceeds the largest accepted amount"));
    }
    Ok(())
}

/// A percentage between 0 and [`MAX_RATE_PERCENTAGE`]
pub(crate) fn validate_rate(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid("not_negative", "must not be negative"));
    }
    if *value > MAX_RATE_PERCENTAGE {
        return Err(invalid("max_rate", "must be at most 100%"));
    }
    Ok(())
}
