//! Property-Based Test Generators
//!
//! Proptest strategies for dates, amounts and installments that respect
//! the domain invariants.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use core_kernel::{ClientId, Currency, Money, SaleId};
use proptest::prelude::*;

use domain_billing::{Installment, InstallmentStatus, Sale};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid base date")
}

/// Dates between 2020 and the end of 2029
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (0u64..3650).prop_map(|days| base_date() + Days::new(days))
}

/// A (due date, today) pair with the due date strictly before today
pub fn past_due_strategy() -> impl Strategy<Value = (NaiveDate, NaiveDate)> {
    (date_strategy(), 1u64..400).prop_map(|(due, late)| (due, due + Days::new(late)))
}

/// Strategy for positive amounts in cents
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..100_000_000i64
}

/// Positive BRL amounts
pub fn brl_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|minor| Money::from_minor(minor, Currency::BRL))
}

pub fn installment_status_strategy() -> impl Strategy<Value = InstallmentStatus> {
    prop_oneof![Just(InstallmentStatus::Pendente), Just(InstallmentStatus::Pago)]
}

/// Installments in either stored status with consistent paid dates
pub fn installment_strategy() -> impl Strategy<Value = Installment> {
    (
        date_strategy(),
        installment_status_strategy(),
        brl_money_strategy(),
        1u32..24,
    )
        .prop_map(|(due, status, amount, number)| {
            let mut installment =
                Installment::new(SaleId::new_v7(), ClientId::new_v7(), "Cliente", number, amount, due);
            if status == InstallmentStatus::Pago {
                installment.status = InstallmentStatus::Pago;
                installment.paid_date = Some(due);
            }
            installment
        })
}

fn sale(total: Money, installment_count: u32, first_due_date: NaiveDate) -> Sale {
    Sale {
        id: SaleId::new_v7(),
        client_id: ClientId::new_v7(),
        client_name: "Cliente".to_string(),
        total,
        installment_count,
        first_due_date,
    }
}

/// Sales that can always be split: at least one cent per installment
pub fn sale_strategy() -> impl Strategy<Value = Sale> {
    (1u32..=60, date_strategy()).prop_flat_map(|(count, first_due)| {
        (count as i64..100_000_000i64)
            .prop_map(move |minor| sale(Money::from_minor(minor, Currency::BRL), count, first_due))
    })
}

/// Sales whose totals carry three or four decimal places, some of which
/// still land on a whole cent (`12.3400`)
pub fn fractional_sale_strategy() -> impl Strategy<Value = Sale> {
    (1u32..=60, date_strategy(), 3u32..=4).prop_flat_map(|(count, first_due, scale)| {
        (1i64..1_000_000_000i64).prop_map(move |units| {
            sale(Money::brl(Decimal::new(units, scale)), count, first_due)
        })
    })
}
