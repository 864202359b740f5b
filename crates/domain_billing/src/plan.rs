//! Installment plans for sales made on credit terms
//!
//! Recording a sale with installment terms creates the whole batch of
//! installments at once: numbered 1..n, due monthly from the first due
//! date, with amounts split to the cent.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{add_months, ClientId, Money, SaleId};

use crate::error::BillingError;
use crate::installment::Installment;

/// Upper bound on installments per sale
pub const MAX_INSTALLMENTS: u32 = 120;

/// A sale on credit terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: SaleId,
    pub client_id: ClientId,
    pub client_name: String,
    pub total: Money,
    pub installment_count: u32,
    pub first_due_date: NaiveDate,
}

/// The installments generated for one sale
#[derive(Debug, Clone, PartialEq)]
pub struct InstallmentPlan {
    pub sale_id: SaleId,
    pub installments: Vec<Installment>,
}

impl InstallmentPlan {
    /// Builds the installment batch for a sale.
    ///
    /// Due dates step one calendar month from `first_due_date`, clamped to
    /// the end of shorter months (a plan starting Jan 31 is due Feb 29,
    /// Mar 31, ...). Leftover cents go to the first installments so the
    /// amounts always sum to the sale total, which must therefore be in
    /// whole cents.
    pub fn for_sale(sale: &Sale) -> Result<Self, BillingError> {
        if sale.installment_count == 0 {
            return Err(BillingError::InvalidPlan("at least one installment is required".to_string()));
        }
        if sale.installment_count > MAX_INSTALLMENTS {
            return Err(BillingError::InvalidPlan(format!(
                "at most {} installments are allowed, got {}",
                MAX_INSTALLMENTS, sale.installment_count
            )));
        }
        if !sale.total.is_positive() {
            return Err(BillingError::InvalidPlan(format!(
                "sale total must be positive, got {}",
                sale.total
            )));
        }
        if !sale.total.fits_currency_precision() {
            return Err(BillingError::InvalidPlan(format!(
                "sale total {} has fractions of a cent",
                sale.total.amount()
            )));
        }

        let amounts = sale.total.allocate(sale.installment_count)?;
        if amounts.iter().any(|a| !a.is_positive()) {
            return Err(BillingError::InvalidPlan(format!(
                "{} is too small to split into {} installments",
                sale.total, sale.installment_count
            )));
        }

        let installments = amounts
            .into_iter()
            .enumerate()
            .map(|(i, amount)| {
                let due_date = add_months(sale.first_due_date, i as u32).ok_or_else(|| {
                    BillingError::InvalidPlan(format!("due date out of range for installment {}", i + 1))
                })?;
                Ok(Installment::new(
                    sale.id,
                    sale.client_id,
                    sale.client_name.clone(),
                    i as u32 + 1,
                    amount,
                    due_date,
                ))
            })
            .collect::<Result<Vec<_>, BillingError>>()?;

        Ok(Self {
            sale_id: sale.id,
            installments,
        })
    }

    pub fn total(&self) -> Result<Money, BillingError> {
        let currency = self
            .installments
            .first()
            .map(|i| i.amount.currency())
            .unwrap_or_default();
        Ok(Money::sum(currency, self.installments.iter().map(|i| &i.amount))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sale(total: Money, count: u32, first_due: NaiveDate) -> Sale {
        Sale {
            id: SaleId::new_v7(),
            client_id: ClientId::new_v7(),
            client_name: "Padaria Estrela".to_string(),
            total,
            installment_count: count,
            first_due_date: first_due,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_plan_numbers_and_dates() {
        let plan = InstallmentPlan::for_sale(&sale(Money::brl(dec!(300)), 3, date(2024, 1, 31))).unwrap();

        let numbers: Vec<_> = plan.installments.iter().map(|i| i.installment_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);

        let dues: Vec<_> = plan.installments.iter().map(|i| i.due_date).collect();
        assert_eq!(dues, vec![date(2024, 1, 31), date(2024, 2, 29), date(2024, 3, 31)]);
    }

    #[test]
    fn test_plan_sums_to_total() {
        let plan = InstallmentPlan::for_sale(&sale(Money::brl(dec!(100)), 3, date(2024, 5, 10))).unwrap();
        assert_eq!(plan.total().unwrap(), Money::brl(dec!(100)));
        assert_eq!(plan.installments[0].amount, Money::brl(dec!(33.34)));
    }

    #[test]
    fn test_plan_rejects_zero_installments() {
        let result = InstallmentPlan::for_sale(&sale(Money::brl(dec!(100)), 0, date(2024, 5, 10)));
        assert!(matches!(result, Err(BillingError::InvalidPlan(_))));
    }

    #[test]
    fn test_plan_rejects_amount_below_one_cent_each() {
        let result = InstallmentPlan::for_sale(&sale(Money::brl(dec!(0.02)), 3, date(2024, 5, 10)));
        assert!(matches!(result, Err(BillingError::InvalidPlan(_))));
    }

    #[test]
    fn test_plan_installments_start_pending() {
        let plan = InstallmentPlan::for_sale(&sale(Money::brl(dec!(50)), 2, date(2024, 5, 10))).unwrap();
        assert!(plan.installments.iter().all(|i| i.validate().is_ok() && i.paid_date.is_none()));
    }
}
