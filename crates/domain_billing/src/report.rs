//! Receivables report
//!
//! Single-pass aggregation over installments grouped by derived status and
//! by client.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{ClientId, Currency, Money};

use crate::error::BillingError;
use crate::installment::{DerivedStatus, Installment};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTotals {
    pub count: usize,
    pub amount: Money,
}

impl StatusTotals {
    fn zero(currency: Currency) -> Self {
        Self {
            count: 0,
            amount: Money::zero(currency),
        }
    }

    fn add(&mut self, amount: &Money) -> Result<(), BillingError> {
        self.count += 1;
        self.amount = self.amount.checked_add(amount)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientReceivables {
    pub client_id: ClientId,
    pub client_name: String,
    /// Unpaid amount, late or not
    pub outstanding: Money,
    pub overdue: Money,
    pub open_installments: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivablesReport {
    pub reference_date: NaiveDate,
    pub overdue: StatusTotals,
    pub pending: StatusTotals,
    pub paid: StatusTotals,
    pub outstanding: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_days_late: Option<i64>,
    /// Clients with something outstanding, largest balance first
    pub by_client: Vec<ClientReceivables>,
}

impl ReceivablesReport {
    pub fn build(
        installments: &[Installment],
        today: NaiveDate,
        currency: Currency,
    ) -> Result<Self, BillingError> {
        let mut overdue = StatusTotals::zero(currency);
        let mut pending = StatusTotals::zero(currency);
        let mut paid = StatusTotals::zero(currency);
        let mut max_days_late: Option<i64> = None;
        let mut clients: HashMap<ClientId, ClientReceivables> = HashMap::new();

        for installment in installments {
            let derivation = installment.derive(today);
            match derivation.status {
                DerivedStatus::Pago => {
                    paid.add(&installment.amount)?;
                    continue;
                }
                DerivedStatus::Atrasado => {
                    overdue.add(&installment.amount)?;
                    max_days_late = max_days_late.max(derivation.days_late);
                }
                DerivedStatus::Pendente => pending.add(&installment.amount)?,
            }

            let entry = clients
                .entry(installment.client_id)
                .or_insert_with(|| ClientReceivables {
                    client_id: installment.client_id,
                    client_name: installment.client_name.clone(),
                    outstanding: Money::zero(currency),
                    overdue: Money::zero(currency),
                    open_installments: 0,
                });
            entry.outstanding = entry.outstanding.checked_add(&installment.amount)?;
            if derivation.status == DerivedStatus::Atrasado {
                entry.overdue = entry.overdue.checked_add(&installment.amount)?;
            }
            entry.open_installments += 1;
        }

        let mut by_client: Vec<_> = clients.into_values().collect();
        by_client.sort_by(|a, b| {
            b.outstanding
                .amount()
                .cmp(&a.outstanding.amount())
                .then_with(|| a.client_name.cmp(&b.client_name))
        });

        Ok(Self {
            reference_date: today,
            outstanding: overdue.amount.checked_add(&pending.amount)?,
            overdue,
            pending,
            paid,
            max_days_late,
            by_client,
        })
    }
}
