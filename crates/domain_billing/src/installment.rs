//! Installments (parcelas) and their derived display status
//!
//! Only `pendente` and `pago` are ever stored. Whether an installment is
//! late is derived on read from its due date and the local "today", so a
//! record never needs a background job to flip it to overdue.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{days_between, ClientId, Entity, InstallmentId, Money, SaleId};

use crate::error::BillingError;

/// Stored installment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    Pendente,
    Pago,
}

impl InstallmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallmentStatus::Pendente => "pendente",
            InstallmentStatus::Pago => "pago",
        }
    }
}

impl fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display status derived from the stored status and today's date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DerivedStatus {
    Atrasado,
    Pendente,
    Pago,
}

impl DerivedStatus {
    /// Position in installment lists: late first, paid last
    pub fn sort_rank(&self) -> u8 {
        match self {
            DerivedStatus::Atrasado => 1,
            DerivedStatus::Pendente => 2,
            DerivedStatus::Pago => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DerivedStatus::Atrasado => "atrasado",
            DerivedStatus::Pendente => "pendente",
            DerivedStatus::Pago => "pago",
        }
    }
}

/// Result of deriving an installment's display status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Derivation {
    pub status: DerivedStatus,
    /// Whole days past the due date; set only when `Atrasado`
    pub days_late: Option<i64>,
}

/// Derives the display status of an installment.
///
/// Both dates are local calendar dates, so the comparison is strictly
/// date-only. A paid installment is `Pago` whatever its due date; an unpaid
/// one is `Atrasado` once `due_date < today`.
pub fn derive_status(status: InstallmentStatus, due_date: NaiveDate, today: NaiveDate) -> Derivation {
    match status {
        InstallmentStatus::Pago => Derivation {
            status: DerivedStatus::Pago,
            days_late: None,
        },
        InstallmentStatus::Pendente if due_date < today => Derivation {
            status: DerivedStatus::Atrasado,
            days_late: Some(days_between(due_date, today)),
        },
        InstallmentStatus::Pendente => Derivation {
            status: DerivedStatus::Pendente,
            days_late: None,
        },
    }
}

/// One payable slice of a sale made on credit terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub id: InstallmentId,
    pub sale_id: SaleId,
    pub client_id: ClientId,
    pub client_name: String,
    /// 1-based position within the sale's plan
    pub installment_number: u32,
    pub amount: Money,
    pub due_date: NaiveDate,
    pub status: InstallmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for Installment {
    type Id = InstallmentId;
    const ENTITY_NAME: &'static str = "Parcela";

    fn id(&self) -> InstallmentId {
        self.id
    }
}

impl Installment {
    /// Creates a pending installment
    pub fn new(
        sale_id: SaleId,
        client_id: ClientId,
        client_name: impl Into<String>,
        installment_number: u32,
        amount: Money,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id: InstallmentId::new_v7(),
            sale_id,
            client_id,
            client_name: client_name.into(),
            installment_number,
            amount,
            due_date,
            status: InstallmentStatus::Pendente,
            paid_date: None,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Checks the record-level invariants
    pub fn validate(&self) -> Result<(), BillingError> {
        if self.status == InstallmentStatus::Pago && self.paid_date.is_none() {
            return Err(BillingError::InvariantViolation(format!(
                "installment {} is pago without a paid date",
                self.id
            )));
        }
        if self.installment_number == 0 {
            return Err(BillingError::InvariantViolation(
                "installment numbers start at 1".to_string(),
            ));
        }
        if !self.amount.is_positive() {
            return Err(BillingError::InvariantViolation(format!(
                "installment {} has non-positive amount {}",
                self.id, self.amount
            )));
        }
        Ok(())
    }

    pub fn derive(&self, today: NaiveDate) -> Derivation {
        derive_status(self.status, self.due_date, today)
    }

    /// Marks the installment as paid on `paid_date`.
    ///
    /// This is the only mutation an installment ever sees.
    pub fn confirm_payment(&mut self, paid_date: NaiveDate) -> Result<(), BillingError> {
        if self.status == InstallmentStatus::Pago {
            return Err(BillingError::InstallmentAlreadyPaid(self.id.to_string()));
        }
        self.status = InstallmentStatus::Pago;
        self.paid_date = Some(paid_date);
        Ok(())
    }

    /// Pairs the record with its derived status for display
    pub fn view(self, today: NaiveDate) -> InstallmentView {
        let derivation = self.derive(today);
        InstallmentView {
            installment: self,
            derived_status: derivation.status,
            days_late: derivation.days_late,
        }
    }
}

/// An installment as shown in lists: the record plus its derived status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentView {
    #[serde(flatten)]
    pub installment: Installment,
    pub derived_status: DerivedStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_late: Option<i64>,
}

impl InstallmentView {
    fn display_order(&self, other: &Self) -> Ordering {
        self.derived_status
            .sort_rank()
            .cmp(&other.derived_status.sort_rank())
            .then_with(|| self.installment.due_date.cmp(&other.installment.due_date))
    }
}

/// Sorts views late first, then pending, then paid; ascending due date
/// within each group. The sort is stable.
pub fn sort_for_display(views: &mut [InstallmentView]) {
    views.sort_by(|a, b| a.display_order(b));
}

/// Derives and sorts a batch of installments
pub fn display_list(installments: Vec<Installment>, today: NaiveDate) -> Vec<InstallmentView> {
    let mut views: Vec<_> = installments.into_iter().map(|i| i.view(today)).collect();
    sort_for_display(&mut views);
    views
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn installment(due: NaiveDate) -> Installment {
        Installment::new(SaleId::new(), ClientId::new(), "Maria", 1, Money::brl(dec!(100)), due)
    }

    #[test]
    fn test_late_installment_counts_days() {
        let d = derive_status(InstallmentStatus::Pendente, date(2024, 3, 1), date(2024, 3, 10));
        assert_eq!(d.status, DerivedStatus::Atrasado);
        assert_eq!(d.days_late, Some(9));
    }

    #[test]
    fn test_due_today_is_still_pending() {
        let d = derive_status(InstallmentStatus::Pendente, date(2024, 3, 10), date(2024, 3, 10));
        assert_eq!(d.status, DerivedStatus::Pendente);
        assert_eq!(d.days_late, None);
    }

    #[test]
    fn test_paid_ignores_due_date() {
        let d = derive_status(InstallmentStatus::Pago, date(2020, 1, 1), date(2024, 3, 10));
        assert_eq!(d.status, DerivedStatus::Pago);
        assert_eq!(d.days_late, None);
    }

    #[test]
    fn test_confirm_payment_once() {
        let mut parcela = installment(date(2024, 3, 1));
        parcela.confirm_payment(date(2024, 3, 5)).unwrap();
        assert_eq!(parcela.status, InstallmentStatus::Pago);
        assert_eq!(parcela.paid_date, Some(date(2024, 3, 5)));

        let again = parcela.confirm_payment(date(2024, 3, 6));
        assert!(matches!(again, Err(BillingError::InstallmentAlreadyPaid(_))));
        assert_eq!(parcela.paid_date, Some(date(2024, 3, 5)));
    }

    #[test]
    fn test_validate_rejects_paid_without_date() {
        let mut parcela = installment(date(2024, 3, 1));
        parcela.status = InstallmentStatus::Pago;
        assert!(matches!(parcela.validate(), Err(BillingError::InvariantViolation(_))));
    }

    #[test]
    fn test_view_serializes_flat_camel_case() {
        let view = installment(date(2024, 3, 1)).view(date(2024, 3, 10));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["derivedStatus"], "atrasado");
        assert_eq!(json["daysLate"], 9);
        assert_eq!(json["dueDate"], "2024-03-01");
        assert_eq!(json["status"], "pendente");
        assert!(json.get("paidDate").is_none());
    }
}
