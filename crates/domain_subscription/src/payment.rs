//! Monthly subscription fee payments (mensalidades)
//!
//! A company pays the fee outside the system and uploads the receipt. The
//! record then waits for an admin to verify it:
//!
//! ```text
//! aguardando_verificacao ──approve──► aprovado
//!            └───────────reject────► recusado
//! ```
//!
//! Both verdicts are final. A rejected month can be submitted again.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{Actor, CompanyId, Entity, Money, PaymentId, ReferenceMonth, UserId};

use crate::error::SubscriptionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    AguardandoVerificacao,
    Aprovado,
    Recusado,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::AguardandoVerificacao => "aguardando_verificacao",
            PaymentStatus::Aprovado => "aprovado",
            PaymentStatus::Recusado => "recusado",
        }
    }

    /// Whether a payment in this status settles its reference month for the
    /// access gate. A payment still under review counts.
    pub fn settles_month(&self) -> bool {
        matches!(self, PaymentStatus::AguardandoVerificacao | PaymentStatus::Aprovado)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A company's payment of one month's fee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPayment {
    pub id: PaymentId,
    pub company_id: CompanyId,
    pub company_name: String,
    pub amount: Money,
    pub reference_month: ReferenceMonth,
    pub due_date: NaiveDate,
    pub status: PaymentStatus,
    pub receipt_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_by: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl Entity for SubscriptionPayment {
    type Id = PaymentId;
    const ENTITY_NAME: &'static str = "Pagamento";

    fn id(&self) -> PaymentId {
        self.id
    }
}

impl SubscriptionPayment {
    /// Records an uploaded receipt, awaiting verification
    pub fn submit(
        company_id: CompanyId,
        company_name: impl Into<String>,
        amount: Money,
        reference_month: ReferenceMonth,
        receipt_url: impl Into<String>,
        due_date: NaiveDate,
    ) -> Result<Self, SubscriptionError> {
        let receipt_url = receipt_url.into();
        if receipt_url.trim().is_empty() {
            return Err(SubscriptionError::InvalidPayment("receipt is required".to_string()));
        }
        if !amount.is_positive() {
            return Err(SubscriptionError::InvalidPayment(format!(
                "amount must be positive, got {}",
                amount
            )));
        }

        Ok(Self {
            id: PaymentId::new_v7(),
            company_id,
            company_name: company_name.into(),
            amount,
            reference_month,
            due_date,
            status: PaymentStatus::AguardandoVerificacao,
            receipt_url,
            verified_by: None,
            verification_date: None,
            rejection_reason: None,
        })
    }

    pub fn is_awaiting_verification(&self) -> bool {
        self.status == PaymentStatus::AguardandoVerificacao
    }

    fn ensure_verifiable(&self, actor: &Actor) -> Result<(), SubscriptionError> {
        if !actor.is_admin() {
            return Err(SubscriptionError::Forbidden(
                "only admins can verify payments".to_string(),
            ));
        }
        if !self.is_awaiting_verification() {
            return Err(SubscriptionError::NotAwaitingVerification {
                id: self.id.to_string(),
                status: self.status.to_string(),
            });
        }
        Ok(())
    }

    /// Accepts the receipt
    pub fn approve(&mut self, actor: &Actor, date: NaiveDate) -> Result<(), SubscriptionError> {
        self.ensure_verifiable(actor)?;
        self.status = PaymentStatus::Aprovado;
        self.verified_by = Some(actor.user_id);
        self.verification_date = Some(date);
        Ok(())
    }

    /// Refuses the receipt; the company can submit the month again
    pub fn reject(&mut self, actor: &Actor, reason: &str, date: NaiveDate) -> Result<(), SubscriptionError> {
        self.ensure_verifiable(actor)?;
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(SubscriptionError::MissingRejectionReason);
        }
        self.status = PaymentStatus::Recusado;
        self.verified_by = Some(actor.user_id);
        self.verification_date = Some(date);
        self.rejection_reason = Some(reason.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn payment() -> SubscriptionPayment {
        SubscriptionPayment::submit(
            CompanyId::new(),
            "Padaria Estrela",
            Money::brl(dec!(89.90)),
            ReferenceMonth::new(3, 2024).unwrap(),
            "https://files.example/recibo.pdf",
            date(2024, 3, 31),
        )
        .unwrap()
    }

    #[test]
    fn test_submit_awaits_verification() {
        let p = payment();
        assert_eq!(p.status, PaymentStatus::AguardandoVerificacao);
        assert!(p.status.settles_month());
        assert!(p.verified_by.is_none());
    }

    #[test]
    fn test_submit_requires_receipt() {
        let result = SubscriptionPayment::submit(
            CompanyId::new(),
            "ACME",
            Money::brl(dec!(10)),
            ReferenceMonth::new(3, 2024).unwrap(),
            "  ",
            date(2024, 3, 31),
        );
        assert!(matches!(result, Err(SubscriptionError::InvalidPayment(_))));
    }

    #[test]
    fn test_approve_records_verifier() {
        let admin = Actor::admin(UserId::new());
        let mut p = payment();
        p.approve(&admin, date(2024, 3, 12)).unwrap();
        assert_eq!(p.status, PaymentStatus::Aprovado);
        assert_eq!(p.verified_by, Some(admin.user_id));
        assert_eq!(p.verification_date, Some(date(2024, 3, 12)));
    }

    #[test]
    fn test_verdict_is_final() {
        let admin = Actor::admin(UserId::new());
        let mut p = payment();
        p.reject(&admin, "comprovante ilegível", date(2024, 3, 12)).unwrap();
        assert!(!p.status.settles_month());

        let again = p.approve(&admin, date(2024, 3, 13));
        assert!(matches!(again, Err(SubscriptionError::NotAwaitingVerification { .. })));
    }

    #[test]
    fn test_reject_requires_reason_and_admin() {
        let mut p = payment();
        let user = Actor::new(UserId::new(), core_kernel::Role::User);
        assert!(matches!(
            p.approve(&user, date(2024, 3, 12)),
            Err(SubscriptionError::Forbidden(_))
        ));

        let admin = Actor::admin(UserId::new());
        assert!(matches!(
            p.reject(&admin, "", date(2024, 3, 12)),
            Err(SubscriptionError::MissingRejectionReason)
        ));
        assert!(p.is_awaiting_verification());
    }

    #[test]
    fn test_serialized_literals() {
        let json = serde_json::to_value(payment()).unwrap();
        assert_eq!(json["status"], "aguardando_verificacao");
        assert_eq!(json["referenceMonth"], "03/2024");
        assert_eq!(json["receiptUrl"], "https://files.example/recibo.pdf");
    }
}
