//! Fiscal documents: notas de serviço, recibos and boletos
//!
//! Lifecycle:
//!
//! ```text
//! nota/recibo:  ativo ──cancel──▶ cancelado
//! boleto:       pendente ──cancel──▶ cancelado
//!               pendente ──pay─────▶ pago
//! ```
//!
//! `vencido` is never stored. A boleto shows as vencido while it is
//! pendente and its due date has passed, and it can still be paid or
//! cancelled from there. Cancelled and paid are terminal.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::info;

use core_kernel::{days_between, Actor, ClientId, DocumentId, Entity, Money, Rate};

use crate::error::BillingError;

/// Upper bound on boleto penalty and monthly interest rates (100%)
pub const MAX_CHARGE_RATE: Decimal = dec!(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    NotaServico,
    Recibo,
    Boleto,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::NotaServico => "nota_servico",
            DocumentKind::Recibo => "recibo",
            DocumentKind::Boleto => "boleto",
        }
    }

    /// Status a freshly issued document starts in
    pub fn initial_status(&self) -> DocumentStatus {
        match self {
            DocumentKind::NotaServico | DocumentKind::Recibo => DocumentStatus::Ativo,
            DocumentKind::Boleto => DocumentStatus::Pendente,
        }
    }

    fn allows(&self, status: DocumentStatus) -> bool {
        match self {
            DocumentKind::NotaServico | DocumentKind::Recibo => {
                matches!(status, DocumentStatus::Ativo | DocumentStatus::Cancelado)
            }
            DocumentKind::Boleto => matches!(
                status,
                DocumentStatus::Pendente | DocumentStatus::Pago | DocumentStatus::Cancelado
            ),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored document status
///
/// Notas use feminine forms ("ativa", "cancelada"); both spellings are
/// accepted and the masculine form is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentStatus {
    #[serde(rename = "ativo", alias = "ativa")]
    Ativo,
    #[serde(rename = "pendente")]
    Pendente,
    #[serde(rename = "pago", alias = "paga")]
    Pago,
    #[serde(rename = "cancelado", alias = "cancelada")]
    Cancelado,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Ativo => "ativo",
            DocumentStatus::Pendente => "pendente",
            DocumentStatus::Pago => "pago",
            DocumentStatus::Cancelado => "cancelado",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status shown to users, including the derived `vencido`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStatus {
    Ativo,
    Pendente,
    Vencido,
    Pago,
    Cancelado,
}

/// Payment terms carried only by boletos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoletoTerms {
    pub due_date: NaiveDate,
    /// One-off penalty (multa) once the boleto is late
    #[serde(default)]
    pub penalty_rate: Rate,
    /// Simple interest (juros) per month late, charged pro rata per day
    #[serde(default)]
    pub monthly_interest_rate: Rate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_amount: Option<Money>,
}

impl BoletoTerms {
    pub fn new(due_date: NaiveDate) -> Self {
        Self {
            due_date,
            penalty_rate: Rate::zero(),
            monthly_interest_rate: Rate::zero(),
            paid_date: None,
            paid_amount: None,
        }
    }

    pub fn with_charges(mut self, penalty_rate: Rate, monthly_interest_rate: Rate) -> Self {
        self.penalty_rate = penalty_rate;
        self.monthly_interest_rate = monthly_interest_rate;
        self
    }
}

/// A nota de serviço, recibo or boleto
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalDocument {
    pub id: DocumentId,
    pub kind: DocumentKind,
    pub number: String,
    pub client_id: ClientId,
    pub client_name: String,
    pub amount: Money,
    pub issue_date: NaiveDate,
    pub status: DocumentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boleto: Option<BoletoTerms>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_date: Option<NaiveDate>,
}

impl Entity for FiscalDocument {
    type Id = DocumentId;
    const ENTITY_NAME: &'static str = "DocumentoFiscal";

    fn id(&self) -> DocumentId {
        self.id
    }
}

impl FiscalDocument {
    fn issue(
        kind: DocumentKind,
        number: impl Into<String>,
        client_id: ClientId,
        client_name: impl Into<String>,
        amount: Money,
        issue_date: NaiveDate,
        boleto: Option<BoletoTerms>,
    ) -> Self {
        Self {
            id: DocumentId::new_v7(),
            kind,
            number: number.into(),
            client_id,
            client_name: client_name.into(),
            amount,
            issue_date,
            status: kind.initial_status(),
            boleto,
            cancellation_reason: None,
            cancellation_date: None,
        }
    }

    pub fn nota_servico(
        number: impl Into<String>,
        client_id: ClientId,
        client_name: impl Into<String>,
        amount: Money,
        issue_date: NaiveDate,
    ) -> Self {
        Self::issue(DocumentKind::NotaServico, number, client_id, client_name, amount, issue_date, None)
    }

    pub fn recibo(
        number: impl Into<String>,
        client_id: ClientId,
        client_name: impl Into<String>,
        amount: Money,
        issue_date: NaiveDate,
    ) -> Self {
        Self::issue(DocumentKind::Recibo, number, client_id, client_name, amount, issue_date, None)
    }

    pub fn boleto(
        number: impl Into<String>,
        client_id: ClientId,
        client_name: impl Into<String>,
        amount: Money,
        issue_date: NaiveDate,
        terms: BoletoTerms,
    ) -> Self {
        Self::issue(DocumentKind::Boleto, number, client_id, client_name, amount, issue_date, Some(terms))
    }

    /// Checks kind/status consistency and the cancellation and payment
    /// record invariants
    pub fn validate(&self) -> Result<(), BillingError> {
        let invalid = |msg: String| Err(BillingError::InvariantViolation(msg));

        if self.number.trim().is_empty() {
            return invalid("document number is required".to_string());
        }
        if !self.amount.is_positive() {
            return invalid(format!("document {} has non-positive amount", self.number));
        }
        if !self.kind.allows(self.status) {
            return invalid(format!("{} cannot be in status {}", self.kind, self.status));
        }
        match (self.kind, &self.boleto) {
            (DocumentKind::Boleto, None) => return invalid("boleto without payment terms".to_string()),
            (DocumentKind::NotaServico | DocumentKind::Recibo, Some(_)) => {
                return invalid(format!("{} cannot carry boleto terms", self.kind))
            }
            _ => {}
        }
        if let Some(terms) = &self.boleto {
            for rate in [terms.penalty_rate, terms.monthly_interest_rate] {
                if rate.as_decimal().is_sign_negative() || rate.as_decimal() > MAX_CHARGE_RATE {
                    return invalid(format!("boleto {} charge rate {} outside 0%..100%", self.number, rate));
                }
            }
        }
        if self.status == DocumentStatus::Cancelado && self.cancellation_reason.is_none() {
            return invalid(format!("document {} cancelled without a reason", self.number));
        }
        if self.status == DocumentStatus::Pago
            && self.boleto.as_ref().and_then(|b| b.paid_date).is_none()
        {
            return invalid(format!("boleto {} is pago without a paid date", self.number));
        }
        Ok(())
    }

    /// True while a boleto is unpaid past its due date
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == DocumentStatus::Pendente
            && self.boleto.as_ref().is_some_and(|b| b.due_date < today)
    }

    pub fn display_status(&self, today: NaiveDate) -> DisplayStatus {
        match self.status {
            DocumentStatus::Ativo => DisplayStatus::Ativo,
            DocumentStatus::Pendente if self.is_overdue(today) => DisplayStatus::Vencido,
            DocumentStatus::Pendente => DisplayStatus::Pendente,
            DocumentStatus::Pago => DisplayStatus::Pago,
            DocumentStatus::Cancelado => DisplayStatus::Cancelado,
        }
    }

    /// Amount a boleto is worth on `date`, including late charges.
    ///
    /// Late charges are the penalty rate applied once plus the monthly
    /// interest rate pro rata over 30-day months, rounded to the cent.
    /// Other documents are always worth their face amount.
    /// Fails only when the charges overflow the decimal range.
    pub fn amount_due_on(&self, date: NaiveDate) -> Result<Money, BillingError> {
        let Some(terms) = &self.boleto else {
            return Ok(self.amount);
        };
        if date <= terms.due_date {
            return Ok(self.amount);
        }

        let days_late = Decimal::from(days_between(terms.due_date, date));
        let penalty = terms.penalty_rate.apply(&self.amount)?;
        let interest = terms
            .monthly_interest_rate
            .apply(&self.amount)?
            .multiply(days_late / dec!(30))?;

        Ok(self
            .amount
            .checked_add(&penalty)?
            .checked_add(&interest)?
            .round_to_currency())
    }

    /// Cancels the document. Admin-only, requires a reason, irreversible.
    pub fn cancel(&mut self, actor: &Actor, reason: &str, date: NaiveDate) -> Result<(), BillingError> {
        if !actor.is_admin() {
            return Err(BillingError::Forbidden("only administrators can cancel documents".to_string()));
        }
        match self.status {
            DocumentStatus::Cancelado => {
                return Err(BillingError::DocumentAlreadyCancelled(self.number.clone()))
            }
            DocumentStatus::Pago => {
                return Err(BillingError::InvalidStatusTransition {
                    from: self.status.to_string(),
                    to: DocumentStatus::Cancelado.to_string(),
                })
            }
            DocumentStatus::Ativo | DocumentStatus::Pendente => {}
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(BillingError::MissingCancellationReason);
        }

        self.status = DocumentStatus::Cancelado;
        self.cancellation_reason = Some(reason.to_string());
        self.cancellation_date = Some(date);

        info!(
            document = %self.id,
            kind = %self.kind,
            number = %self.number,
            cancelled_by = %actor.user_id,
            "document cancelled"
        );
        Ok(())
    }

    /// Records payment of a boleto.
    ///
    /// When `paid_amount` is omitted the amount due on `paid_date`
    /// (including late charges) is recorded.
    pub fn pay(&mut self, paid_date: NaiveDate, paid_amount: Option<Money>) -> Result<(), BillingError> {
        if self.kind != DocumentKind::Boleto {
            return Err(BillingError::NotPayable(self.kind.to_string()));
        }
        match self.status {
            DocumentStatus::Pago => return Err(BillingError::DocumentAlreadyPaid(self.number.clone())),
            DocumentStatus::Cancelado => {
                return Err(BillingError::DocumentAlreadyCancelled(self.number.clone()))
            }
            DocumentStatus::Pendente => {}
            DocumentStatus::Ativo => {
                return Err(BillingError::InvalidStatusTransition {
                    from: self.status.to_string(),
                    to: DocumentStatus::Pago.to_string(),
                })
            }
        }
        if let Some(amount) = paid_amount {
            if !amount.is_positive() {
                return Err(BillingError::InvariantViolation("paid amount must be positive".to_string()));
            }
        }

        let due = self.amount_due_on(paid_date)?;
        let terms = self
            .boleto
            .as_mut()
            .ok_or_else(|| BillingError::InvariantViolation("boleto without payment terms".to_string()))?;
        terms.paid_date = Some(paid_date);
        terms.paid_amount = Some(paid_amount.unwrap_or(due));
        self.status = DocumentStatus::Pago;
        Ok(())
    }

    pub fn view(self, today: NaiveDate) -> Result<DocumentView, BillingError> {
        Ok(DocumentView {
            display_status: self.display_status(today),
            amount_due: self.amount_due_on(today)?,
            document: self,
        })
    }
}

/// A document with its display status and current amount due
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    #[serde(flatten)]
    pub document: FiscalDocument,
    pub display_status: DisplayStatus,
    pub amount_due: Money,
}
