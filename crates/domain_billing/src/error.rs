//! Billing domain errors

use thiserror::Error;

use core_kernel::{MoneyError, PortError};

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// The installment has already been paid
    #[error("Installment already paid: {0}")]
    InstallmentAlreadyPaid(String),

    /// The document has already been cancelled
    #[error("Document already cancelled: {0}")]
    DocumentAlreadyCancelled(String),

    /// The document has already been paid
    #[error("Document already paid: {0}")]
    DocumentAlreadyPaid(String),

    /// Transition not permitted by the document lifecycle
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// Only boletos can be paid
    #[error("Document kind {0} cannot be paid")]
    NotPayable(String),

    /// Cancellation requires a non-empty reason
    #[error("Cancellation reason is required")]
    MissingCancellationReason,

    /// The acting user lacks permission
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A record violates a data-model invariant
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    /// Installment plan parameters are invalid
    #[error("Invalid installment plan: {0}")]
    InvalidPlan(String),

    /// Money arithmetic failed
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Repository failure
    #[error(transparent)]
    Port(#[from] PortError),
}
