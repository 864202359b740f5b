//! Subscription domain errors

use thiserror::Error;

use core_kernel::{MoneyError, PortError};

/// Errors that can occur in the subscription domain
#[derive(Debug, Error)]
pub enum SubscriptionError {
    /// Approval and rejection only apply to payments awaiting verification
    #[error("Payment {id} is {status}, not awaiting verification")]
    NotAwaitingVerification { id: String, status: String },

    /// A live payment already exists for the company and month
    #[error("A payment for {reference_month} is already {status} for company {company}")]
    DuplicatePayment {
        company: String,
        reference_month: String,
        status: String,
    },

    #[error("Rejection reason is required")]
    MissingRejectionReason,

    /// The submitted payment is malformed
    #[error("Invalid payment: {0}")]
    InvalidPayment(String),

    /// The acting user lacks permission
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Repository failure
    #[error(transparent)]
    Port(#[from] PortError),
}
