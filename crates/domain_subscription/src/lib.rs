//! Subscription Domain - Company Access and Monthly Fees
//!
//! Each company pays a monthly fee (mensalidade) outside the system and
//! uploads the receipt for an admin to verify. The access gate turns the
//! state of the current month into an advisory banner:
//!
//! | Condition | Banner |
//! |---|---|
//! | current month approved or under review | none |
//! | within 4 days of month end | approaching due date |
//! | day 1 to 5 | grace period, with days remaining |
//! | otherwise | overdue |
//!
//! The hard block is separate: an admin sets the company's user to
//! `inativo`. Approving a payment sets it back to `ativo`.

pub mod error;
pub mod gate;
pub mod payment;
pub mod services;
pub mod user;

pub use error::SubscriptionError;
pub use gate::{AccessDecision, Banner, GatePolicy};
pub use payment::{PaymentStatus, SubscriptionPayment};
pub use services::{PaymentSubmission, SubscriptionService};
pub use user::{User, UserStatus};
