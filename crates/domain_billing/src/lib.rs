//! Billing Domain - Installments and Fiscal Documents
//!
//! Receivables of a small business: sales on credit terms split into
//! monthly installments (parcelas), and the fiscal documents issued to
//! clients (nota de servico, recibo, boleto).
//!
//! # Derived Status
//!
//! Installments store only `pendente` or `pago`. Lateness is derived from
//! the due date and the local "today" whenever a list or report is built:
//! - **atrasado**: unpaid and due before today
//! - **pendente**: unpaid and due today or later
//! - **pago**: paid, whatever the due date
//!
//! # Document Lifecycle
//!
//! ```text
//! nota_servico / recibo:  ativo ──cancel──► cancelado
//! boleto:                 pendente ──pay──► pago
//!                              └──cancel──► cancelado
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{InstallmentPlan, Sale};
//!
//! let plan = InstallmentPlan::for_sale(&sale)?;
//! let views = domain_billing::display_list(plan.installments, today);
//! ```

pub mod document;
pub mod error;
pub mod installment;
pub mod plan;
pub mod report;
pub mod services;

pub use document::{BoletoTerms, DisplayStatus, DocumentKind, DocumentStatus, DocumentView, FiscalDocument};
pub use error::BillingError;
pub use installment::{
    derive_status, display_list, sort_for_display, Derivation, DerivedStatus, Installment,
    InstallmentStatus, InstallmentView,
};
pub use plan::{InstallmentPlan, Sale, MAX_INSTALLMENTS};
pub use report::{ClientReceivables, ReceivablesReport, StatusTotals};
pub use services::{DocumentService, InstallmentService};
