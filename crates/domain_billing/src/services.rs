//! Billing services
//!
//! Orchestrate the installment and document rules over their repositories.
//! Each call is a single request/response; nothing is retried and a failed
//! write is reported to the caller as-is.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument};

use core_kernel::{Actor, ClientId, Currency, DocumentId, EntityFilter, InstallmentId, Money, Repository};

use crate::document::{DocumentView, FiscalDocument};
use crate::error::BillingError;
use crate::installment::{display_list, Installment, InstallmentView};
use crate::plan::{InstallmentPlan, Sale};
use crate::report::ReceivablesReport;

/// Service for sale installments
#[derive(Clone)]
pub struct InstallmentService {
    repo: Arc<dyn Repository<Installment>>,
}

impl InstallmentService {
    pub fn new(repo: Arc<dyn Repository<Installment>>) -> Self {
        Self { repo }
    }

    /// Generates and stores the installment batch for a sale
    #[instrument(skip(self, sale), fields(sale = %sale.id, count = sale.installment_count))]
    pub async fn record_plan(&self, sale: &Sale) -> Result<Vec<Installment>, BillingError> {
        let plan = InstallmentPlan::for_sale(sale)?;
        let stored = self.repo.create_many(plan.installments).await?;
        info!(installments = stored.len(), "installment plan recorded");
        Ok(stored)
    }

    /// Lists installments with derived status, late first.
    ///
    /// When `client` is given only that client's installments are listed.
    pub async fn list(
        &self,
        client: Option<ClientId>,
        today: NaiveDate,
    ) -> Result<Vec<InstallmentView>, BillingError> {
        let installments = match client {
            Some(client_id) => {
                let filter = EntityFilter::new().eq("clientId", client_id.as_uuid().to_string());
                self.repo.filter(&filter).await?
            }
            None => self.repo.list().await?,
        };
        Ok(display_list(installments, today))
    }

    /// Confirms payment of an installment
    #[instrument(skip(self))]
    pub async fn confirm_payment(
        &self,
        id: InstallmentId,
        paid_date: NaiveDate,
    ) -> Result<Installment, BillingError> {
        let mut installment = self.repo.get(id).await?;
        installment.confirm_payment(paid_date)?;
        installment.validate()?;
        let updated = self.repo.update(installment).await?;
        info!(installment = %updated.id, number = updated.installment_number, "installment paid");
        Ok(updated)
    }

    pub async fn receivables_report(
        &self,
        today: NaiveDate,
        currency: Currency,
    ) -> Result<ReceivablesReport, BillingError> {
        let installments = self.repo.list().await?;
        ReceivablesReport::build(&installments, today, currency)
    }
}

/// Service for fiscal documents
#[derive(Clone)]
pub struct DocumentService {
    repo: Arc<dyn Repository<FiscalDocument>>,
}

impl DocumentService {
    pub fn new(repo: Arc<dyn Repository<FiscalDocument>>) -> Self {
        Self { repo }
    }

    /// Stores a newly issued document
    pub async fn issue(&self, document: FiscalDocument) -> Result<FiscalDocument, BillingError> {
        document.validate()?;
        let stored = self.repo.create(document).await?;
        info!(document = %stored.id, kind = %stored.kind, number = %stored.number, "document issued");
        Ok(stored)
    }

    pub async fn get(&self, id: DocumentId, today: NaiveDate) -> Result<DocumentView, BillingError> {
        self.repo.get(id).await?.view(today)
    }

    #[instrument(skip(self, actor, reason), fields(actor = %actor.user_id))]
    pub async fn cancel(
        &self,
        id: DocumentId,
        actor: &Actor,
        reason: &str,
        date: NaiveDate,
    ) -> Result<FiscalDocument, BillingError> {
        let mut document = self.repo.get(id).await?;
        document.cancel(actor, reason, date)?;
        Ok(self.repo.update(document).await?)
    }

    #[instrument(skip(self))]
    pub async fn pay(
        &self,
        id: DocumentId,
        paid_date: NaiveDate,
        paid_amount: Option<Money>,
    ) -> Result<FiscalDocument, BillingError> {
        let mut document = self.repo.get(id).await?;
        document.pay(paid_date, paid_amount)?;
        document.validate()?;
        let updated = self.repo.update(document).await?;
        info!(document = %updated.id, number = %updated.number, "boleto paid");
        Ok(updated)
    }
}
