//! Subscription service
//!
//! Receipt submission, admin verification with its cascade to the
//! company's user, the manual block switch and gate evaluation.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use core_kernel::{
    Actor, CompanyId, EntityFilter, Money, PaymentId, ReferenceMonth, Repository, UserId,
};

use crate::error::SubscriptionError;
use crate::gate::{AccessDecision, GatePolicy};
use crate::payment::{PaymentStatus, SubscriptionPayment};
use crate::user::{User, UserStatus};

/// A receipt upload for one month's fee
#[derive(Debug, Clone)]
pub struct PaymentSubmission {
    pub amount: Money,
    pub reference_month: ReferenceMonth,
    pub receipt_url: String,
    pub due_date: NaiveDate,
}

#[derive(Clone)]
pub struct SubscriptionService {
    users: Arc<dyn Repository<User>>,
    payments: Arc<dyn Repository<SubscriptionPayment>>,
    policy: GatePolicy,
}

impl SubscriptionService {
    pub fn new(
        users: Arc<dyn Repository<User>>,
        payments: Arc<dyn Repository<SubscriptionPayment>>,
        policy: GatePolicy,
    ) -> Self {
        Self {
            users,
            payments,
            policy,
        }
    }

    pub fn policy(&self) -> &GatePolicy {
        &self.policy
    }

    pub async fn user(&self, id: UserId) -> Result<User, SubscriptionError> {
        Ok(self.users.get(id).await?)
    }

    async fn company_payments(
        &self,
        company_id: CompanyId,
        reference_month: Option<ReferenceMonth>,
    ) -> Result<Vec<SubscriptionPayment>, SubscriptionError> {
        let mut filter = EntityFilter::new().eq("companyId", company_id.as_uuid().to_string());
        if let Some(month) = reference_month {
            filter = filter.eq("referenceMonth", month.to_string());
        }
        Ok(self.payments.filter(&filter).await?)
    }

    /// Records a receipt upload for the acting user's company.
    ///
    /// Refused while the same month already has a payment under review or
    /// approved.
    #[instrument(skip(self, submission), fields(user = %actor.user_id, month = %submission.reference_month))]
    pub async fn submit_payment(
        &self,
        actor: &Actor,
        submission: PaymentSubmission,
    ) -> Result<SubscriptionPayment, SubscriptionError> {
        let user = self.users.get(actor.user_id).await?;

        let existing = self
            .company_payments(user.company_id, Some(submission.reference_month))
            .await?;
        if let Some(live) = existing.iter().find(|p| p.status.settles_month()) {
            return Err(SubscriptionError::DuplicatePayment {
                company: user.company_id.to_string(),
                reference_month: submission.reference_month.to_string(),
                status: live.status.to_string(),
            });
        }

        let payment = SubscriptionPayment::submit(
            user.company_id,
            user.company_name.clone(),
            submission.amount,
            submission.reference_month,
            submission.receipt_url,
            submission.due_date,
        )?;
        let stored = self.payments.create(payment).await?;
        info!(payment = %stored.id, company = %stored.company_name, "subscription receipt submitted");
        Ok(stored)
    }

    /// Approves a payment and reactivates the company's users
    #[instrument(skip(self, admin), fields(admin = %admin.user_id))]
    pub async fn approve_payment(
        &self,
        id: PaymentId,
        admin: &Actor,
        date: NaiveDate,
    ) -> Result<SubscriptionPayment, SubscriptionError> {
        let mut payment = self.payments.get(id).await?;
        payment.approve(admin, date)?;
        let payment = self.payments.update(payment).await?;

        let filter = EntityFilter::new().eq("companyId", payment.company_id.as_uuid().to_string());
        let users = self.users.filter(&filter).await?;
        if users.is_empty() {
            warn!(company = %payment.company_id, "approved payment has no user to activate");
        }
        for mut user in users {
            if user.status != UserStatus::Ativo {
                user.status = UserStatus::Ativo;
                self.users.update(user).await?;
            }
        }

        info!(payment = %payment.id, month = %payment.reference_month, "subscription payment approved");
        Ok(payment)
    }

    /// Rejects a payment; the user's status is left as it is
    #[instrument(skip(self, admin, reason), fields(admin = %admin.user_id))]
    pub async fn reject_payment(
        &self,
        id: PaymentId,
        admin: &Actor,
        reason: &str,
        date: NaiveDate,
    ) -> Result<SubscriptionPayment, SubscriptionError> {
        let mut payment = self.payments.get(id).await?;
        payment.reject(admin, reason, date)?;
        let payment = self.payments.update(payment).await?;
        info!(payment = %payment.id, month = %payment.reference_month, "subscription payment rejected");
        Ok(payment)
    }

    /// Creates a company user account
    #[instrument(skip(self, admin, user), fields(admin = %admin.user_id, email = %user.email))]
    pub async fn register_user(&self, admin: &Actor, user: User) -> Result<User, SubscriptionError> {
        if !admin.is_admin() {
            return Err(SubscriptionError::Forbidden(
                "only admins can register users".to_string(),
            ));
        }
        let user = self.users.create(user).await?;
        info!(user = %user.id, company = %user.company_name, "user registered");
        Ok(user)
    }

    async fn set_user_status(
        &self,
        id: UserId,
        admin: &Actor,
        status: UserStatus,
    ) -> Result<User, SubscriptionError> {
        if !admin.is_admin() {
            return Err(SubscriptionError::Forbidden(
                "only admins can change a user's access".to_string(),
            ));
        }
        let mut user = self.users.get(id).await?;
        user.status = status;
        let user = self.users.update(user).await?;
        info!(user = %user.id, status = %user.status, admin = %admin.user_id, "user access changed");
        Ok(user)
    }

    /// Hard-blocks a company's access
    pub async fn block_user(&self, id: UserId, admin: &Actor) -> Result<User, SubscriptionError> {
        self.set_user_status(id, admin, UserStatus::Inativo).await
    }

    pub async fn unblock_user(&self, id: UserId, admin: &Actor) -> Result<User, SubscriptionError> {
        self.set_user_status(id, admin, UserStatus::Ativo).await
    }

    /// Payments still waiting for an admin, oldest first
    pub async fn pending_verifications(&self) -> Result<Vec<SubscriptionPayment>, SubscriptionError> {
        let filter = EntityFilter::new().eq("status", PaymentStatus::AguardandoVerificacao.as_str());
        Ok(self.payments.filter(&filter).await?)
    }

    pub async fn pending_verification_count(&self) -> Result<usize, SubscriptionError> {
        Ok(self.pending_verifications().await?.len())
    }

    /// Evaluates the access gate for the acting user on `today`.
    ///
    /// Admins skip the lookup entirely; they may not have a user record.
    pub async fn evaluate_gate(
        &self,
        actor: &Actor,
        today: NaiveDate,
    ) -> Result<AccessDecision, SubscriptionError> {
        if actor.is_admin() {
            return Ok(AccessDecision::open(ReferenceMonth::of(today)));
        }
        let user = self.users.get(actor.user_id).await?;
        let payments = if user.is_admin() {
            Vec::new()
        } else {
            self.company_payments(user.company_id, Some(ReferenceMonth::of(today)))
                .await?
        };
        Ok(AccessDecision::evaluate(&self.policy, &user, &payments, today))
    }
}
