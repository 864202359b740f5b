//! Access gate for the monthly subscription fee
//!
//! The banner is advisory. It nudges a company toward paying the current
//! month and never blocks on its own; the hard block is the user's
//! `inativo` status, which only an admin sets.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use core_kernel::{last_day_of_month, ReferenceMonth};

use crate::payment::SubscriptionPayment;
use crate::user::User;

/// Window sizes for the subscription banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatePolicy {
    /// Days 1..=grace_days of a month are the grace period
    pub grace_days: u32,
    /// Days within this many of month end show the approaching banner
    pub approaching_window: u32,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            grace_days: 5,
            approaching_window: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Banner {
    /// Next month's fee is close; informational
    #[serde(rename = "approaching_due_date", rename_all = "camelCase")]
    Approaching { days_until_month_end: u32 },

    /// Early in the month without a payment for it
    #[serde(rename = "grace_period", rename_all = "camelCase")]
    Grace { days_remaining: u32 },

    /// Past the grace period without a payment for the month
    Overdue,
}

impl GatePolicy {
    /// Computes the banner for `today`.
    ///
    /// `month_settled` is whether the company has a payment for today's
    /// reference month that is approved or still under review.
    pub fn banner(&self, today: NaiveDate, month_settled: bool) -> Option<Banner> {
        if month_settled {
            return None;
        }

        let day = today.day();
        let last_day = last_day_of_month(today);

        if day >= last_day.saturating_sub(self.approaching_window) {
            Some(Banner::Approaching {
                days_until_month_end: last_day - day,
            })
        } else if day <= self.grace_days {
            Some(Banner::Grace {
                days_remaining: self.grace_days - day + 1,
            })
        } else {
            Some(Banner::Overdue)
        }
    }
}

/// What the application shows a user about the subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    pub reference_month: ReferenceMonth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<Banner>,
    pub blocked: bool,
}

impl AccessDecision {
    /// Unrestricted access with no banner
    pub fn open(reference_month: ReferenceMonth) -> Self {
        Self {
            reference_month,
            banner: None,
            blocked: false,
        }
    }

    /// Evaluates the gate for a user given their company's payments.
    ///
    /// Admins always pass without a banner.
    pub fn evaluate(
        policy: &GatePolicy,
        user: &User,
        payments: &[SubscriptionPayment],
        today: NaiveDate,
    ) -> Self {
        let reference_month = ReferenceMonth::of(today);

        if user.is_admin() {
            return Self::open(reference_month);
        }

        let month_settled = payments.iter().any(|p| {
            p.company_id == user.company_id
                && p.reference_month == reference_month
                && p.status.settles_month()
        });

        Self {
            reference_month,
            banner: policy.banner(today, month_settled),
            blocked: user.is_blocked(),
        }
    }
}
