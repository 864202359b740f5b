//! Subscription handlers for company users

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::NaiveDate;
use core_kernel::{Money, ReferenceMonth};
use domain_subscription::{AccessDecision, PaymentSubmission, SubscriptionPayment};
use validator::Validate;

use crate::auth::Claims;
use crate::dto::subscription::*;
use crate::{error::ApiError, AppState};

/// Due date used when a submission does not name one: the last grace day
/// of the reference month, clamped to the month's length
fn default_due_date(month: ReferenceMonth, grace_days: u32) -> Option<NaiveDate> {
    let first = month.first_day()?;
    let last = core_kernel::last_day_of_month(first);
    NaiveDate::from_ymd_opt(month.year(), month.month(), grace_days.clamp(1, last))
}

/// Uploads a receipt for the caller's company
pub async fn submit_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<SubmitPaymentRequest>,
) -> Result<(StatusCode, Json<SubscriptionPayment>), ApiError> {
    let actor = claims.actor()?;
    request.validate()?;

    let reference_month = request
        .reference_month
        .unwrap_or_else(|| ReferenceMonth::of(state.today()));
    let due_date = match request.due_date.as_deref() {
        Some(raw) => state.timezone.parse_date(raw)?,
        None => default_due_date(reference_month, state.config.grace_days)
            .ok_or_else(|| ApiError::Validation(format!("invalid reference month {}", reference_month)))?,
    };

    let payment = state
        .subscription
        .submit_payment(
            &actor,
            PaymentSubmission {
                amount: Money::new(request.amount, state.config.currency),
                reference_month,
                receipt_url: request.receipt_url,
                due_date,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(payment)))
}

/// Banner and block state for the caller
pub async fn gate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<AccessDecision>, ApiError> {
    let actor = claims.actor()?;
    let decision = state.subscription.evaluate_gate(&actor, state.today()).await?;
    Ok(Json(decision))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_due_date_clamps_to_month() {
        let march = ReferenceMonth::new(3, 2024).unwrap();
        assert_eq!(default_due_date(march, 5), NaiveDate::from_ymd_opt(2024, 3, 5));

        let february = ReferenceMonth::new(2, 2023).unwrap();
        assert_eq!(default_due_date(february, 31), NaiveDate::from_ymd_opt(2023, 2, 28));
    }
}
