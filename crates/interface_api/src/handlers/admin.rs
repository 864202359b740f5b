//! Admin handlers
//!
//! Mounted behind the admin middleware; the services check the role again.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use core_kernel::{PaymentId, UserId};
use domain_subscription::{SubscriptionPayment, User};
use validator::Validate;

use super::parse_id;
use crate::auth::Claims;
use crate::dto::subscription::*;
use crate::monitor::PendingVerifications;
use crate::{error::ApiError, AppState};

/// Payments awaiting verification, oldest first
pub async fn pending_payments(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubscriptionPayment>>, ApiError> {
    Ok(Json(state.subscription.pending_verifications().await?))
}

pub async fn approve_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<SubscriptionPayment>, ApiError> {
    let id: PaymentId = parse_id(&id)?;
    let admin = claims.actor()?;
    let payment = state
        .subscription
        .approve_payment(id, &admin, state.today())
        .await?;
    Ok(Json(payment))
}

pub async fn reject_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(request): Json<RejectPaymentRequest>,
) -> Result<Json<SubscriptionPayment>, ApiError> {
    let id: PaymentId = parse_id(&id)?;
    let admin = claims.actor()?;
    request.validate()?;

    let payment = state
        .subscription
        .reject_payment(id, &admin, &request.reason, state.today())
        .await?;
    Ok(Json(payment))
}

/// Creates a user account
pub async fn register_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let admin = claims.actor()?;
    request.validate()?;

    let mut user = User::new(request.email, request.company_name).with_role(request.role);
    if let Some(company_id) = request.company_id {
        user = user.with_company(company_id);
    }

    let user = state.subscription.register_user(&admin, user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn block_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let id: UserId = parse_id(&id)?;
    let admin = claims.actor()?;
    Ok(Json(state.subscription.block_user(id, &admin).await?))
}

pub async fn unblock_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let id: UserId = parse_id(&id)?;
    let admin = claims.actor()?;
    Ok(Json(state.subscription.unblock_user(id, &admin).await?))
}

/// Latest count of payments awaiting verification, from the poller
pub async fn notifications(State(state): State<AppState>) -> Json<PendingVerifications> {
    Json(state.notifications.borrow().clone())
}
