//! Installment handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use core_kernel::{ClientId, InstallmentId, Money, SaleId};
use domain_billing::{InstallmentView, Sale};
use validator::Validate;

use super::parse_id;
use crate::dto::installments::*;
use crate::extract::OptionalJson;
use crate::{error::ApiError, AppState};

/// Lists installments with derived status, late first
pub async fn list_installments(
    State(state): State<AppState>,
    Query(query): Query<InstallmentQuery>,
) -> Result<Json<Vec<InstallmentView>>, ApiError> {
    let client = query
        .client_id
        .as_deref()
        .map(parse_id::<ClientId>)
        .transpose()?;
    let views = state.installments.list(client, state.today()).await?;
    Ok(Json(views))
}

/// Splits a sale into installments and stores them
pub async fn create_plan(
    State(state): State<AppState>,
    Json(request): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<PlanResponse>), ApiError> {
    request.validate()?;
    let first_due_date = state.timezone.parse_date(&request.first_due_date)?;

    let sale = Sale {
        id: SaleId::new_v7(),
        client_id: request.client_id.unwrap_or_else(ClientId::new_v7),
        client_name: request.client_name,
        total: Money::new(request.total, state.config.currency),
        installment_count: request.installment_count,
        first_due_date,
    };
    let installments = state.installments.record_plan(&sale).await?;

    Ok((
        StatusCode::CREATED,
        Json(PlanResponse {
            sale_id: sale.id,
            installments,
        }),
    ))
}

/// Marks an installment as paid; the body is optional
pub async fn pay_installment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    OptionalJson(request): OptionalJson<PayInstallmentRequest>,
) -> Result<Json<InstallmentView>, ApiError> {
    let id: InstallmentId = parse_id(&id)?;
    let request = request.unwrap_or_default();
    let paid_date = state.date_or_today(request.paid_date.as_deref())?;

    let installment = state.installments.confirm_payment(id, paid_date).await?;
    Ok(Json(installment.view(state.today())))
}
