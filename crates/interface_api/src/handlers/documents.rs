//! Fiscal document handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use core_kernel::{ClientId, DocumentId, Money, Rate};
use domain_billing::{BoletoTerms, DocumentKind, DocumentView, FiscalDocument};
use validator::Validate;

use super::parse_id;
use crate::auth::Claims;
use crate::dto::documents::*;
use crate::extract::OptionalJson;
use crate::{error::ApiError, AppState};

/// Issues a document
pub async fn issue_document(
    State(state): State<AppState>,
    Json(request): Json<IssueDocumentRequest>,
) -> Result<(StatusCode, Json<DocumentView>), ApiError> {
    request.validate()?;
    let issue_date = state.date_or_today(request.issue_date.as_deref())?;
    let client_id = request.client_id.unwrap_or_else(ClientId::new_v7);
    let amount = Money::new(request.amount, state.config.currency);

    let document = match request.kind {
        DocumentKind::NotaServico => {
            FiscalDocument::nota_servico(request.number, client_id, request.client_name, amount, issue_date)
        }
        DocumentKind::Recibo => {
            FiscalDocument::recibo(request.number, client_id, request.client_name, amount, issue_date)
        }
        DocumentKind::Boleto => {
            let raw_due = request
                .due_date
                .as_deref()
                .ok_or_else(|| ApiError::Validation("boleto requires a due date".to_string()))?;
            let terms = BoletoTerms::new(state.timezone.parse_date(raw_due)?).with_charges(
                Rate::from_percentage(request.penalty_rate.unwrap_or_default()),
                Rate::from_percentage(request.monthly_interest_rate.unwrap_or_default()),
            );
            FiscalDocument::boleto(request.number, client_id, request.client_name, amount, issue_date, terms)
        }
    };

    let stored = state.documents.issue(document).await?;
    Ok((StatusCode::CREATED, Json(stored.view(state.today())?)))
}

pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentView>, ApiError> {
    let id: DocumentId = parse_id(&id)?;
    Ok(Json(state.documents.get(id, state.today()).await?))
}

/// Records a boleto payment; the body is optional
pub async fn pay_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    OptionalJson(request): OptionalJson<PayDocumentRequest>,
) -> Result<Json<DocumentView>, ApiError> {
    let id: DocumentId = parse_id(&id)?;
    let request = request.unwrap_or_default();
    request.validate()?;

    let paid_date = state.date_or_today(request.paid_date.as_deref())?;
    let paid_amount = request
        .paid_amount
        .map(|amount| Money::new(amount, state.config.currency));

    let document = state.documents.pay(id, paid_date, paid_amount).await?;
    Ok(Json(document.view(state.today())?))
}

/// Cancels a document; admins only
pub async fn cancel_document(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(request): Json<CancelDocumentRequest>,
) -> Result<Json<DocumentView>, ApiError> {
    let id: DocumentId = parse_id(&id)?;
    let actor = claims.actor()?;
    request.validate()?;

    let document = state
        .documents
        .cancel(id, &actor, &request.reason, state.today())
        .await?;
    Ok(Json(document.view(state.today())?))
}
