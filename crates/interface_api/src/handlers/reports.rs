//! Report handlers

use axum::{extract::State, Json};
use domain_billing::ReceivablesReport;

use crate::{error::ApiError, AppState};

/// Receivables by derived status and by client, as of today
pub async fn receivables(State(state): State<AppState>) -> Result<Json<ReceivablesReport>, ApiError> {
    let report = state
        .installments
        .receivables_report(state.today(), state.config.currency)
        .await?;
    Ok(Json(report))
}
