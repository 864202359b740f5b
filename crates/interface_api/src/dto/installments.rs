//! Installment DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{ClientId, SaleId};
use domain_billing::Installment;

use super::validate_amount;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentQuery {
    pub client_id: Option<String>,
}

/// A sale to split into monthly installments
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    /// Existing client; a new id is assigned when absent
    pub client_id: Option<ClientId>,
    #[validate(length(min = 1, message = "client name is required"))]
    pub client_name: String,
    #[validate(custom(function = "validate_amount"))]
    pub total: Decimal,
    #[validate(range(min = 1, max = 120, message = "between 1 and 120 installments"))]
    pub installment_count: u32,
    #[validate(length(min = 1, message = "first due date is required"))]
    pub first_due_date: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PayInstallmentRequest {
    /// Defaults to today
    pub paid_date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub sale_id: SaleId,
    pub installments: Vec<Installment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_request_rejects_zero_total_and_count() {
        let request: CreatePlanRequest = serde_json::from_value(serde_json::json!({
            "clientName": "Padaria Pão Quente",
            "total": "0",
            "installmentCount": 0,
            "firstDueDate": "2024-04-10"
        }))
        .unwrap();

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("total"));
        assert!(fields.contains_key("installment_count"));
    }
}
