//! Subscription DTOs

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use core_kernel::{CompanyId, ReferenceMonth, Role};

use super::validate_amount;

/// A receipt upload for the monthly fee
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPaymentRequest {
    #[validate(custom(function = "validate_amount"))]
    pub amount: Decimal,
    /// `MM/YYYY`; defaults to the current month
    pub reference_month: Option<ReferenceMonth>,
    #[validate(url(message = "receipt URL must be a valid URL"))]
    pub receipt_url: String,
    /// Defaults to the last grace day of the reference month
    pub due_date: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RejectPaymentRequest {
    #[validate(length(min = 1, message = "rejection reason is required"))]
    pub reason: String,
}

/// Creates a user account; a new company is created unless `companyId`
/// names an existing one
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "company name is required"))]
    pub company_name: String,
    pub company_id: Option<CompanyId>,
    #[serde(default)]
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_request_parses_reference_month() {
        let request: SubmitPaymentRequest = serde_json::from_value(serde_json::json!({
            "amount": "89.90",
            "referenceMonth": "03/2024",
            "receiptUrl": "https://files.example/comprovante.pdf"
        }))
        .unwrap();

        assert!(request.validate().is_ok());
        assert_eq!(request.reference_month, Some(ReferenceMonth::new(3, 2024).unwrap()));
    }

    #[test]
    fn test_submit_request_requires_url_receipt() {
        let request: SubmitPaymentRequest = serde_json::from_value(serde_json::json!({
            "amount": 89.9,
            "receiptUrl": "comprovante.pdf"
        }))
        .unwrap();

        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("receipt_url"));
    }
}
