//! Fiscal document DTOs

use rust_decimal::Decimal;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use core_kernel::ClientId;
use domain_billing::DocumentKind;

use super::{validate_amount, validate_rate};

/// Issues a nota de serviço, recibo or boleto
///
/// `dueDate` is required for boletos and ignored otherwise. Charge rates
/// are percentages (`2` means 2%) between 0 and 100.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_charge_rates"))]
pub struct IssueDocumentRequest {
    pub kind: DocumentKind,
    #[validate(length(min = 1, max = 60, message = "document number is required"))]
    pub number: String,
    pub client_id: Option<ClientId>,
    #[validate(length(min = 1, message = "client name is required"))]
    pub client_name: String,
    #[validate(custom(function = "validate_amount"))]
    pub amount: Decimal,
    /// Defaults to today
    pub issue_date: Option<String>,
    pub due_date: Option<String>,
    pub penalty_rate: Option<Decimal>,
    pub monthly_interest_rate: Option<Decimal>,
}

fn validate_charge_rates(request: &IssueDocumentRequest) -> Result<(), ValidationError> {
    [request.penalty_rate, request.monthly_interest_rate]
        .iter()
        .flatten()
        .try_for_each(validate_rate)
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_paid_amount"))]
pub struct PayDocumentRequest {
    /// Defaults to today
    pub paid_date: Option<String>,
    /// Defaults to the amount due on the paid date
    pub paid_amount: Option<Decimal>,
}

fn validate_paid_amount(request: &PayDocumentRequest) -> Result<(), ValidationError> {
    request.paid_amount.as_ref().map_or(Ok(()), validate_amount)
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CancelDocumentRequest {
    #[validate(length(min = 1, message = "cancellation reason is required"))]
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_negative_rates_are_rejected() {
        let request: IssueDocumentRequest = serde_json::from_value(serde_json::json!({
            "kind": "boleto",
            "number": "BOL-7",
            "clientName": "Açougue Bom Corte",
            "amount": "120.00",
            "dueDate": "2024-03-20",
            "monthlyInterestRate": "-1"
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_rates_above_one_hundred_percent_are_rejected() {
        let request: IssueDocumentRequest = serde_json::from_value(serde_json::json!({
            "kind": "boleto",
            "number": "BOL-8",
            "clientName": "Açougue Bom Corte",
            "amount": "120.00",
            "dueDate": "2024-03-20",
            "penaltyRate": "100000000000"
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_paid_amount_must_be_positive_when_given() {
        assert!(PayDocumentRequest::default().validate().is_ok());
        let request = PayDocumentRequest {
            paid_date: None,
            paid_amount: Some(dec!(0)),
        };
        assert!(request.validate().is_err());
    }
}
