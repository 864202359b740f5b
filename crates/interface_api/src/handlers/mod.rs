//! Request handlers

pub mod admin;
pub mod documents;
pub mod health;
pub mod installments;
pub mod reports;
pub mod subscription;

use std::str::FromStr;

use crate::error::ApiError;

/// Parses a path id; both the prefixed display form and a bare UUID work
pub(crate) fn parse_id<T: FromStr>(raw: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid id: {}", raw)))
}
