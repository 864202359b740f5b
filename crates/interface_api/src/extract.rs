//! Request extractors

use axum::{
    async_trait,
    body::Bytes,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// A JSON body the caller may leave out.
///
/// An empty body yields `None`. A body that is present must deserialize
/// into `T`, otherwise the request is rejected: 400 for malformed JSON,
/// 422 for JSON of the wrong shape.
#[derive(Debug)]
pub struct OptionalJson<T>(pub Option<T>);

#[async_trait]
impl<T, S> FromRequest<S> for OptionalJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(None));
        }

        let Json(value) = Json::<T>::from_bytes(&bytes).map_err(json_error)?;
        Ok(Self(Some(value)))
    }
}

fn json_error(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(e) => ApiError::Validation(e.body_text()),
        other => ApiError::BadRequest(other.body_text()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Payment {
        paid_date: Option<String>,
    }

    async fn extract(body: &'static str) -> Result<OptionalJson<Payment>, ApiError> {
        let request = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        OptionalJson::<Payment>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn test_empty_body_is_none() {
        assert!(extract("").await.unwrap().0.is_none());
        assert!(extract("  \n").await.unwrap().0.is_none());
    }

    #[tokio::test]
    async fn test_present_body_is_parsed() {
        let OptionalJson(payment) = extract(r#"{"paidDate":"2024-01-02"}"#).await.unwrap();
        assert_eq!(payment.unwrap().paid_date.as_deref(), Some("2024-01-02"));
    }

    #[tokio::test]
    async fn test_wrong_shape_is_unprocessable() {
        let err = extract(r#"{"paidDate":20240102}"#).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let err = extract(r#"{"paidDate":"#).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
