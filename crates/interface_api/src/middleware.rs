//! API middleware

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::{info, warn};

use crate::auth::{self, Claims};
use crate::error::ApiError;
use crate::AppState;

/// Authentication middleware
///
/// Validates the bearer token and stores its claims in the request
/// extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        warn!(uri = %request.uri(), "missing or malformed Authorization header");
        return Err(ApiError::Unauthorized);
    };

    match auth::validate_token(token, &state.config.jwt_secret) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(e) => {
            warn!(error = %e, "token validation failed");
            Err(e.into())
        }
    }
}

/// Admin gate for the `/admin` routes; runs after [`auth_middleware`]
pub async fn admin_middleware(request: Request<Body>, next: Next) -> Response {
    let allowed = request
        .extensions()
        .get::<Claims>()
        .map(auth::require_admin);

    match allowed {
        Some(Ok(())) => next.run(request).await,
        Some(Err(e)) => {
            warn!(uri = %request.uri(), "admin route refused");
            ApiError::from(e).into_response()
        }
        None => ApiError::Unauthorized.into_response(),
    }
}

/// Audit logging middleware
///
/// One structured line per request with the acting user.
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let user_id = request
        .extensions()
        .get::<Claims>()
        .map(|c| c.sub.clone())
        .unwrap_or_else(|| "anonymous".to_string());

    let start = Utc::now();

    let response = next.run(request).await;

    let duration = Utc::now() - start;
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        user = %user_id,
        status = %status.as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}
