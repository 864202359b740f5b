//! Authentication and authorization
//!
//! Tokens are HS256 JWTs whose subject is the user id and whose roles are
//! `"admin"` or `"user"`. The identity provider that issues them shares
//! the signing secret.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{Actor, Role, UserId};

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User's roles
    pub roles: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        has_role(self, Role::Admin)
    }

    /// The acting user these claims describe
    pub fn actor(&self) -> Result<Actor, AuthError> {
        let user_id: UserId = self.sub.parse().map_err(|_| AuthError::InvalidToken)?;
        let role = if self.is_admin() { Role::Admin } else { Role::User };
        Ok(Actor::new(user_id, role))
    }
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Missing permission: {0}")]
    MissingPermission(String),
}

/// Creates a signed token for a user
pub fn create_token(
    user_id: UserId,
    role: Role,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = Claims {
        sub: user_id.as_uuid().to_string(),
        roles: vec![role.as_str().to_string()],
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// Checks if the claims carry a role
pub fn has_role(claims: &Claims, role: Role) -> bool {
    claims.roles.iter().any(|r| r == role.as_str())
}

/// Fails unless the claims carry the admin role
pub fn require_admin(claims: &Claims) -> Result<(), AuthError> {
    if claims.is_admin() {
        Ok(())
    } else {
        Err(AuthError::MissingPermission(Role::Admin.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_round_trip_yields_actor() {
        let user_id = UserId::new_v7();
        let token = create_token(user_id, Role::User, SECRET, 60).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();

        let actor = claims.actor().unwrap();
        assert_eq!(actor.user_id, user_id);
        assert!(!actor.is_admin());
        assert!(require_admin(&claims).is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_token(UserId::new_v7(), Role::Admin, SECRET, 60).unwrap();
        assert!(matches!(validate_token(&token, "other"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_non_uuid_subject_is_invalid() {
        let claims = Claims {
            sub: "not-a-user".to_string(),
            roles: vec!["admin".to_string()],
            exp: 0,
            iat: 0,
        };
        assert!(claims.is_admin());
        assert!(matches!(claims.actor(), Err(AuthError::InvalidToken)));
    }
}
