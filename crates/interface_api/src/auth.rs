//! Authentication and authorization

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ApiError;

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

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingPermission(p) => ApiError::Forbidden(format!("missing permission {}", p)),
            AuthError::InvalidToken | AuthError::TokenExpired => ApiError::Unauthorized,
        }
    }
}

/// Creates a new JWT token
///
/// # Arguments
///
/// * `user_id` - User identifier
/// * `roles` - User's roles
/// * `secret` - JWT secret key
/// * `expiration_secs` - Token validity in seconds
pub fn create_token(
    user_id: &str,
    roles: Vec<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = Claims {
        sub: user_id.to_string(),
        roles,
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

/// Checks if user has required role
pub fn has_role(claims: &Claims, required_role: &str) -> bool {
    claims.roles.iter().any(|r| r == required_role || r == "admin")
}

/// Fails with `MissingPermission` unless the caller holds `permission`
pub fn require(claims: &Claims, permission: &str) -> Result<(), AuthError> {
    if has_role(claims, permission) {
        Ok(())
    } else {
        Err(AuthError::MissingPermission(permission.to_string()))
    }
}

/// Permission definitions
pub mod permissions {
    pub const PAYMENT_WRITE: &str = "payment:write";
    pub const PAYMENT_REVERSE: &str = "payment:reverse";
    pub const LEDGER_READ: &str = "ledger:read";
    pub const PROPERTY_READ: &str = "property:read";
    pub const PROPERTY_WRITE: &str = "property:write";
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_round_trip() {
        let token = create_token("caretaker", vec![permissions::PAYMENT_WRITE.to_string()], SECRET, 60).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, "caretaker");
        assert!(require(&claims, permissions::PAYMENT_WRITE).is_ok());
        assert!(matches!(
            require(&claims, permissions::PAYMENT_REVERSE),
            Err(AuthError::MissingPermission(_))
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token("caretaker", vec![], SECRET, 60).unwrap();
        assert!(matches!(validate_token(&token, "other"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_admin_has_every_permission() {
        let claims = Claims {
            sub: "landlord".to_string(),
            roles: vec!["admin".to_string()],
            exp: 0,
            iat: 0,
        };
        assert!(require(&claims, permissions::PROPERTY_WRITE).is_ok());
    }
}
