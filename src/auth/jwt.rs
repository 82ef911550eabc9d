use crate::error::{AppError, Result, LOGIN_INVALID};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub organization_id: i32,
    pub role_id: i32,
    pub email: String,
    pub exp: i64,
}

/// Identity written into an access token.
pub struct TokenSubject<'a> {
    pub user_id: i32,
    pub organization_id: i32,
    pub role_id: i32,
    pub email: &'a str,
}

pub fn create_access_token(subject: &TokenSubject<'_>, secret: &str, expiration_hours: i64) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(expiration_hours))
        .ok_or_else(|| AppError::Internal("token expiration overflow".to_string()))?
        .timestamp();

    let claims = Claims {
        sub: subject.user_id.to_string(),
        organization_id: subject.organization_id,
        role_id: subject.role_id,
        email: subject.email.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to create access token: {}", e)))
}

/// Verify JWT token and extract claims
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized(LOGIN_INVALID.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> TokenSubject<'static> {
        TokenSubject {
            user_id: 17,
            organization_id: 3,
            role_id: 2,
            email: "manager@example.com",
        }
    }

    #[test]
    fn test_token_carries_tenant_and_role() {
        let token = create_access_token(&subject(), "secret", 1).unwrap();
        let claims = verify_jwt(&token, "secret").unwrap();

        assert_eq!(claims.sub, "17");
        assert_eq!(claims.organization_id, 3);
        assert_eq!(claims.role_id, 2);
        assert_eq!(claims.email, "manager@example.com");
    }

    #[test]
    fn test_wrong_secret_is_login_invalid() {
        let token = create_access_token(&subject(), "secret", 1).unwrap();
        let err = verify_jwt(&token, "other").unwrap_err();

        assert!(matches!(err, AppError::Unauthorized(m) if m == LOGIN_INVALID));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = create_access_token(&subject(), "secret", -2).unwrap();
        assert!(verify_jwt(&token, "secret").is_err());
    }
}
