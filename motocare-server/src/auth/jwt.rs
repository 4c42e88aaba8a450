//! Staff JWT (HS256)

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{Profile, Role};

use super::CurrentUser;

/// JWT claims for staff authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Profile ID
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub branch_id: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

const JWT_EXPIRY_HOURS: i64 = 24;

/// Create a JWT token for a profile
pub fn create_token(
    profile: &Profile,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: profile.id.to_string(),
        email: profile.email.clone(),
        role: profile.role,
        branch_id: profile.branch_id.clone(),
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify a token and return the identity it carries
pub fn verify_token(token: &str, secret: &str) -> Result<CurrentUser, AppError> {
    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("JWT validation failed: {e}");
        match e.kind() {
            ErrorKind::ExpiredSignature => AppError::new(ErrorCode::TokenExpired),
            _ => AppError::new(ErrorCode::TokenInvalid),
        }
    })?;

    let id = data
        .claims
        .sub
        .parse()
        .map_err(|_| AppError::new(ErrorCode::TokenInvalid))?;

    Ok(CurrentUser {
        id,
        email: data.claims.email,
        role: data.claims.role,
        branch_id: data.claims.branch_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile {
            id: 4242,
            email: "lan@motocare.vn".to_string(),
            full_name: "Lan".to_string(),
            role: Role::Manager,
            branch_id: "CN2".to_string(),
            is_active: true,
            hashed_password: String::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn token_round_trip() {
        let token = create_token(&profile(), "secret").unwrap();
        let user = verify_token(&token, "secret").unwrap();
        assert_eq!(user.id, 4242);
        assert_eq!(user.role, Role::Manager);
        assert_eq!(user.branch_id, "CN2");
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = create_token(&profile(), "secret").unwrap();
        let err = verify_token(&token, "other").unwrap_err();
        assert_eq!(err.code, ErrorCode::TokenInvalid);
        assert_eq!(
            verify_token("garbage", "secret").unwrap_err().code,
            ErrorCode::TokenInvalid
        );
    }

    #[test]
    fn expired_token() {
        let claims = Claims {
            sub: "1".to_string(),
            email: "a@b.c".to_string(),
            role: Role::Staff,
            branch_id: "CN1".to_string(),
            exp: 1_000,
            iat: 0,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert_eq!(
            verify_token(&token, "secret").unwrap_err().code,
            ErrorCode::TokenExpired
        );
    }
}
