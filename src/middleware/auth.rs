use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::user::{User, UserProfile};
use crate::AppState;

pub const ACCESS_TOKEN_TTL_SECS: i64 = 60 * 60;
pub const REFRESH_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Token payload. Gender is deliberately excluded; it travels only in the
/// login/refresh response body.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Invalid,
}

pub fn create_token(
    user: &User,
    ttl_secs: i64,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user.id,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: user.email.clone(),
        phone: user.phone.clone(),
        role: user.role.clone(),
        iat: now as usize,
        exp: (now + ttl_secs) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decodes and checks signature + expiry, distinguishing expiry so the caller
/// can surface a dedicated message.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid,
    })
}

/// Extractor for bearer-guarded routes: pulls the token from the
/// Authorization header, verifies it, resolves the subject against the users
/// table and attaches the sanitized profile. The sole authorization gate.
pub struct AuthUser {
    pub user: UserProfile,
}

impl AuthUser {
    /// Role gate for administrative operations (product mutations).
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.user.role == "admin" || self.user.role == "superAdmin" {
            Ok(())
        } else {
            Err(AppError::forbidden("Access denied"))
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let state = state.clone();
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        async move {
            let token = auth_header
                .as_deref()
                .and_then(|h| h.strip_prefix("Bearer "))
                .ok_or_else(|| AppError::unauthorized("Access token is required"))?;

            let claims =
                verify_token(token, &state.config.jwt_secret).map_err(|e| match e {
                    TokenError::Expired => AppError::unauthorized("Token has expired"),
                    TokenError::Invalid => AppError::unauthorized("Invalid or expired token"),
                })?;

            let user = crate::services::users::find_by_id(&state.db, claims.sub)
                .await?
                .ok_or_else(|| AppError::forbidden("User not found"))?;

            Ok(AuthUser {
                user: UserProfile::from(&user),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            title: "Mr.".into(),
            first_name: "Ravi".into(),
            last_name: "Sharma".into(),
            email: "ravi@example.com".into(),
            phone: "9876543210".into(),
            gender: "male".into(),
            role: "user".into(),
            password_hash: "unused".into(),
            refresh_token: None,
            created_on: Utc::now(),
            updated_on: Utc::now(),
        }
    }

    #[test]
    fn round_trips_claims() {
        let user = test_user();
        let token = create_token(&user, ACCESS_TOKEN_TTL_SECS, "secret").unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, "user");
    }

    #[test]
    fn expired_token_is_distinguished() {
        let user = test_user();
        // Default validation allows 60s leeway; go well past it.
        let token = create_token(&user, -300, "secret").unwrap();
        assert_eq!(verify_token(&token, "secret"), Err(TokenError::Expired));
    }

    #[test]
    fn wrong_secret_is_invalid_not_expired() {
        let user = test_user();
        let token = create_token(&user, ACCESS_TOKEN_TTL_SECS, "secret").unwrap();
        assert_eq!(verify_token(&token, "other"), Err(TokenError::Invalid));
    }

    #[test]
    fn garbage_token_is_invalid() {
        assert_eq!(
            verify_token("not-a-token", "secret"),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn gender_never_enters_the_claims() {
        let user = test_user();
        let token = create_token(&user, ACCESS_TOKEN_TTL_SECS, "secret").unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        let payload = serde_json::to_value(&claims).unwrap();
        assert!(payload.get("gender").is_none());
        assert_eq!(payload["phone"], serde_json::json!("9876543210"));
    }
}
