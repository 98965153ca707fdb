use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use sqlx::PgPool;

use crate::config::Config;
use crate::error::AppError;
use crate::middleware::auth::{
    create_token, verify_token, ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS,
};
use crate::models::user::{AuthTokens, AuthUserData, User};
use crate::services::users;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| {
            tracing::error!("auth:hash_password:error - {e}");
            AppError::Internal
        })
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        tracing::error!("auth:verify_password - stored hash is malformed");
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Unknown email and wrong password produce the identical failure; nothing
/// distinguishes the two to the caller.
pub async fn login(
    pool: &PgPool,
    config: &Config,
    email: &str,
    password: &str,
) -> Result<AuthTokens, AppError> {
    let Some(user) = users::find_by_email(pool, email).await? else {
        tracing::warn!("auth:login - invalid credentials for {email}");
        return Err(AppError::unauthorized("Invalid credentials"));
    };

    if !verify_password(password, &user.password_hash) {
        tracing::warn!("auth:login - invalid password for {email}");
        return Err(AppError::unauthorized("Invalid credentials"));
    }

    issue_tokens(pool, config, &user, "Login successful").await
}

/// Verifies the presented refresh token, requires it to match the stored one
/// (single-use rotation) and re-resolves the subject before issuing a fresh
/// pair.
pub async fn refresh(
    pool: &PgPool,
    config: &Config,
    refresh_token: &str,
) -> Result<AuthTokens, AppError> {
    let claims = verify_token(refresh_token, &config.jwt_secret)
        .map_err(|_| AppError::unauthorized("Invalid refresh token"))?;

    let Some(user) = users::find_by_id(pool, claims.sub).await? else {
        tracing::warn!(user_id = %claims.sub, "auth:refresh - no user for token subject");
        return Err(AppError::unauthorized("User not found"));
    };

    if user.refresh_token.as_deref() != Some(refresh_token) {
        tracing::warn!(user_id = %user.id, "auth:refresh - stale refresh token presented");
        return Err(AppError::unauthorized("Invalid refresh token"));
    }

    issue_tokens(pool, config, &user, "Token refreshed successfully").await
}

async fn issue_tokens(
    pool: &PgPool,
    config: &Config,
    user: &User,
    message: &str,
) -> Result<AuthTokens, AppError> {
    let access_token = create_token(user, ACCESS_TOKEN_TTL_SECS, &config.jwt_secret)
        .map_err(|e| {
            tracing::error!("auth:issue_tokens:error - {e}");
            AppError::Internal
        })?;
    let refresh_token = create_token(user, REFRESH_TOKEN_TTL_SECS, &config.jwt_secret)
        .map_err(|e| {
            tracing::error!("auth:issue_tokens:error - {e}");
            AppError::Internal
        })?;

    users::set_refresh_token(pool, user.id, &refresh_token).await?;

    Ok(AuthTokens {
        message: message.to_string(),
        user: AuthUserData::from(user),
        access_token,
        refresh_token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::SignupRequest;
    use crate::services::test_db;
    use uuid::Uuid;

    #[test]
    fn hash_then_verify_round_trips() {
        for password in ["longpass1", "a".repeat(32).as_str(), "correct horse 9"] {
            let hash = hash_password(password).unwrap();
            assert!(verify_password(password, &hash));
            assert!(!verify_password("different-pass", &hash));
        }
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("samepassword").unwrap();
        let b = hash_password("samepassword").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_stored_hash_never_verifies() {
        assert!(!verify_password("whatever", "not-a-phc-string"));
    }

    fn test_config() -> Config {
        Config {
            database_url: String::new(),
            jwt_secret: "test-secret".into(),
            listen_addr: String::new(),
            public_base_url: String::new(),
            cors_origins: "*".into(),
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_user: String::new(),
            smtp_pass: String::new(),
            smtp_from: String::new(),
        }
    }

    // Skips when DATABASE_URL is unset.
    #[tokio::test]
    async fn unknown_email_and_wrong_password_fail_identically() {
        let Some(pool) = test_db::pool().await else {
            return;
        };
        let config = test_config();

        let email = format!("{}@example.com", Uuid::new_v4());
        let req = SignupRequest {
            title: "Mr.".into(),
            first_name: "Ravi".into(),
            last_name: "Sharma".into(),
            email: email.clone(),
            phone: "9876543210".into(),
            gender: "male".into(),
            password: "s3cret-pass".into(),
        };
        let hash = hash_password(&req.password).unwrap();
        users::create_user(&pool, &req, &hash).await.unwrap();

        let unknown = login(&pool, &config, "nobody@example.invalid", "s3cret-pass")
            .await
            .unwrap_err();
        let wrong = login(&pool, &config, &email, "wrong-password")
            .await
            .unwrap_err();
        let (AppError::Unauthorized(a), AppError::Unauthorized(b)) = (unknown, wrong) else {
            panic!("expected unauthorized on both");
        };
        assert_eq!(a, b);
        assert_eq!(a, "Invalid credentials");

        // The right password still gets through.
        assert!(login(&pool, &config, &email, "s3cret-pass").await.is_ok());
    }
}
