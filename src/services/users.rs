use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::user::{SignupRequest, User, UserProfile};
use crate::models::PageQuery;

/// Inserts a new user with the default "user" role. Any persistence failure,
/// including a duplicate email, surfaces as the generic creation error.
pub async fn create_user(
    pool: &PgPool,
    req: &SignupRequest,
    password_hash: &str,
) -> Result<Uuid, AppError> {
    let result = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (title, first_name, last_name, email, phone, gender, password_hash)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING id",
    )
    .bind(&req.title)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(&req.email)
    .bind(&req.phone)
    .bind(&req.gender)
    .bind(password_hash)
    .fetch_one(pool)
    .await;

    match result {
        Ok(id) => {
            tracing::info!(user_id = %id, "users:create_user:success");
            Ok(id)
        }
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            tracing::warn!(email = %req.email, "users:create_user:duplicate email");
            Err(AppError::Internal)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Overwrites the stored refresh token; the previous one stops being usable.
pub async fn set_refresh_token(
    pool: &PgPool,
    user_id: Uuid,
    refresh_token: &str,
) -> Result<(), AppError> {
    sqlx::query("UPDATE users SET refresh_token = $2, updated_on = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(refresh_token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Paginated projection excluding the password, with the unfiltered total.
pub async fn list_users(
    pool: &PgPool,
    page: &PageQuery,
) -> Result<(Vec<UserProfile>, i64), AppError> {
    let users = sqlx::query_as::<_, User>(
        "SELECT * FROM users ORDER BY created_on LIMIT $1 OFFSET $2",
    )
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    Ok((users.iter().map(UserProfile::from).collect(), total))
}
