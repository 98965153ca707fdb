use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::rating::{Rating, RatingCreateRequest, RatingUpdateRequest};

/// One row per submission; the same user may rate the same product again.
pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    req: &RatingCreateRequest,
) -> Result<Rating, AppError> {
    let rating = sqlx::query_as::<_, Rating>(
        "INSERT INTO ratings (product_id, user_id, rating, comment)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(req.product_id)
    .bind(user_id)
    .bind(req.rating)
    .bind(&req.comment)
    .fetch_one(pool)
    .await?;
    Ok(rating)
}

pub async fn list_by_product(pool: &PgPool, product_id: Uuid) -> Result<Vec<Rating>, AppError> {
    let ratings = sqlx::query_as::<_, Rating>(
        "SELECT * FROM ratings WHERE product_id = $1 ORDER BY created_at DESC",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?;
    Ok(ratings)
}

/// Partial update by rating id; returns None when the id has no match.
pub async fn update(
    pool: &PgPool,
    rating_id: Uuid,
    req: &RatingUpdateRequest,
) -> Result<Option<Rating>, AppError> {
    let rating = sqlx::query_as::<_, Rating>(
        "UPDATE ratings
         SET rating = COALESCE($2, rating),
             comment = COALESCE($3, comment),
             updated_at = NOW()
         WHERE id = $1
         RETURNING *",
    )
    .bind(rating_id)
    .bind(req.rating)
    .bind(&req.comment)
    .fetch_optional(pool)
    .await?;
    Ok(rating)
}

/// Idempotent: deleting an absent rating still succeeds.
pub async fn delete(pool: &PgPool, rating_id: Uuid) -> Result<(), AppError> {
    sqlx::query("DELETE FROM ratings WHERE id = $1")
        .bind(rating_id)
        .execute(pool)
        .await?;
    Ok(())
}
