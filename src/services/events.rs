use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::event::{Event, EventCreateRequest, EventFilterQuery, EventUpdateRequest};
use crate::models::PageQuery;

/// Inserts an event stamped with the authenticated owner. Defaults applied
/// here, not in the store: empty description, "GENERAL" category, "ONCE"
/// repeat.
pub async fn create(
    pool: &PgPool,
    owner: Uuid,
    req: &EventCreateRequest,
) -> Result<Event, AppError> {
    let details = req.repeat_details.as_ref();
    let event = sqlx::query_as::<_, Event>(
        "INSERT INTO events (user_id, title, description, date, category, repeat,
                             repeat_frequency, repeat_unit, repeat_end_date, media, tags)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         RETURNING *",
    )
    .bind(owner)
    .bind(&req.title)
    .bind(req.description.as_deref().unwrap_or(""))
    .bind(req.date)
    .bind(req.category.as_deref().unwrap_or("GENERAL"))
    .bind(req.repeat.as_deref().unwrap_or("ONCE"))
    .bind(details.map(|d| d.frequency))
    .bind(details.map(|d| d.unit.as_str()))
    .bind(details.and_then(|d| d.end_date))
    .bind(req.media.as_deref().unwrap_or(&[]))
    .bind(req.tags.as_deref().unwrap_or(&[]))
    .fetch_one(pool)
    .await?;
    Ok(event)
}

fn push_filters<'a>(
    builder: &mut QueryBuilder<'a, Postgres>,
    owner: Uuid,
    filter: &'a EventFilterQuery,
) {
    builder.push(" WHERE user_id = ").push_bind(owner);
    if let Some(from) = filter.from {
        builder.push(" AND date >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        builder.push(" AND date <= ").push_bind(to);
    }
    if let Some(category) = &filter.category {
        builder.push(" AND category = ").push_bind(category);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        builder
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Owner-scoped list, date ascending, paginated, with the filter-wide total.
pub async fn list(
    pool: &PgPool,
    owner: Uuid,
    filter: &EventFilterQuery,
    page: &PageQuery,
) -> Result<(Vec<Event>, i64), AppError> {
    let mut query = QueryBuilder::new("SELECT * FROM events");
    push_filters(&mut query, owner, filter);
    query
        .push(" ORDER BY date ASC NULLS LAST LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let events = query.build_query_as::<Event>().fetch_all(pool).await?;

    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM events");
    push_filters(&mut count, owner, filter);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    Ok((events, total))
}

pub async fn get(pool: &PgPool, owner: Uuid, id: Uuid) -> Result<Option<Event>, AppError> {
    let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner)
        .fetch_optional(pool)
        .await?;
    Ok(event)
}

/// Owner-scoped partial update. Setting a non-CUSTOM repeat clears any stored
/// repeat details.
pub async fn update(
    pool: &PgPool,
    owner: Uuid,
    id: Uuid,
    req: &EventUpdateRequest,
) -> Result<Option<Event>, AppError> {
    let mut query = QueryBuilder::new("UPDATE events SET updated_at = NOW()");
    if let Some(title) = &req.title {
        query.push(", title = ").push_bind(title);
    }
    if let Some(description) = &req.description {
        query.push(", description = ").push_bind(description);
    }
    if let Some(date) = req.date {
        query.push(", date = ").push_bind(date);
    }
    if let Some(category) = &req.category {
        query.push(", category = ").push_bind(category);
    }
    if let Some(repeat) = &req.repeat {
        query.push(", repeat = ").push_bind(repeat);
        if repeat.as_str() != "CUSTOM" {
            query.push(
                ", repeat_frequency = NULL, repeat_unit = NULL, repeat_end_date = NULL",
            );
        }
    }
    if let Some(details) = &req.repeat_details {
        query
            .push(", repeat_frequency = ")
            .push_bind(details.frequency)
            .push(", repeat_unit = ")
            .push_bind(&details.unit)
            .push(", repeat_end_date = ")
            .push_bind(details.end_date);
    }
    if let Some(media) = &req.media {
        query.push(", media = ").push_bind(media);
    }
    if let Some(tags) = &req.tags {
        query.push(", tags = ").push_bind(tags);
    }
    query
        .push(" WHERE id = ")
        .push_bind(id)
        .push(" AND user_id = ")
        .push_bind(owner)
        .push(" RETURNING *");

    let event = query.build_query_as::<Event>().fetch_optional(pool).await?;
    Ok(event)
}

/// Owner-scoped delete; false when no owned row matched.
pub async fn delete(pool: &PgPool, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM events WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
