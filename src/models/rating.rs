use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// One rating row per submission; duplicate ratings by the same user for the
/// same product are allowed.
#[derive(Debug, sqlx::FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingCreateRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RatingUpdateRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_ratings() {
        for value in [0, 6, -1] {
            let req = RatingCreateRequest {
                product_id: Uuid::new_v4(),
                rating: value,
                comment: None,
            };
            assert!(req.validate().is_err(), "rating {value} should fail");
        }
    }

    #[test]
    fn accepts_bounds_inclusive() {
        for value in [1, 5] {
            let req = RatingCreateRequest {
                product_id: Uuid::new_v4(),
                rating: value,
                comment: Some("fine".into()),
            };
            assert!(req.validate().is_ok());
        }
    }
}
