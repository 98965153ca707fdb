use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{AppError, FieldError};

pub const REPEAT_TYPES: [&str; 6] = [
    "YEARLY",
    "HALF_YEARLY",
    "MONTHLY",
    "WEEKLY",
    "ONCE",
    "CUSTOM",
];
pub const REPEAT_UNITS: [&str; 4] = ["days", "weeks", "months", "years"];

/// Personal event record, owned exclusively by the creating user. Repeat
/// details are stored flat and reassembled into the nested wire shape.
#[derive(Debug, sqlx::FromRow)]
pub struct Event {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub date: Option<DateTime<Utc>>,
    pub category: String,
    pub repeat: String,
    pub repeat_frequency: Option<i32>,
    pub repeat_unit: Option<String>,
    pub repeat_end_date: Option<DateTime<Utc>>,
    pub media: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RepeatDetails {
    /// Repeat every `frequency` units.
    #[validate(range(min = 1, message = "Frequency must be at least 1"))]
    pub frequency: i32,
    /// One of "days", "weeks", "months", "years".
    #[validate(custom(function = "validate_repeat_unit"))]
    pub unit: String,
    /// Stop repeating after this date.
    #[validate(custom(function = "validate_future_date"))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub date: Option<DateTime<Utc>>,
    pub category: String,
    pub repeat: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_details: Option<RepeatDetails>,
    pub media: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventResponse {
    fn from(e: Event) -> Self {
        let repeat_details = match (e.repeat_frequency, e.repeat_unit) {
            (Some(frequency), Some(unit)) => Some(RepeatDetails {
                frequency,
                unit,
                end_date: e.repeat_end_date,
            }),
            _ => None,
        };
        Self {
            id: e.id,
            user_id: e.user_id,
            title: e.title,
            description: e.description,
            date: e.date,
            category: e.category,
            repeat: e.repeat,
            repeat_details,
            media: e.media,
            tags: e.tags,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventCreateRequest {
    #[validate(length(
        min = 1,
        max = 30,
        message = "Title must be between 1 and 30 characters"
    ))]
    pub title: String,
    #[validate(length(max = 255, message = "Description cannot exceed 255 characters"))]
    pub description: Option<String>,
    /// Must be strictly in the future when present. Checked at validation
    /// time only, never re-checked later.
    #[validate(custom(function = "validate_future_date"))]
    pub date: Option<DateTime<Utc>>,
    #[validate(length(max = 50, message = "Category cannot exceed 50 characters"))]
    pub category: Option<String>,
    #[validate(custom(function = "validate_repeat"))]
    pub repeat: Option<String>,
    #[validate(nested)]
    pub repeat_details: Option<RepeatDetails>,
    #[validate(custom(function = "validate_media_urls"))]
    pub media: Option<Vec<String>>,
    #[validate(custom(function = "validate_tags"))]
    pub tags: Option<Vec<String>>,
}

impl EventCreateRequest {
    /// Derive rules plus the conditional: `repeatDetails` is required iff
    /// `repeat` is CUSTOM.
    pub fn validate_payload(&self) -> Result<(), AppError> {
        collect_payload_errors(
            self.validate(),
            self.repeat.as_deref(),
            self.repeat_details.is_some(),
        )
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdateRequest {
    #[validate(length(
        min = 1,
        max = 30,
        message = "Title must be between 1 and 30 characters"
    ))]
    pub title: Option<String>,
    #[validate(length(max = 255, message = "Description cannot exceed 255 characters"))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_future_date"))]
    pub date: Option<DateTime<Utc>>,
    #[validate(length(max = 50, message = "Category cannot exceed 50 characters"))]
    pub category: Option<String>,
    #[validate(custom(function = "validate_repeat"))]
    pub repeat: Option<String>,
    #[validate(nested)]
    pub repeat_details: Option<RepeatDetails>,
    #[validate(custom(function = "validate_media_urls"))]
    pub media: Option<Vec<String>>,
    #[validate(custom(function = "validate_tags"))]
    pub tags: Option<Vec<String>>,
}

impl EventUpdateRequest {
    pub fn validate_payload(&self) -> Result<(), AppError> {
        collect_payload_errors(
            self.validate(),
            self.repeat.as_deref(),
            self.repeat_details.is_some(),
        )
    }
}

/// Merges derive violations with the CUSTOM/repeatDetails conditional so a
/// payload breaking both reports everything in one batch.
fn collect_payload_errors(
    derive: Result<(), ValidationErrors>,
    repeat: Option<&str>,
    has_details: bool,
) -> Result<(), AppError> {
    let mut fields = match derive {
        Ok(()) => Vec::new(),
        Err(e) => match AppError::from(e) {
            AppError::Validation(fields) => fields,
            _ => unreachable!(),
        },
    };
    if repeat == Some("CUSTOM") && !has_details {
        fields.push(FieldError::new(
            "repeatDetails",
            "Repeat details are required when repeat is CUSTOM",
        ));
    }
    if fields.is_empty() {
        Ok(())
    } else {
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        Err(AppError::Validation(fields))
    }
}

/// Owner-scoped list filter; combined with the shared pagination query.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct EventFilterQuery {
    /// Inclusive lower bound on the event date.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the event date.
    pub to: Option<DateTime<Utc>>,
    pub category: Option<String>,
    /// Substring match against title and description.
    pub search: Option<String>,
}

fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn validate_future_date(date: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *date > Utc::now() {
        Ok(())
    } else {
        Err(validation_error("date", "Date must be in the future"))
    }
}

fn validate_repeat(repeat: &str) -> Result<(), ValidationError> {
    if REPEAT_TYPES.contains(&repeat) {
        Ok(())
    } else {
        Err(validation_error(
            "repeat",
            "Repeat must be one of YEARLY, HALF_YEARLY, MONTHLY, WEEKLY, ONCE, CUSTOM",
        ))
    }
}

fn validate_repeat_unit(unit: &str) -> Result<(), ValidationError> {
    if REPEAT_UNITS.contains(&unit) {
        Ok(())
    } else {
        Err(validation_error(
            "unit",
            "Unit must be one of days, weeks, months, years",
        ))
    }
}

fn validate_media_urls(media: &Vec<String>) -> Result<(), ValidationError> {
    use validator::ValidateUrl;
    if media.iter().any(|url| !url.validate_url()) {
        return Err(validation_error("media", "Media must be valid URLs"));
    }
    Ok(())
}

fn validate_tags(tags: &Vec<String>) -> Result<(), ValidationError> {
    if tags.iter().any(|t| t.trim().is_empty() || t.len() > 30) {
        return Err(validation_error(
            "tags",
            "Tags must be non-empty and at most 30 characters",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base_create() -> EventCreateRequest {
        EventCreateRequest {
            title: "Doctor appointment".into(),
            description: Some("Annual check-up".into()),
            date: Some(Utc::now() + Duration::days(7)),
            category: Some("Health".into()),
            repeat: None,
            repeat_details: None,
            media: None,
            tags: Some(vec!["appointment".into()]),
        }
    }

    #[test]
    fn accepts_minimal_event() {
        assert!(base_create().validate_payload().is_ok());
    }

    #[test]
    fn custom_repeat_without_details_is_rejected() {
        let mut req = base_create();
        req.repeat = Some("CUSTOM".into());
        let err = req.validate_payload().unwrap_err();
        let AppError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert!(fields.iter().any(|f| f.field == "repeatDetails"));
    }

    #[test]
    fn custom_repeat_with_valid_details_is_accepted() {
        let mut req = base_create();
        req.repeat = Some("CUSTOM".into());
        req.repeat_details = Some(RepeatDetails {
            frequency: 2,
            unit: "weeks".into(),
            end_date: Some(Utc::now() + Duration::days(365)),
        });
        assert!(req.validate_payload().is_ok());
    }

    #[test]
    fn rejects_past_dates_and_unknown_repeat() {
        let mut req = base_create();
        req.date = Some(Utc::now() - Duration::hours(1));
        assert!(req.validate_payload().is_err());

        let mut req = base_create();
        req.repeat = Some("DAILY".into());
        assert!(req.validate_payload().is_err());
    }

    #[test]
    fn update_reports_derive_and_conditional_violations_together() {
        let req = EventUpdateRequest {
            title: Some("x".repeat(40)),
            description: None,
            date: None,
            category: None,
            repeat: Some("CUSTOM".into()),
            repeat_details: None,
            media: None,
            tags: None,
        };
        let AppError::Validation(fields) = req.validate_payload().unwrap_err() else {
            panic!("expected validation error");
        };
        assert!(fields.iter().any(|f| f.field == "title"));
        assert!(fields.iter().any(|f| f.field == "repeatDetails"));
    }

    #[test]
    fn nested_detail_violations_use_dotted_paths() {
        let mut req = base_create();
        req.repeat = Some("CUSTOM".into());
        req.repeat_details = Some(RepeatDetails {
            frequency: 0,
            unit: "fortnights".into(),
            end_date: None,
        });
        let AppError::Validation(fields) = req.validate_payload().unwrap_err() else {
            panic!("expected validation error");
        };
        assert!(fields.iter().any(|f| f.field == "repeatDetails.frequency"));
        assert!(fields.iter().any(|f| f.field == "repeatDetails.unit"));
    }

    #[test]
    fn response_reassembles_nested_repeat_details() {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Standup".into(),
            description: String::new(),
            date: None,
            category: "GENERAL".into(),
            repeat: "CUSTOM".into(),
            repeat_frequency: Some(2),
            repeat_unit: Some("weeks".into()),
            repeat_end_date: None,
            media: vec![],
            tags: vec![],
            created_at: now,
            updated_at: now,
        };
        let resp = EventResponse::from(event);
        let details = resp.repeat_details.expect("details should be present");
        assert_eq!(details.frequency, 2);
        assert_eq!(details.unit, "weeks");
    }
}
