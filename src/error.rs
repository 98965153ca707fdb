use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::response::ApiResponse;

/// One violated validation rule. Validation failures carry one of these per
/// broken rule, never just the first.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Single-field validation failure, e.g. a malformed `:id` path parameter.
    pub fn invalid_field(field: &str, message: &str) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                serde_json::to_value(fields).unwrap_or_default(),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.into()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.into()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.into()),
            // Never leak internal detail to the client.
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".into(),
            ),
        };
        (status, Json(ApiResponse::failure(error))).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!("database error: {e}");
        AppError::Internal
    }
}

/// Flattens `validator` output into `{field, message}` pairs. Nested structs
/// produce dotted paths ("repeatDetails.frequency"); every violated rule is
/// reported, not just the first.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = Vec::new();
        flatten("", &errors, &mut fields);
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::Validation(fields)
    }
}

fn flatten(prefix: &str, errors: &ValidationErrors, out: &mut Vec<FieldError>) {
    for (field, kind) in errors.errors() {
        let path = join_path(prefix, field);
        match kind {
            ValidationErrorsKind::Field(errs) => {
                for e in errs {
                    out.push(FieldError {
                        field: path.clone(),
                        message: e
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("{path} is invalid")),
                    });
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    flatten(&format!("{path}.{idx}"), inner, out);
                }
            }
        }
    }
}

fn join_path(prefix: &str, field: &str) -> String {
    let field = camel_case(field);
    if prefix.is_empty() {
        field
    } else {
        format!("{prefix}.{field}")
    }
}

// Request bodies are camelCase on the wire; error paths must match them.
fn camel_case(field: &str) -> String {
    let mut parts = field.split('_');
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.extend(chars);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Inner {
        #[validate(range(min = 1, message = "Frequency must be at least 1"))]
        frequency: i32,
    }

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
        first_name: String,
        #[validate(email(message = "Invalid email format"))]
        email: String,
        #[validate(nested)]
        details: Inner,
    }

    fn failing_probe() -> Probe {
        Probe {
            first_name: "ab".into(),
            email: "nope".into(),
            details: Inner { frequency: 0 },
        }
    }

    #[test]
    fn collects_every_violation() {
        let err: AppError = failing_probe().validate().unwrap_err().into();
        let AppError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields.len(), 3);
        assert!(fields.iter().any(|f| f.field == "firstName"));
        assert!(fields.iter().any(|f| f.field == "email"));
        assert!(fields.iter().any(|f| f.field == "details.frequency"));
    }

    #[test]
    fn uses_declared_messages() {
        let err: AppError = failing_probe().validate().unwrap_err().into();
        let AppError::Validation(fields) = err else {
            panic!("expected validation error");
        };
        let email = fields.iter().find(|f| f.field == "email").unwrap();
        assert_eq!(email.message, "Invalid email format");
    }

    #[test]
    fn camel_cases_snake_fields() {
        assert_eq!(camel_case("first_name"), "firstName");
        assert_eq!(camel_case("repeat_details"), "repeatDetails");
        assert_eq!(camel_case("email"), "email");
    }
}
