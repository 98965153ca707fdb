use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub gender: String,
    /// One of "admin", "user", "superAdmin".
    pub role: String,
    pub password_hash: String,
    /// Latest issued refresh token; compared on refresh, overwritten on rotation.
    pub refresh_token: Option<String>,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == "admin" || self.role == "superAdmin"
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// "Mr." or "Mrs."
    #[validate(custom(function = "validate_title"))]
    pub title: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    /// Exactly 10 digits.
    #[validate(custom(function = "validate_phone"))]
    pub phone: String,
    #[validate(length(min = 1, message = "Gender is required"))]
    pub gender: String,
    #[validate(length(
        min = 8,
        max = 32,
        message = "Password must be between 8 and 32 characters"
    ))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(
        min = 8,
        max = 32,
        message = "Password must be between 8 and 32 characters"
    ))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

/// User fields exposed to clients. The password hash never leaves the service
/// layer.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub role: String,
    pub email: String,
    pub phone: String,
}

impl From<&User> for UserProfile {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            title: u.title.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            gender: u.gender.clone(),
            role: u.role.clone(),
            email: u.email.clone(),
            phone: u.phone.clone(),
        }
    }
}

/// User object returned by login/refresh: the token payload fields plus
/// gender, which stays out of the token itself.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthUserData {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub gender: String,
}

impl From<&User> for AuthUserData {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
            phone: u.phone.clone(),
            role: u.role.clone(),
            gender: u.gender.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokens {
    pub message: String,
    pub user: AuthUserData,
    pub access_token: String,
    pub refresh_token: String,
}

fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    if title == "Mr." || title == "Mrs." {
        Ok(())
    } else {
        Err(validation_error("title", "Title must be \"Mr.\" or \"Mrs.\""))
    }
}

fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if phone.len() == 10 && phone.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(validation_error(
            "phone",
            "Phone number must be exactly 10 digits",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_signup() -> SignupRequest {
        SignupRequest {
            title: "Mr.".into(),
            first_name: "Ravi".into(),
            last_name: "Sharma".into(),
            email: "ravi@example.com".into(),
            phone: "9876543210".into(),
            gender: "male".into(),
            password: "s3cret-pass".into(),
        }
    }

    #[test]
    fn accepts_valid_signup() {
        assert!(valid_signup().validate().is_ok());
    }

    #[test]
    fn rejects_unknown_title() {
        let mut req = valid_signup();
        req.title = "Dr.".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn rejects_short_and_alphabetic_phones() {
        for phone in ["12345", "98765432101", "98765abcde"] {
            let mut req = valid_signup();
            req.phone = phone.into();
            assert!(req.validate().is_err(), "phone {phone:?} should fail");
        }
    }

    #[test]
    fn rejects_password_outside_8_to_32() {
        let mut req = valid_signup();
        req.password = "short".into();
        assert!(req.validate().is_err());
        req.password = "x".repeat(33);
        assert!(req.validate().is_err());
    }

    #[test]
    fn profile_excludes_password_hash() {
        let body = serde_json::to_value(UserProfile {
            id: Uuid::new_v4(),
            title: "Mr.".into(),
            first_name: "Ravi".into(),
            last_name: "Sharma".into(),
            gender: "male".into(),
            role: "user".into(),
            email: "ravi@example.com".into(),
            phone: "9876543210".into(),
        })
        .unwrap();
        assert!(body.get("password").is_none());
        assert!(body.get("passwordHash").is_none());
    }
}
