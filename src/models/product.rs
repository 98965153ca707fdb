use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::{AppError, FieldError};

#[derive(Debug, sqlx::FromRow, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub stock: i32,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProductCreateRequest {
    #[validate(length(
        min = 3,
        max = 100,
        message = "Product name must be between 3 and 100 characters"
    ))]
    pub name: String,
    #[validate(length(
        min = 10,
        max = 500,
        message = "Description must be between 10 and 500 characters"
    ))]
    pub description: String,
    /// Positive, at most two decimal places.
    #[validate(custom(function = "validate_price"))]
    pub price: f64,
    #[validate(length(
        min = 3,
        max = 50,
        message = "Category must be between 3 and 50 characters"
    ))]
    pub category: String,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i32,
    #[validate(
        length(min = 1, message = "At least one image URL is required"),
        custom(function = "validate_image_urls")
    )]
    pub images: Vec<String>,
}

/// Update variant: every field optional, at least one required.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProductUpdateRequest {
    #[validate(length(
        min = 3,
        max = 100,
        message = "Product name must be between 3 and 100 characters"
    ))]
    pub name: Option<String>,
    #[validate(length(
        min = 10,
        max = 500,
        message = "Description must be between 10 and 500 characters"
    ))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_price"))]
    pub price: Option<f64>,
    #[validate(length(
        min = 3,
        max = 50,
        message = "Category must be between 3 and 50 characters"
    ))]
    pub category: Option<String>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i32>,
    #[validate(
        length(min = 1, message = "At least one image URL is required"),
        custom(function = "validate_image_urls")
    )]
    pub images: Option<Vec<String>>,
}

impl ProductUpdateRequest {
    pub fn validate_payload(&self) -> Result<(), AppError> {
        if self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.stock.is_none()
            && self.images.is_none()
        {
            return Err(AppError::Validation(vec![FieldError::new(
                "body",
                "At least one field is required for update",
            )]));
        }
        self.validate().map_err(AppError::from)
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ProductFilterQuery {
    pub category: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<f64>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<f64>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ProductSearchQuery {
    /// Substring match against the product name.
    pub query: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<f64>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Matches the filter regardless of page/limit.
    pub total_count: i64,
}

fn validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn validate_price(price: f64) -> Result<(), ValidationError> {
    if price <= 0.0 {
        return Err(validation_error("price", "Price must be a positive value"));
    }
    let cents = price * 100.0;
    if (cents - cents.round()).abs() > 1e-6 {
        return Err(validation_error(
            "price",
            "Price cannot have more than 2 decimal places",
        ));
    }
    Ok(())
}

fn validate_image_urls(images: &Vec<String>) -> Result<(), ValidationError> {
    if images.iter().any(|url| url.trim().is_empty()) {
        return Err(validation_error("images", "Image URL cannot be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> ProductCreateRequest {
        ProductCreateRequest {
            name: "Walnut desk".into(),
            description: "Solid walnut standing desk, 140x70cm".into(),
            price: 499.99,
            category: "furniture".into(),
            stock: 12,
            images: vec!["https://cdn.example.com/desk.jpg".into()],
        }
    }

    #[test]
    fn accepts_valid_product() {
        assert!(valid_create().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_and_sub_cent_prices() {
        for price in [0.0, -3.5, 19.999] {
            let mut req = valid_create();
            req.price = price;
            assert!(req.validate().is_err(), "price {price} should fail");
        }
    }

    #[test]
    fn rejects_empty_image_list_and_blank_urls() {
        let mut req = valid_create();
        req.images = vec![];
        assert!(req.validate().is_err());
        req.images = vec!["  ".into()];
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_requires_at_least_one_field() {
        let empty = ProductUpdateRequest {
            name: None,
            description: None,
            price: None,
            category: None,
            stock: None,
            images: None,
        };
        assert!(empty.validate_payload().is_err());

        let partial = ProductUpdateRequest {
            stock: Some(3),
            ..empty
        };
        assert!(partial.validate_payload().is_ok());
    }

    #[test]
    fn update_still_checks_field_rules() {
        let req = ProductUpdateRequest {
            name: Some("ab".into()),
            description: None,
            price: None,
            category: None,
            stock: None,
            images: None,
        };
        assert!(req.validate_payload().is_err());
    }
}
