pub mod event;
pub mod product;
pub mod rating;
pub mod user;

use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Shared pagination query parameters. 1-indexed page, defaults page=1 /
/// limit=10, `offset = (page - 1) * limit`.
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.filter(|p| *p >= 1).unwrap_or(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.filter(|l| *l >= 1).unwrap_or(10)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}
