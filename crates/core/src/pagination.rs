//! Page/limit pagination for API responses
//!
//! # Example
//!
//! ```
//! use reelgraph_core::pagination::{PaginatedResponse, PaginationParams};
//!
//! let params = PaginationParams { page: 2, limit: 2 };
//! let titles = vec!["A", "B", "C", "D", "E"];
//!
//! let response = PaginatedResponse::from_items(titles, &params);
//! assert_eq!(response.items, vec!["C", "D"]);
//! assert!(response.has_more);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::RecommenderError;

/// Default number of items per page
pub const DEFAULT_LIMIT: usize = 10;

/// Maximum number of items per page
pub const MAX_LIMIT: usize = 100;

/// 1-based page number and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PaginationParams {
    /// Build from optional request values, applying defaults and clamping the limit.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if `page` or `limit` is zero.
    pub fn new(page: Option<usize>, limit: Option<usize>) -> Result<Self, RecommenderError> {
        let page = page.unwrap_or_else(default_page);
        let limit = limit.unwrap_or_else(default_limit);

        if page == 0 {
            return Err(RecommenderError::ValidationError(
                "page must be at least 1".to_string(),
            ));
        }
        if limit == 0 {
            return Err(RecommenderError::ValidationError(
                "limit must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            page,
            limit: limit.min(MAX_LIMIT),
        })
    }

    /// Number of items to skip
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub has_more: bool,
}

impl<T> PaginatedResponse<T> {
    /// Slice `items` down to the requested page
    pub fn from_items(items: Vec<T>, params: &PaginationParams) -> Self {
        let total = items.len();
        let offset = params.offset();
        let page_items: Vec<T> = items.into_iter().skip(offset).take(params.limit).collect();
        let has_more = offset.saturating_add(page_items.len()) < total;

        Self {
            items: page_items,
            total,
            page: params.page,
            limit: params.limit,
            has_more,
        }
    }
}
