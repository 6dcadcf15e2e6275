//! Errors raised by the configuration and bridge surfaces
//!
//! The pagination pass itself never fails: degenerate measurements and
//! geometry collapse to a single page instead of surfacing here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaginationError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid page number {0}: page numbers start at 1")]
    InvalidPageNumber(u32),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PaginationError>;
