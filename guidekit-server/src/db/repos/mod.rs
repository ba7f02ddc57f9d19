//! Staging store seam and its implementations
//!
//! - `PgStagingRepo`: Postgres, one statement per operation
//! - `MemoryStagingStore`: in-process map for tests and local UI work

pub mod memory;
pub mod staging;

pub use memory::MemoryStagingStore;
pub use staging::PgStagingRepo;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Disposition, ItemId, Paginated, Pagination, ReviewedItem, StagingItem};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    /// Row content the domain types cannot represent
    #[error("invalid row data: {0}")]
    InvalidData(String),
}

/// Persistent staging queue operations
#[async_trait]
pub trait StagingStore: Send + Sync {
    /// Set disposition and review time on every existing id in one update.
    ///
    /// Ids with no record are skipped. Returns the rows actually written,
    /// ordered by id.
    async fn set_disposition(
        &self,
        ids: &[ItemId],
        disposition: Disposition,
        reviewed_at: DateTime<Utc>,
    ) -> Result<Vec<ReviewedItem>, DbError>;

    /// Newest first, optionally filtered by disposition.
    async fn list(
        &self,
        status: Option<Disposition>,
        page: Pagination,
    ) -> Result<Paginated<StagingItem>, DbError>;

    async fn get(&self, id: ItemId) -> Result<StagingItem, DbError>;

    /// Short backend label reported by `/health`
    fn backend(&self) -> &'static str;
}
