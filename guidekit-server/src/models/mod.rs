//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod staging;
pub mod pagination;

pub use validation::ValidationError;
pub use staging::{Disposition, ItemId, ReviewAction, ReviewBatch, ReviewedItem, StagingItem};
pub use pagination::{Pagination, Paginated, PaginationParams};
