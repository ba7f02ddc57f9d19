//! guidekit-server: staging review gateway over HTTP
//!
//! Moderators approve or reject batches of scraped content waiting in
//! the staging queue. Everything else in the admin workflow reads.

pub mod db;
pub mod http;
pub mod models;
pub mod review;

pub use db::repos::{DbError, MemoryStagingStore, PgStagingRepo, StagingStore};
pub use http::{build_router, run_server, AppState, ServerConfig};
pub use review::{review_batch, ReviewError, ReviewOutcome};
