//! Command implementations for guidekit CLI

pub mod booking;
pub mod image;
pub mod serve;

// Re-export main dispatcher functions for flat access from main.rs
pub use booking::run_booking;
pub use image::run_image;
pub use serve::run_serve;
