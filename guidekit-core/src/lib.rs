pub mod booking;
pub mod config;
pub mod image_policy;

pub use booking::{
    booking_url, default_booking_url, generate_booking_urls, BookingLinks, BookingUrls, Category,
    Platform, Venue, DEFAULT_LOCATION,
};
pub use config::GuideConfig;
pub use image_policy::{ImageMetrics, ImagePolicyConfig, ImageRejection, ValidationMode};
