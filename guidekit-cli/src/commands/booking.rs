//! Booking link command
//!
//! Prints the outbound link a venue page would render, or all five
//! partner links with `--all`.

use anyhow::Result;
use clap::Parser;
use serde_json::json;

use guidekit_core::{GuideConfig, Venue};

#[derive(Parser, Debug)]
pub struct BookingArgs {
    /// Venue name (e.g. "Hagia Sophia")
    pub name: String,

    /// Venue category (activities, hotels, restaurants, shopping)
    #[arg(long, short = 'c', default_value = "")]
    pub category: String,

    /// Curated booking URL; returned unchanged when non-empty
    #[arg(long)]
    pub custom_url: Option<String>,

    /// Location appended to the search query (default: config, then Istanbul)
    #[arg(long, short = 'l')]
    pub location: Option<String>,

    /// Print the link for every partner platform
    #[arg(long, conflicts_with = "custom_url")]
    pub all: bool,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run_booking(args: BookingArgs) -> Result<()> {
    let mut config = GuideConfig::load()?;
    if let Some(location) = args.location {
        config.booking.location = location;
    }
    let links = config.booking_links();

    if args.all {
        let urls = links.all(&args.name);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&urls)?);
        } else {
            for (platform, url) in urls.iter() {
                println!("{:<12} {}", platform, url);
            }
        }
        return Ok(());
    }

    let venue = Venue {
        name: args.name,
        category: args.category,
        booking_url: args.custom_url,
    };
    let url = links.for_venue(&venue);
    tracing::debug!(venue = %venue.name, category = %venue.category, "booking link resolved");

    if args.json {
        let body = json!({
            "name": venue.name,
            "category": venue.category,
            "location": links.location(),
            "url": url,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!("{}", url);
    }

    Ok(())
}
