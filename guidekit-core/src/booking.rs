//! Booking links - outbound partner search URLs for venues
//!
//! Every venue without a curated booking URL gets a search link on one
//! partner platform, chosen by category. All functions here are total:
//! odd venue names just produce odd (but validly encoded) query strings.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Location appended to every search query unless overridden
pub const DEFAULT_LOCATION: &str = "Istanbul";

/// Partner platforms with a search URL template
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    GetYourGuide,
    Viator,
    Booking,
    TripAdvisor,
    Google,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::GetYourGuide,
        Platform::Viator,
        Platform::Booking,
        Platform::TripAdvisor,
        Platform::Google,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetYourGuide => "getyourguide",
            Self::Viator => "viator",
            Self::Booking => "booking",
            Self::TripAdvisor => "tripadvisor",
            Self::Google => "google",
        }
    }

    /// Search URL for an already percent-encoded query
    fn search_url(&self, encoded_query: &str) -> String {
        match self {
            Self::GetYourGuide => format!("https://www.getyourguide.com/s/?q={encoded_query}"),
            Self::Viator => format!("https://www.viator.com/searchResults/all?text={encoded_query}"),
            Self::Booking => format!("https://www.booking.com/searchresults.html?ss={encoded_query}"),
            Self::TripAdvisor => format!("https://www.tripadvisor.com/Search?q={encoded_query}"),
            Self::Google => format!("https://www.google.com/search?q={encoded_query}"),
        }
    }

    /// Query parameter carrying the affiliate id, if the platform has one
    fn affiliate_param(&self) -> Option<&'static str> {
        match self {
            Self::GetYourGuide => Some("partner_id"),
            Self::Viator => Some("pid"),
            Self::Booking => Some("aid"),
            Self::TripAdvisor | Self::Google => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Venue categories with a dedicated platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Activities,
    Hotels,
    Restaurants,
    Shopping,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activities => "activities",
            Self::Hotels => "hotels",
            Self::Restaurants => "restaurants",
            Self::Shopping => "shopping",
        }
    }

    /// Platform a category defaults to
    pub fn platform(&self) -> Platform {
        match self {
            Self::Activities => Platform::GetYourGuide,
            Self::Hotels => Platform::Booking,
            Self::Restaurants | Self::Shopping => Platform::TripAdvisor,
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activities" => Ok(Self::Activities),
            "hotels" => Ok(Self::Hotels),
            "restaurants" => Ok(Self::Restaurants),
            "shopping" => Ok(Self::Shopping),
            other => Err(format!("unknown category '{other}'")),
        }
    }
}

/// Platform used for a raw category string; unknown values fall back to Google.
pub fn platform_for_category(category: &str) -> Platform {
    category
        .parse::<Category>()
        .map(|c| c.platform())
        .unwrap_or(Platform::Google)
}

/// One search URL per platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingUrls {
    pub getyourguide: String,
    pub viator: String,
    pub booking: String,
    pub tripadvisor: String,
    pub google: String,
}

impl BookingUrls {
    pub fn get(&self, platform: Platform) -> &str {
        match platform {
            Platform::GetYourGuide => &self.getyourguide,
            Platform::Viator => &self.viator,
            Platform::Booking => &self.booking,
            Platform::TripAdvisor => &self.tripadvisor,
            Platform::Google => &self.google,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Platform, &str)> {
        Platform::ALL.into_iter().map(move |p| (p, self.get(p)))
    }

    fn into_platform(self, platform: Platform) -> String {
        match platform {
            Platform::GetYourGuide => self.getyourguide,
            Platform::Viator => self.viator,
            Platform::Booking => self.booking,
            Platform::TripAdvisor => self.tripadvisor,
            Platform::Google => self.google,
        }
    }
}

fn encoded_query(venue_name: &str, location: &str) -> String {
    urlencoding::encode(&format!("{venue_name} {location}")).into_owned()
}

/// Build the search URL on every platform for `"<venue_name> <location>"`.
pub fn generate_booking_urls(venue_name: &str, location: &str) -> BookingUrls {
    let q = encoded_query(venue_name, location);
    BookingUrls {
        getyourguide: Platform::GetYourGuide.search_url(&q),
        viator: Platform::Viator.search_url(&q),
        booking: Platform::Booking.search_url(&q),
        tripadvisor: Platform::TripAdvisor.search_url(&q),
        google: Platform::Google.search_url(&q),
    }
}

/// Search URL on the platform matching `category`.
pub fn default_booking_url(venue_name: &str, category: &str, location: &str) -> String {
    generate_booking_urls(venue_name, location).into_platform(platform_for_category(category))
}

/// Curated URL when present and non-empty, category default otherwise.
pub fn booking_url(
    venue_name: &str,
    category: &str,
    custom_url: Option<&str>,
    location: &str,
) -> String {
    match custom_url {
        Some(url) if !url.is_empty() => url.to_owned(),
        _ => default_booking_url(venue_name, category, location),
    }
}

/// A venue listing as consumed by link generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub booking_url: Option<String>,
}

impl Venue {
    pub fn booking_url(&self, location: &str) -> String {
        booking_url(
            &self.name,
            &self.category,
            self.booking_url.as_deref(),
            location,
        )
    }
}

/// Link builder carrying the location and per-platform affiliate ids.
///
/// Curated URLs are returned untouched; only generated search URLs get
/// the affiliate parameter.
#[derive(Debug, Clone)]
pub struct BookingLinks {
    location: String,
    affiliate: BTreeMap<Platform, String>,
}

impl Default for BookingLinks {
    fn default() -> Self {
        Self::new(DEFAULT_LOCATION)
    }
}

impl BookingLinks {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            affiliate: BTreeMap::new(),
        }
    }

    pub fn with_affiliate(mut self, platform: Platform, id: impl Into<String>) -> Self {
        let id = id.into();
        if !id.is_empty() {
            self.affiliate.insert(platform, id);
        }
        self
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn all(&self, venue_name: &str) -> BookingUrls {
        let mut urls = generate_booking_urls(venue_name, &self.location);
        for platform in Platform::ALL {
            let tagged = self.tag(platform, urls.get(platform));
            match platform {
                Platform::GetYourGuide => urls.getyourguide = tagged,
                Platform::Viator => urls.viator = tagged,
                Platform::Booking => urls.booking = tagged,
                Platform::TripAdvisor => urls.tripadvisor = tagged,
                Platform::Google => urls.google = tagged,
            }
        }
        urls
    }

    pub fn for_venue(&self, venue: &Venue) -> String {
        match venue.booking_url.as_deref() {
            Some(url) if !url.is_empty() => url.to_owned(),
            _ => {
                let platform = platform_for_category(&venue.category);
                let url = default_booking_url(&venue.name, &venue.category, &self.location);
                self.tag(platform, &url)
            }
        }
    }

    fn tag(&self, platform: Platform, url: &str) -> String {
        match (platform.affiliate_param(), self.affiliate.get(&platform)) {
            (Some(param), Some(id)) => {
                format!("{url}&{param}={}", urlencoding::encode(id))
            }
            _ => url.to_owned(),
        }
    }
}
