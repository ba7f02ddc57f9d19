use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::booking::{BookingLinks, Platform, DEFAULT_LOCATION};

/// Optional file configuration for guidekit (~/.guidekit/config.toml)
///
/// Image policy thresholds are deliberately not here; they come from the
/// environment (see `image_policy`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuideConfig {
    #[serde(default)]
    pub booking: BookingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Location appended to partner search queries
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default)]
    pub affiliate: AffiliateConfig,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            affiliate: AffiliateConfig::default(),
        }
    }
}

/// Per-platform affiliate ids; `${VAR}` references are expanded on load
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AffiliateConfig {
    pub getyourguide: Option<String>,
    pub viator: Option<String>,
    pub booking: Option<String>,
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

impl GuideConfig {
    /// Load config from ~/.guidekit/config.toml, defaults if the file is absent
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&config_path)
    }

    /// Load config from an explicit path (must exist)
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {:?}", path))?;

        let mut config: Self =
            toml::from_str(&content).context("Failed to parse config file (invalid TOML)")?;

        config.expand_variables();
        Ok(config)
    }

    /// Get config file path: ~/.guidekit/config.toml
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Get config directory: ~/.guidekit
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".guidekit")
    }

    /// Link builder seeded from the booking section
    pub fn booking_links(&self) -> BookingLinks {
        let affiliate = &self.booking.affiliate;
        let mut links = BookingLinks::new(self.booking.location.clone());
        for (platform, id) in [
            (Platform::GetYourGuide, &affiliate.getyourguide),
            (Platform::Viator, &affiliate.viator),
            (Platform::Booking, &affiliate.booking),
        ] {
            if let Some(id) = id {
                links = links.with_affiliate(platform, id.clone());
            }
        }
        links
    }

    /// Expand ${VAR} references in affiliate ids from the environment
    fn expand_variables(&mut self) {
        let vars: HashMap<String, String> = env::vars().collect();
        let affiliate = &mut self.booking.affiliate;
        for id in [
            &mut affiliate.getyourguide,
            &mut affiliate.viator,
            &mut affiliate.booking,
        ]
        .into_iter()
        .flatten()
        {
            *id = expand_string(id, &vars);
        }
    }

    /// Save config to an explicit path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_str =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(path, toml_str).context(format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }
}

/// Expand ${var} references in a string; unknown variables expand to nothing
fn expand_string(s: &str, vars: &HashMap<String, String>) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                if let Some(value) = vars.get(key) {
                    result.push_str(value);
                }
                rest = &after[end + 1..];
            }
            None => {
                result.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    result.push_str(rest);
    result
}
