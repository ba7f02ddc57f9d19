//! Image policy - thresholds and cheap predicates for candidate image URLs
//!
//! The policy is built once at process start (usually from environment
//! variables) and passed by reference afterwards. Nothing re-reads the
//! environment per call.
//!
//! Environment variables:
//!   RELAXED_VALIDATION     # global relax toggle (default: true)
//!   SKIP_HEAD_FOR_TRUSTED  # skip network probe for trusted hosts (default: true)
//!   MIN_WIDTH              # minimum width in px (400 relaxed / 800 strict)
//!   MIN_FILE_KB            # minimum file size in KB (30 relaxed / 50 strict)
//!   MIN_AR / MAX_AR        # width/height ratio bounds (0.4 / 3.2)
//!   ALLOW_EXTS             # comma separated extensions (jpg,jpeg,webp,png)
//!   TRUSTED_HOSTS          # comma separated host fragments

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;
use url::Url;

pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "webp", "png"];

pub const DEFAULT_TRUSTED_HOSTS: &[&str] = &[
    "images.unsplash.com",
    "images.pexels.com",
    "cdn.pixabay.com",
    "upload.wikimedia.org",
];

const RELAXED_MIN_WIDTH: u32 = 400;
const STRICT_MIN_WIDTH: u32 = 800;
const RELAXED_MIN_FILE_KB: u64 = 30;
const STRICT_MIN_FILE_KB: u64 = 50;
const DEFAULT_MIN_AR: f64 = 0.4;
const DEFAULT_MAX_AR: f64 = 3.2;

/// Label for operator-facing logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Relaxed,
    Strict,
}

impl ValidationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relaxed => "RELAXED",
            Self::Strict => "STRICT",
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable image policy snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePolicyConfig {
    pub relaxed_validation: bool,
    pub skip_head_for_trusted: bool,
    pub min_width: u32,
    pub min_file_kb: u64,
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
    /// Lower-cased, without leading dot
    pub allowed_extensions: BTreeSet<String>,
    /// Lower-cased host fragments
    pub trusted_hosts: Vec<String>,
}

impl Default for ImagePolicyConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ImagePolicyConfig {
    /// Read the policy from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the policy from an arbitrary key lookup.
    ///
    /// Absent or malformed values fall back to defaults. The width and file
    /// size defaults depend on the resolved relaxed flag.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let relaxed_validation = parse_bool(lookup("RELAXED_VALIDATION")).unwrap_or(true);
        let skip_head_for_trusted = parse_bool(lookup("SKIP_HEAD_FOR_TRUSTED")).unwrap_or(true);

        let (width_default, kb_default) = if relaxed_validation {
            (RELAXED_MIN_WIDTH, RELAXED_MIN_FILE_KB)
        } else {
            (STRICT_MIN_WIDTH, STRICT_MIN_FILE_KB)
        };

        let min_width = parse_num(lookup("MIN_WIDTH")).unwrap_or(width_default);
        let min_file_kb = parse_num(lookup("MIN_FILE_KB")).unwrap_or(kb_default);
        let min_aspect_ratio = parse_ratio(lookup("MIN_AR")).unwrap_or(DEFAULT_MIN_AR);
        let max_aspect_ratio = parse_ratio(lookup("MAX_AR")).unwrap_or(DEFAULT_MAX_AR);

        let allowed_extensions = parse_list(lookup("ALLOW_EXTS"))
            .map(|exts| {
                exts.into_iter()
                    .map(|e| e.trim_start_matches('.').to_owned())
                    .collect::<BTreeSet<_>>()
            })
            .unwrap_or_else(|| {
                DEFAULT_ALLOWED_EXTENSIONS
                    .iter()
                    .map(|s| (*s).to_owned())
                    .collect()
            });

        let trusted_hosts = parse_list(lookup("TRUSTED_HOSTS")).unwrap_or_else(|| {
            DEFAULT_TRUSTED_HOSTS
                .iter()
                .map(|s| (*s).to_owned())
                .collect()
        });

        Self {
            relaxed_validation,
            skip_head_for_trusted,
            min_width,
            min_file_kb,
            min_aspect_ratio,
            max_aspect_ratio,
            allowed_extensions,
            trusted_hosts,
        }
    }

    pub fn validation_mode(&self) -> ValidationMode {
        if self.relaxed_validation {
            ValidationMode::Relaxed
        } else {
            ValidationMode::Strict
        }
    }

    /// True iff the URL's host contains any trusted fragment.
    ///
    /// Substring match, not a domain match: `evilimages.unsplash.com.example`
    /// passes. Unparseable input is never trusted.
    pub fn is_trusted_host(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };
        let host = host.to_lowercase();
        self.trusted_hosts
            .iter()
            .any(|trusted| host.contains(trusted.as_str()))
    }

    /// True iff the text after the final `.` of the path is an allowed extension.
    ///
    /// Accepts absolute URLs and bare paths such as `photo.JPG`.
    pub fn is_allowed_extension(&self, url: &str) -> bool {
        extension_of(url)
            .map(|ext| self.allowed_extensions.contains(&ext))
            .unwrap_or(false)
    }

    /// Whether a network probe is worth issuing for this URL.
    pub fn should_probe(&self, url: &str) -> bool {
        !(self.skip_head_for_trusted && self.is_trusted_host(url))
    }

    /// Check measured properties against the thresholds.
    ///
    /// Rules run in order (width, file size, aspect ratio) and the first
    /// failure is returned. Unknown measurements are skipped.
    pub fn assess(&self, metrics: &ImageMetrics) -> Result<(), ImageRejection> {
        if let Some(width) = metrics.width {
            if width < self.min_width {
                return Err(ImageRejection::TooNarrow {
                    width,
                    min: self.min_width,
                });
            }
        }

        if let Some(bytes) = metrics.bytes {
            let kb = bytes / 1024;
            if kb < self.min_file_kb {
                return Err(ImageRejection::TooSmall {
                    kb,
                    min: self.min_file_kb,
                });
            }
        }

        if let Some(ratio) = metrics.aspect_ratio() {
            if ratio < self.min_aspect_ratio || ratio > self.max_aspect_ratio {
                return Err(ImageRejection::AspectRatio {
                    ratio,
                    min: self.min_aspect_ratio,
                    max: self.max_aspect_ratio,
                });
            }
        }

        Ok(())
    }
}

/// Measured (or partially measured) image properties
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImageMetrics {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub bytes: Option<u64>,
}

impl ImageMetrics {
    /// width / height, when both are known and height is non-zero
    pub fn aspect_ratio(&self) -> Option<f64> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if h > 0 => Some(f64::from(w) / f64::from(h)),
            _ => None,
        }
    }
}

/// Reason an image failed the policy
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImageRejection {
    #[error("width {width}px is below minimum of {min}px")]
    TooNarrow { width: u32, min: u32 },

    #[error("file size {kb}KB is below minimum of {min}KB")]
    TooSmall { kb: u64, min: u64 },

    #[error("aspect ratio {ratio:.2} outside {min}..={max}")]
    AspectRatio { ratio: f64, min: f64, max: f64 },
}

fn extension_of(input: &str) -> Option<String> {
    let path = match Url::parse(input) {
        Ok(parsed) => parsed.path().to_owned(),
        Err(_) => input
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_owned(),
    };

    let (_, ext) = path.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

fn parse_bool(value: Option<String>) -> Option<bool> {
    match value?.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_num<T: std::str::FromStr>(value: Option<String>) -> Option<T> {
    value?.trim().parse().ok()
}

fn parse_ratio(value: Option<String>) -> Option<f64> {
    parse_num::<f64>(value).filter(|r| r.is_finite() && *r > 0.0)
}

fn parse_list(value: Option<String>) -> Option<Vec<String>> {
    let items: Vec<String> = value?
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
