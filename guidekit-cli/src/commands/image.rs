//! Image policy commands
//!
//! `guidekit image check <url>` runs the cheap predicates, optionally a
//! HEAD probe, and the threshold assessment for whatever is known.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use guidekit_core::{ImageMetrics, ImagePolicyConfig};

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
pub struct ImageArgs {
    #[command(subcommand)]
    pub command: ImageCommands,
}

#[derive(Subcommand, Debug)]
pub enum ImageCommands {
    /// Evaluate a candidate image URL
    Check(CheckArgs),
    /// Print the effective image policy
    Policy,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Image URL (or bare file name)
    pub url: String,

    /// Known width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Known height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Known file size in bytes
    #[arg(long)]
    pub bytes: Option<u64>,

    /// Issue a HEAD request for the file size unless the host is exempt
    #[arg(long)]
    pub probe: bool,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    url: String,
    mode: &'static str,
    trusted_host: bool,
    allowed_extension: bool,
    probed: bool,
    content_type: Option<String>,
    metrics: MetricsReport,
    rejection: Option<String>,
}

#[derive(Debug, Serialize)]
struct MetricsReport {
    width: Option<u32>,
    height: Option<u32>,
    bytes: Option<u64>,
}

pub async fn run_image(args: ImageArgs) -> Result<()> {
    let policy = ImagePolicyConfig::from_env();
    match args.command {
        ImageCommands::Check(check) => run_check(&policy, check).await,
        ImageCommands::Policy => {
            print_policy(&policy);
            Ok(())
        }
    }
}

async fn run_check(policy: &ImagePolicyConfig, args: CheckArgs) -> Result<()> {
    let mut metrics = ImageMetrics {
        width: args.width,
        height: args.height,
        bytes: args.bytes,
    };

    let mut probed = false;
    let mut content_type = None;
    if args.probe && policy.should_probe(&args.url) {
        match head_probe(&args.url).await {
            Ok(probe) => {
                probed = true;
                content_type = probe.content_type;
                if metrics.bytes.is_none() {
                    metrics.bytes = probe.content_length;
                }
            }
            Err(e) => tracing::warn!("HEAD probe failed for {}: {:#}", args.url, e),
        }
    } else if args.probe {
        tracing::debug!("Skipping HEAD probe for trusted host");
    }

    let trusted_host = policy.is_trusted_host(&args.url);
    let allowed_extension = policy.is_allowed_extension(&args.url);
    let rejection = match policy.assess(&metrics) {
        Err(reason) => Some(reason.to_string()),
        // trusted hosts often serve extension-less URLs
        Ok(()) if !allowed_extension && !trusted_host => {
            Some("extension not allowed".to_string())
        }
        Ok(()) => None,
    };

    let report = CheckReport {
        url: args.url.clone(),
        mode: policy.validation_mode().as_str(),
        trusted_host,
        allowed_extension,
        probed,
        content_type,
        metrics: MetricsReport {
            width: metrics.width,
            height: metrics.height,
            bytes: metrics.bytes,
        },
        rejection,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if let Some(reason) = &report.rejection {
        bail!("image rejected: {}", reason);
    }

    Ok(())
}

struct HeadProbe {
    content_length: Option<u64>,
    content_type: Option<String>,
}

async fn head_probe(url: &str) -> Result<HeadProbe> {
    let client = reqwest::Client::builder()
        .timeout(PROBE_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .head(url)
        .send()
        .await
        .context("HEAD request failed")?
        .error_for_status()?;

    let headers = response.headers();
    let content_length = headers
        .get(reqwest::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok());
    let content_type = headers
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    Ok(HeadProbe {
        content_length,
        content_type,
    })
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

fn print_report(report: &CheckReport) {
    println!("URL:               {}", report.url);
    println!("Mode:              {}", report.mode);
    println!("Trusted host:      {}", yes_no(report.trusted_host));
    println!("Allowed extension: {}", yes_no(report.allowed_extension));
    if report.probed {
        println!(
            "Probe:             {} bytes, {}",
            report
                .metrics
                .bytes
                .map(|b| b.to_string())
                .unwrap_or_else(|| "?".into()),
            report.content_type.as_deref().unwrap_or("unknown type")
        );
    }
    match &report.rejection {
        Some(reason) => println!("Verdict:           rejected ({})", reason),
        None => println!("Verdict:           ok"),
    }
}

fn print_policy(policy: &ImagePolicyConfig) {
    println!("Mode:                  {}", policy.validation_mode());
    println!("Skip HEAD for trusted: {}", yes_no(policy.skip_head_for_trusted));
    println!("Min width:             {}px", policy.min_width);
    println!("Min file size:         {}KB", policy.min_file_kb);
    println!(
        "Aspect ratio:          {}..={}",
        policy.min_aspect_ratio, policy.max_aspect_ratio
    );
    let exts: Vec<&str> = policy.allowed_extensions.iter().map(String::as_str).collect();
    println!("Extensions:            {}", exts.join(", "));
    println!("Trusted hosts:         {}", policy.trusted_hosts.join(", "));
}
