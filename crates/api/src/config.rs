use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{FixedOffset, Offset, Utc};

/// Hosts the image proxy may fetch from when `IMAGE_PROXY_ALLOWED_DOMAINS` is unset.
pub const DEFAULT_PROXY_DOMAINS: &[&str] = &[
    "books.google.com",
    "covers.openlibrary.org",
    "firebasestorage.googleapis.com",
    "i.imgur.com",
    "images-na.ssl-images-amazon.com",
    "m.media-amazon.com",
];

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    /// Offset of the campus wall clock from UTC. Slots and report months use it.
    pub campus_offset: FixedOffset,
    pub proxy_allowed_domains: Vec<String>,
    pub proxy_timeout: Duration,
    pub admin_role_assignments_per_hour: usize,
    pub leaderboard_interval: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            // Türkiye has been on a fixed UTC+3 since 2016.
            campus_offset: FixedOffset::east_opt(3 * 3600).unwrap_or(Utc.fix()),
            proxy_allowed_domains: DEFAULT_PROXY_DOMAINS
                .iter()
                .map(|d| d.to_string())
                .collect(),
            proxy_timeout: Duration::from_secs(5),
            admin_role_assignments_per_hour: 5,
            leaderboard_interval: Duration::from_secs(3600),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let campus_offset = match env::var("CAMPUS_UTC_OFFSET_MINUTES") {
            Ok(raw) => {
                let minutes: i32 = raw
                    .trim()
                    .parse()
                    .context("CAMPUS_UTC_OFFSET_MINUTES must be an integer")?;
                FixedOffset::east_opt(minutes * 60)
                    .context("CAMPUS_UTC_OFFSET_MINUTES is out of range")?
            }
            Err(_) => defaults.campus_offset,
        };

        let proxy_allowed_domains = env::var("IMAGE_PROXY_ALLOWED_DOMAINS")
            .map(|raw| parse_domain_list(&raw))
            .unwrap_or(defaults.proxy_allowed_domains);

        let admin_role_assignments_per_hour = match env::var("ADMIN_ROLE_ASSIGNMENTS_PER_HOUR") {
            Ok(raw) => parse_positive("ADMIN_ROLE_ASSIGNMENTS_PER_HOUR", &raw)? as usize,
            Err(_) => defaults.admin_role_assignments_per_hour,
        };

        let leaderboard_interval = match env::var("LEADERBOARD_INTERVAL_SECONDS") {
            Ok(raw) => Duration::from_secs(parse_positive("LEADERBOARD_INTERVAL_SECONDS", &raw)?),
            Err(_) => defaults.leaderboard_interval,
        };

        Ok(Self {
            campus_offset,
            proxy_allowed_domains,
            proxy_timeout: defaults.proxy_timeout,
            admin_role_assignments_per_hour,
            leaderboard_interval,
        })
    }
}

/// Counts and intervals must be whole numbers above zero.
fn parse_positive(name: &str, raw: &str) -> Result<u64> {
    let value: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("{name} must be a positive integer"))?;
    anyhow::ensure!(value > 0, "{name} must be greater than zero");
    Ok(value)
}

fn parse_domain_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|d| d.trim().trim_start_matches('.').to_lowercase())
        .filter(|d| !d.is_empty())
        .collect()
}
