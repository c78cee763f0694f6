use std::{env, path::PathBuf, time::Duration};

use tracing::warn;

/// Environment-driven server configuration, parsed once at startup.
/// Malformed values fall back to their documented default with a `warn!`
/// rather than aborting startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub gtfs_dir: Option<PathBuf>,
    pub enabled_producers: Option<Vec<String>>,
    pub producer_timeout: Duration,
    pub cache_ttl: Duration,
}

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_PRODUCER_TIMEOUT_MS: u64 = 20_000;
const DEFAULT_CACHE_TTL_SECS: u64 = 30;

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            port: parse_env_or("WAYPOINT_PORT", DEFAULT_PORT),
            gtfs_dir: env::var("WAYPOINT_GTFS_DIR").ok().map(PathBuf::from),
            enabled_producers: env::var("WAYPOINT_PRODUCERS")
                .ok()
                .map(|raw| raw.split(',').map(|s| s.trim().to_string()).collect()),
            producer_timeout: Duration::from_millis(parse_env_or("WAYPOINT_PRODUCER_TIMEOUT_MS", DEFAULT_PRODUCER_TIMEOUT_MS)),
            cache_ttl: Duration::from_secs(parse_env_or("WAYPOINT_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)),
        }
    }
}

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{key} has an invalid value {raw:?}, using default");
            default
        }),
        Err(_) => default,
    }
}
