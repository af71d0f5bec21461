//! # config — environment-driven runtime configuration
//!
//! All knobs have working defaults so `cargo run` with an empty environment
//! boots a fully functional dev server (mock news, simulated prices).

use std::time::Duration;

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address Axum listens on.
    pub bind_addr: String,

    /// JSON news feed endpoint.  `None` → skip the network fetch and serve
    /// the built-in mock articles (dev mode).
    pub news_feed_url: Option<String>,

    /// Deadline for the outbound news fetch.  The only operation in the core
    /// with an explicit timeout.
    pub news_fetch_timeout: Duration,

    /// Re-run the news refresh on this cadence.  `None` → startup fetch only.
    pub news_refresh_interval: Option<Duration>,

    /// Minimum wall-clock gap between price-table mutations.
    pub tick_throttle: Duration,

    /// Cadence of the WebSocket tick broadcast.
    pub broadcast_interval: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            news_feed_url: std::env::var("NEWS_FEED_URL").ok().filter(|v| !v.is_empty()),
            news_fetch_timeout: Duration::from_secs(
                std::env::var("NEWS_FETCH_TIMEOUT_SECS")
                    .ok().and_then(|v| v.parse().ok()).unwrap_or(10),
            ),
            news_refresh_interval: std::env::var("NEWS_REFRESH_SECS")
                .ok().and_then(|v| v.parse().ok()).map(Duration::from_secs),
            tick_throttle: Duration::from_millis(
                std::env::var("TICK_THROTTLE_MS")
                    .ok().and_then(|v| v.parse().ok()).unwrap_or(1_000),
            ),
            broadcast_interval: Duration::from_millis(
                std::env::var("BROADCAST_INTERVAL_MS")
                    .ok().and_then(|v| v.parse().ok()).unwrap_or(1_500),
            ),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
