//! # state
//!
//! The FounderHQ **shared application state** — constructed once at startup
//! and injected into every Axum handler and background task.
//!
//! ## Design Decisions
//!
//! * No ambient globals: the simulator, news feed, store and broadcaster are
//!   owned here and reach handlers through `axum::extract::State`.
//! * `Arc<AppState>` clones are O(1); the interior components carry their own
//!   locking so handlers never coordinate through this struct.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use crate::broadcast::MarketBroadcaster;
use crate::config::Config;
use crate::engine::news::NewsFeed;
use crate::engine::simulator::PriceSimulator;
use crate::store::{ArticleStore, MemoryStore};

// ─── AppState ─────────────────────────────────────────────────────────────────

/// Top-level shared state injected into every Axum handler.
pub struct AppState {
    /// Simulated price table; the sole writer of current prices.
    pub simulator: Arc<PriceSimulator>,

    /// News ingestion + cache.
    pub news: Arc<NewsFeed>,

    /// Article persistence collaborator.  The sentiment aggregate reads it;
    /// the news feed writes it.
    pub store: Arc<dyn ArticleStore>,

    /// Live WebSocket subscriber registry.
    pub broadcaster: Arc<MarketBroadcaster>,

    pub config: Config,

    /// Completed broadcast passes this session.  Health-check visibility.
    pub broadcast_count: AtomicU64,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        // One reqwest Client for the whole process (connection pooling).
        let http_client = reqwest::Client::new();
        let store: Arc<dyn ArticleStore> = Arc::new(MemoryStore::new());

        Self {
            simulator: Arc::new(PriceSimulator::new(config.tick_throttle)),
            news: Arc::new(NewsFeed::new(
                http_client,
                store.clone(),
                config.news_feed_url.clone(),
                config.news_fetch_timeout,
            )),
            store,
            broadcaster: Arc::new(MarketBroadcaster::new()),
            config,
            broadcast_count: AtomicU64::new(0),
        }
    }
}

/// Convenience type alias
pub type SharedState = Arc<AppState>;

pub fn build_state(config: Config) -> SharedState {
    Arc::new(AppState::new(config))
}
