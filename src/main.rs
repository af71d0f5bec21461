//! # FounderHQ — Startup-Community Backend (Market Core)
//!
//! ```text
//!  ┌──────────────┐  GET /api/v1/market/*          ┌─────────────────────────────┐
//!  │  Next.js     │ ─────────────────────────────▶ │ AppState                    │
//!  │  Dashboard   │                                │ ├─ simulator  (random walk) │
//!  └──────────────┘                                │ ├─ news       (fetch+cache) │
//!         ▲                                        │ ├─ store      (articles)    │
//!         │  ws://host/ws/market                   │ └─ broadcaster ───────────┐ │
//!         └────────────────────────────────────────┴───────────────────────────┘ │
//!                 {"type":"tick","data":{...}} every 1.5 s  ◀────────────────────┘
//! ```
//!
//! ## Environment Variables
//!
//! | Variable            | Default           | Description                            |
//! |---------------------|-------------------|----------------------------------------|
//! | `BIND_ADDR`         | `0.0.0.0:8000`    | Address Axum listens on                |
//! | `NEWS_FEED_URL`     | unset             | JSON news feed; unset → mock articles  |
//! | `NEWS_REFRESH_SECS` | unset             | Periodic refresh; unset → startup only |
//! | `RUST_LOG`          | `founderhq=debug` | Tracing filter                         |

use std::net::SocketAddr;
use std::sync::atomic::Ordering;

use axum::{routing::get, Json, Router};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod broadcast;
mod config;
mod engine;
mod error;
mod events;
mod models;
mod routes;
mod state;
mod store;

use config::Config;
use events::WsEvent;
use routes::market::{
    get_news, get_price, get_sentiment, get_snapshot, get_stocks, health_check, ws_market,
};
use state::{build_state, SharedState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env ──────────────────────────────────────────────────────────
    dotenvy::dotenv().ok();

    // ── 2. Structured logging ─────────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("founderhq=debug".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!(r#"

  ╔═══════════════════════════════════════════════════════╗
  ║           FOUNDERHQ — Backend (Market Core)           ║
  ║  Simulator · News · Sentiment · Live Tick Broadcast   ║
  ╚═══════════════════════════════════════════════════════╝"#);

    // ── 3. Shared state ───────────────────────────────────────────────────────
    let config = Config::from_env();
    let state = build_state(config);

    // ── 4. Initial news ingest (mock fallback keeps this infallible) ─────────
    let count = state.news.refresh().await;
    info!(count, "Initial news ingest complete");

    // ── 5. Background tasks ───────────────────────────────────────────────────
    tokio::spawn(run_broadcast_loop(state.clone()));

    if let Some(every) = state.config.news_refresh_interval {
        let state = state.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(every).await;
                let count = state.news.refresh().await;
                info!(count, "Scheduled news refresh complete");
            }
        });
    }

    // ── 6. CORS (allow the Next.js dev server) ───────────────────────────────
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // ── 7. Router ─────────────────────────────────────────────────────────────
    let app = Router::new()
        .route("/",                             get(root))
        // ── Market data ───────────────────────────────────────────────────────
        .route("/api/v1/market/snapshot",       get(get_snapshot))
        .route("/api/v1/market/stocks",         get(get_stocks))
        .route("/api/v1/market/price/:ticker",  get(get_price))
        // ── News & sentiment ──────────────────────────────────────────────────
        .route("/api/v1/market/news",           get(get_news))
        .route("/api/v1/market/sentiment",      get(get_sentiment))
        // ── Monitoring ────────────────────────────────────────────────────────
        .route("/api/v1/market/health",         get(health_check))
        .route("/ws/market",                    get(ws_market))
        // ── Middleware ────────────────────────────────────────────────────────
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state.clone());

    // ── 8. Bind & Serve ───────────────────────────────────────────────────────
    let addr: SocketAddr = state.config.bind_addr.parse()?;

    info!(?addr, "🚀 FounderHQ server starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "FounderHQ API is live 🚀",
        "health":  "/api/v1/market/health",
    }))
}

/// One snapshot → one serialized frame → fan-out, every broadcast interval.
///
/// The simulator's own throttle keeps the walk at one mutation per second no
/// matter how many REST reads land between passes.
async fn run_broadcast_loop(state: SharedState) {
    let mut interval = tokio::time::interval(state.config.broadcast_interval);
    loop {
        interval.tick().await;

        let event = WsEvent::Tick { data: state.simulator.snapshot() };
        state.broadcaster.broadcast(&event.to_json()).await;
        state.broadcast_count.fetch_add(1, Ordering::Relaxed);
    }
}
