//! # routes::market
//!
//! Market surface consumed by the Next.js dashboard.
//!
//! ## Endpoints
//!
//! | Method    | Path                            | Description                         |
//! |-----------|---------------------------------|-------------------------------------|
//! | GET (WS)  | `/ws/market`                    | Live tick stream, one frame / 1.5 s |
//! | GET       | `/api/v1/market/snapshot`       | Snapshot mapping, all tickers       |
//! | GET       | `/api/v1/market/stocks`         | Ordered stock list                  |
//! | GET       | `/api/v1/market/price/{ticker}` | Single ticker price                 |
//! | GET       | `/api/v1/market/news`           | Cached sentiment-scored articles    |
//! | GET       | `/api/v1/market/sentiment`      | Aggregate score + label + advice    |
//! | GET       | `/api/v1/market/health`         | Broadcast / subscriber counters     |

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    response::IntoResponse,
    Json,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::Ordering;
use tracing::info;

use crate::{
    engine::sentiment::{advice_for, market_sentiment_score},
    error::AppError,
    state::SharedState,
};

// ─── WebSocket Handler ────────────────────────────────────────────────────────

/// Upgrade HTTP → WebSocket and register with the broadcaster.
///
/// The dashboard connects to `ws://host/ws/market` and receives a
/// `{"type":"tick","data":{...}}` frame on every broadcast pass until it
/// disconnects.
pub async fn ws_market(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: SharedState) {
    let (id, mut rx) = state.broadcaster.connect().await;
    let (mut sender, mut receiver) = socket.split();

    info!(subscriber = %id, "🔌 Market WebSocket client connected");

    loop {
        tokio::select! {
            // Next broadcast frame → forward to this client.
            frame = rx.recv() => {
                match frame {
                    Some(text) => {
                        if sender.send(Message::Text(text.into())).await.is_err() {
                            break; // Client gone mid-send
                        }
                    }
                    None => break, // Broadcaster dropped us (pruned as dead)
                }
            }

            // Messages from the client (Ping / Close).
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    _ => {} // Text/Binary from client — ignored
                }
            }
        }
    }

    state.broadcaster.disconnect(id).await;
    info!(subscriber = %id, "🔌 Market WebSocket client disconnected");
}

// ─── REST Endpoints ───────────────────────────────────────────────────────────

/// GET /api/v1/market/snapshot — point-in-time view of every ticker.
pub async fn get_snapshot(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.simulator.snapshot())
}

/// GET /api/v1/market/stocks — ordered stock list for the ticker strip.
pub async fn get_stocks(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.simulator.list())
}

/// GET /api/v1/market/price/{ticker} — single price, case-insensitive lookup.
pub async fn get_price(
    State(state): State<SharedState>,
    Path(ticker): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    match state.simulator.price_of(&ticker) {
        Some(price) => Ok(Json(json!({
            "ok":     true,
            "ticker": ticker.to_uppercase(),
            "price":  price,
        }))),
        None => Err(AppError::NotFound(format!("Unknown ticker: {ticker}"))),
    }
}

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    #[serde(default = "default_news_limit")]
    pub limit: usize,
}

fn default_news_limit() -> usize {
    20
}

/// GET /api/v1/market/news — cached article views, newest batch first.
pub async fn get_news(
    State(state): State<SharedState>,
    Query(query): Query<NewsQuery>,
) -> impl IntoResponse {
    let articles = state.news.cached(query.limit).await;

    let views: Vec<_> = articles
        .iter()
        .map(|a| {
            json!({
                "id":              a.id,
                "title":           a.title,
                "url":             a.url,
                "source":          a.source,
                "summary":         a.summary,
                "sentiment_score": a.sentiment_score,
                "sentiment_label": a.sentiment_label,
                "published_at":    a.published_at,
            })
        })
        .collect();

    Json(views)
}

/// GET /api/v1/market/sentiment — aggregate score + stance + founder advice.
pub async fn get_sentiment(State(state): State<SharedState>) -> impl IntoResponse {
    let score = market_sentiment_score(state.store.as_ref()).await;
    let advice = advice_for(score);

    Json(json!({
        "score":  score,
        "label":  advice.label,
        "advice": advice.advice,
    }))
}

/// GET /api/v1/market/health — liveness counters for the dashboard.
pub async fn health_check(State(state): State<SharedState>) -> impl IntoResponse {
    Json(json!({
        "ok":               true,
        "subscribers":      state.broadcaster.subscriber_count().await,
        "broadcast_passes": state.broadcast_count.load(Ordering::Relaxed),
        "cached_articles":  state.news.cached(usize::MAX).await.len(),
    }))
}
