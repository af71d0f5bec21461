//! # events
//!
//! Defines [`WsEvent`] — every message the backend pushes to `/ws/market`
//! clients.
//!
//! Events are serialized to a JSON `String` once, before fan-out, so a pass
//! over N subscribers costs one serialization rather than N.

use serde::Serialize;

use crate::models::MarketSnapshot;

/// Wire frames for the market WebSocket.
///
/// The `type` tag matches what the frontend's market hook switches on.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsEvent {
    /// Periodic price update — one frame per broadcast pass.
    Tick { data: MarketSnapshot },
}

impl WsEvent {
    /// Serialize for transport.  Serialization of these shapes cannot
    /// realistically fail, but a broadcast pass must never panic, so fall
    /// back to a tagged error frame instead of unwrapping.
    #[inline]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"type":"serialization_error"}"#.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PriceDirection, SnapshotEntry};

    #[test]
    fn tick_frame_shape() {
        let mut snapshot = MarketSnapshot::new();
        snapshot.insert(
            "NIFTY50".to_string(),
            SnapshotEntry {
                price: 22567.5,
                change: 67.5,
                change_pct: 0.3,
                direction: PriceDirection::Up,
                timestamp: chrono::Utc::now(),
            },
        );

        let json: serde_json::Value =
            serde_json::from_str(&WsEvent::Tick { data: snapshot }.to_json()).unwrap();

        assert_eq!(json["type"], "tick");
        assert_eq!(json["data"]["NIFTY50"]["price"], 22567.5);
        assert_eq!(json["data"]["NIFTY50"]["direction"], "up");
    }
}
