//! # models::market
//!
//! Domain types for the simulated market and the news/sentiment pipeline:
//! point-in-time price views produced by the simulator and the [`Article`]
//! documents produced by the news feed.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── PriceDirection ───────────────────────────────────────────────────────────

/// Which side of its base price a ticker currently sits on.
///
/// `Up` covers the flat case too: a ticker exactly at base reads as "up" on
/// the dashboard rather than flickering between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceDirection {
    Up,
    Down,
}

impl PriceDirection {
    /// `Up` iff `change >= 0`.
    #[inline]
    pub fn from_change(change: f64) -> Self {
        if change >= 0.0 {
            PriceDirection::Up
        } else {
            PriceDirection::Down
        }
    }
}

// ─── Snapshot Views ───────────────────────────────────────────────────────────

/// One ticker's entry in a market snapshot.
///
/// Derived on demand from the simulator's price table — never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Current simulated price, rounded to 2 decimal places.
    pub price: f64,

    /// Absolute change from the fixed base price.
    pub change: f64,

    /// Percent change from base.
    pub change_pct: f64,

    pub direction: PriceDirection,

    /// UTC capture time of this snapshot pass.
    pub timestamp: DateTime<Utc>,
}

/// Full snapshot: ticker symbol → entry.
pub type MarketSnapshot = BTreeMap<String, SnapshotEntry>;

/// One row of the stock list view — same numbers as [`SnapshotEntry`] but
/// carried as an ordered sequence (ticker initialization order) without the
/// capture timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRow {
    pub ticker: String,
    pub price: f64,
    pub change: f64,
    pub change_pct: f64,
    pub direction: PriceDirection,
}

// ─── Sentiment ────────────────────────────────────────────────────────────────

/// Three-way tone label attached to every scored article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Map a polarity score in `[-1, 1]` to its label.
    ///
    /// Thresholds: `> 0.1` positive, `< -0.1` negative, neutral between —
    /// both boundary values inclusive on the neutral side.
    pub fn for_score(score: f64) -> Self {
        if score > 0.1 {
            SentimentLabel::Positive
        } else if score < -0.1 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

// ─── Article ──────────────────────────────────────────────────────────────────

/// A sentiment-scored news article.
///
/// Created once by the news feed during a refresh pass, persisted through the
/// article store, and held read-only in the feed's cache until the next pass
/// replaces the whole set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,

    pub title: String,

    /// Canonical URL of the story.
    pub url: String,

    /// Publisher name, e.g. `"Inc42"`, `"YourStory"`.
    pub source: String,

    pub summary: Option<String>,

    /// Optional hero image for the dashboard news cards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Polarity score in `[-1, 1]`, rounded to 3 decimal places.
    pub sentiment_score: f64,

    pub sentiment_label: SentimentLabel,

    pub published_at: Option<DateTime<Utc>>,

    /// UTC timestamp of the refresh pass that ingested this article.
    pub scraped_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_up_covers_flat() {
        assert_eq!(PriceDirection::from_change(0.0), PriceDirection::Up);
        assert_eq!(PriceDirection::from_change(12.5), PriceDirection::Up);
        assert_eq!(PriceDirection::from_change(-0.01), PriceDirection::Down);
    }

    #[test]
    fn label_boundaries_are_neutral() {
        assert_eq!(SentimentLabel::for_score(0.1), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::for_score(-0.1), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::for_score(0.101), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::for_score(-0.101), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::for_score(0.0), SentimentLabel::Neutral);
    }

    #[test]
    fn serde_wire_names_are_lowercase() {
        let entry = SnapshotEntry {
            price: 22567.5,
            change: 67.5,
            change_pct: 0.3,
            direction: PriceDirection::Up,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["direction"], "up");

        let label = serde_json::to_value(SentimentLabel::Negative).unwrap();
        assert_eq!(label, "negative");
    }
}
