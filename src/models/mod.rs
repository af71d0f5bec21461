//! Domain models shared across the entire FounderHQ backend.

pub mod market;

pub use market::{
    Article, MarketSnapshot, PriceDirection, SentimentLabel, SnapshotEntry, StockRow,
};
