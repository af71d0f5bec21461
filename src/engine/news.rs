//! # engine::news
//!
//! **News Feed** — pulls recent startup/tech coverage, scores each article
//! with the sentiment engine, persists the batch, and keeps an in-memory
//! cache so `GET /news` never touches the store.
//!
//! ## Data Sources
//! 1. `NEWS_FEED_URL` — a JSON feed endpoint, fetched with a hard timeout
//! 2. Built-in mock articles — dev mode, and the fallback for any fetch
//!    problem (network error, non-success status, too few items)
//!
//! The cache is a full replacement on every refresh pass: it always holds
//! exactly the last processed batch, never an accumulation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::engine::sentiment::analyze_text;
use crate::models::Article;
use crate::store::ArticleStore;

// ─── Tuning ───────────────────────────────────────────────────────────────────

/// A live fetch returning fewer items than this is treated as a failure.
const MIN_LIVE_ITEMS: usize = 5;

/// Articles processed per refresh pass, whatever the source returned.
const MAX_BATCH: usize = 10;

// ─── Mock Articles ────────────────────────────────────────────────────────────

/// Fixed offline article set: (title, source, url, summary, image_url).
const MOCK_NEWS: &[(&str, &str, &str, &str, &str)] = &[
    (
        "Zepto raises $350M in Series G, eyes quick commerce dominance",
        "Inc42",
        "https://inc42.com/",
        "Zepto's latest funding round values the company at $5B, making it one of India's fastest-growing unicorns.",
        "https://images.unsplash.com/photo-1526304640581-d334cdbbf45e?auto=format&fit=crop&q=80&w=800",
    ),
    (
        "SEBI approves new framework for startup IPOs in India",
        "Economic Times",
        "https://economictimes.com/",
        "New regulations ease the path for Indian tech startups to go public with reduced lock-in periods.",
        "https://images.unsplash.com/photo-1611974717483-9b43793014b1?auto=format&fit=crop&q=80&w=800",
    ),
    (
        "AI startup Sarvam raises $41M to build India's foundational model",
        "TechCrunch",
        "https://techcrunch.com/",
        "Sarvam AI is building LLMs trained entirely on Indic languages, backed by Lightspeed and Peak XV.",
        "https://images.unsplash.com/photo-1677442136019-21780ecad995?auto=format&fit=crop&q=80&w=800",
    ),
    (
        "PhonePe crosses 550M registered users, becomes India's largest fintech",
        "Business Standard",
        "https://business-standard.com/",
        "PhonePe now processes over 50% of all UPI transactions in India monthly.",
        "https://images.unsplash.com/photo-1556742049-0cfed4f6a45d?auto=format&fit=crop&q=80&w=800",
    ),
    (
        "India's startup ecosystem sees $4.5B in Q1 2024 funding — recovery signals",
        "Inc42",
        "https://inc42.com/",
        "VC funding is recovering after a difficult 2023, with SaaS and AI leading the charge.",
        "https://images.unsplash.com/photo-1559136555-9303baea8ebd?auto=format&fit=crop&q=80&w=800",
    ),
    (
        "Meesho achieves operational profitability, files for IPO",
        "Mint",
        "https://livemint.com/",
        "The social commerce giant is on track to list at a $4.5B valuation post-profitability milestone.",
        "https://images.unsplash.com/photo-1441986300917-64674bd600d8?auto=format&fit=crop&q=80&w=800",
    ),
];

// ─── Feed Wire Format ─────────────────────────────────────────────────────────

/// Response shape of the JSON feed endpoint.
#[derive(Debug, Deserialize)]
struct FeedResponse {
    articles: Vec<FeedItem>,
}

/// One raw item as the feed delivers it, before scoring.
#[derive(Debug, Clone, Deserialize)]
struct FeedItem {
    title: String,
    url: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
}

// ─── NewsFeed ─────────────────────────────────────────────────────────────────

pub struct NewsFeed {
    client: reqwest::Client,
    store: Arc<dyn ArticleStore>,
    cache: RwLock<Vec<Article>>,
    feed_url: Option<String>,
    fetch_timeout: Duration,
}

impl NewsFeed {
    pub fn new(
        client: reqwest::Client,
        store: Arc<dyn ArticleStore>,
        feed_url: Option<String>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            client,
            store,
            cache: RwLock::new(Vec::new()),
            feed_url,
            fetch_timeout,
        }
    }

    /// One fetch-score-store pass.
    ///
    /// Any fetch problem falls back to the mock set; any single insert
    /// failure is logged and skipped.  The cache ends up holding exactly the
    /// processed batch.  Returns the number of articles cached.
    pub async fn refresh(&self) -> usize {
        let items = match &self.feed_url {
            Some(url) => match self.fetch_feed(url).await {
                Ok(items) if items.len() >= MIN_LIVE_ITEMS => items,
                Ok(items) => {
                    warn!(count = items.len(), "Feed returned too few items — using mock articles");
                    mock_items()
                }
                Err(err) => {
                    warn!(error = %err, "News fetch failed — using mock articles");
                    mock_items()
                }
            },
            None => {
                debug!("NEWS_FEED_URL not set — using mock articles");
                mock_items()
            }
        };

        let scraped_at = Utc::now();
        let mut batch = Vec::with_capacity(MAX_BATCH.min(items.len()));

        for item in items.into_iter().take(MAX_BATCH) {
            let article = score_item(item, scraped_at);

            if let Err(err) = self.store.insert(&article).await {
                warn!(title = %article.title, error = %err, "Article insert failed — skipping record");
            }
            batch.push(article);
        }

        let count = batch.len();
        *self.cache.write().await = batch;

        info!(count, "📰 News refresh complete");
        count
    }

    /// Cached articles for fast reads; the mock set before the first refresh
    /// completes.  Never touches the store.
    pub async fn cached(&self, limit: usize) -> Vec<Article> {
        let cache = self.cache.read().await;

        let mut articles = if cache.is_empty() {
            let now = Utc::now();
            mock_items()
                .into_iter()
                .map(|item| score_item(item, now))
                .collect()
        } else {
            cache.clone()
        };

        articles.truncate(limit);
        articles
    }

    async fn fetch_feed(&self, url: &str) -> anyhow::Result<Vec<FeedItem>> {
        let response = self
            .client
            .get(url)
            .timeout(self.fetch_timeout)
            .send()
            .await
            .context("News feed unreachable")?
            .error_for_status()
            .context("News feed returned an error status")?;

        let feed: FeedResponse = response
            .json()
            .await
            .context("Failed to parse news feed response")?;

        Ok(feed.articles)
    }
}

fn mock_items() -> Vec<FeedItem> {
    MOCK_NEWS
        .iter()
        .map(|&(title, source, url, summary, image_url)| FeedItem {
            title: title.to_string(),
            url: url.to_string(),
            source: Some(source.to_string()),
            summary: Some(summary.to_string()),
            image_url: Some(image_url.to_string()),
            published_at: None,
        })
        .collect()
}

fn score_item(item: FeedItem, now: DateTime<Utc>) -> Article {
    let text = match &item.summary {
        Some(summary) => format!("{} {}", item.title, summary),
        None => item.title.clone(),
    };
    let (score, label) = analyze_text(&text);

    Article {
        id: Uuid::new_v4(),
        title: item.title,
        url: item.url,
        source: item.source.unwrap_or_else(|| "Unknown".to_string()),
        summary: item.summary,
        image_url: item.image_url,
        sentiment_score: score,
        sentiment_label: label,
        published_at: Some(item.published_at.unwrap_or(now)),
        scraped_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SentimentLabel;
    use crate::store::MemoryStore;
    use anyhow::anyhow;
    use async_trait::async_trait;

    struct RejectingStore;

    #[async_trait]
    impl ArticleStore for RejectingStore {
        async fn insert(&self, _article: &Article) -> anyhow::Result<()> {
            Err(anyhow!("write rejected"))
        }
        async fn recent(&self, _limit: usize) -> anyhow::Result<Vec<Article>> {
            Ok(Vec::new())
        }
    }

    fn feed(store: Arc<dyn ArticleStore>, feed_url: Option<String>) -> NewsFeed {
        NewsFeed::new(
            reqwest::Client::new(),
            store,
            feed_url,
            Duration::from_secs(1),
        )
    }

    fn mock_titles() -> Vec<&'static str> {
        MOCK_NEWS.iter().map(|&(title, ..)| title).collect()
    }

    #[tokio::test]
    async fn refresh_without_feed_url_caches_mock_set_in_order() {
        let store = Arc::new(MemoryStore::new());
        let news = feed(store.clone(), None);

        let count = news.refresh().await;
        assert_eq!(count, MOCK_NEWS.len());

        let cached = news.cached(20).await;
        let titles: Vec<&str> = cached.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, mock_titles());

        // Every article was scored and persisted.
        for article in &cached {
            assert!((-1.0..=1.0).contains(&article.sentiment_score));
            assert_eq!(
                article.sentiment_label,
                SentimentLabel::for_score(article.sentiment_score)
            );
        }
        assert_eq!(store.recent(20).await.unwrap().len(), MOCK_NEWS.len());
    }

    #[tokio::test]
    async fn refresh_on_unreachable_feed_falls_back_to_mock_set() {
        // Nothing listens on this port — the fetch fails fast.
        let news = feed(
            Arc::new(MemoryStore::new()),
            Some("http://127.0.0.1:9/feed".to_string()),
        );

        news.refresh().await;
        let titles: Vec<String> = news
            .cached(20)
            .await
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, mock_titles());
    }

    #[tokio::test]
    async fn cache_is_replaced_not_appended() {
        let news = feed(Arc::new(MemoryStore::new()), None);

        news.refresh().await;
        news.refresh().await;
        assert_eq!(news.cached(50).await.len(), MOCK_NEWS.len());
    }

    #[tokio::test]
    async fn insert_failures_do_not_abort_the_batch() {
        let news = feed(Arc::new(RejectingStore), None);

        let count = news.refresh().await;
        assert_eq!(count, MOCK_NEWS.len());
        assert_eq!(news.cached(20).await.len(), MOCK_NEWS.len());
    }

    #[tokio::test]
    async fn cached_before_first_refresh_serves_mock_set() {
        let news = feed(Arc::new(MemoryStore::new()), None);

        let articles = news.cached(3).await;
        assert_eq!(articles.len(), 3);
        assert_eq!(articles[0].title, mock_titles()[0]);
    }
}
