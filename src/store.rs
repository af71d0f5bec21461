//! # store — article persistence seam
//!
//! The document store is a collaborator, not part of this core: the engine
//! only ever needs "insert one article" and "read the most recent N".  Both
//! are fallible at the trait boundary so callers keep their fallback paths
//! honest — the news feed swallows insert failures per record, and the
//! sentiment aggregate degrades to a fixed value on read failure.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::Article;

// ─── Collaborator Trait ───────────────────────────────────────────────────────

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Persist one article record.
    async fn insert(&self, article: &Article) -> Result<()>;

    /// The most recent `limit` articles, newest ingest first.
    async fn recent(&self, limit: usize) -> Result<Vec<Article>>;
}

// ─── In-Memory Implementation ─────────────────────────────────────────────────

/// Process-lifetime article store.
///
/// Stands in for the real document collection; swapping in a database-backed
/// impl only touches this file.
#[derive(Default)]
pub struct MemoryStore {
    articles: RwLock<Vec<Article>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn insert(&self, article: &Article) -> Result<()> {
        let mut articles = self.articles.write().await;
        articles.push(article.clone());
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Article>> {
        let articles = self.articles.read().await;
        // Inserts are append-only, so newest-first is a reverse walk.
        Ok(articles.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SentimentLabel;
    use chrono::Utc;
    use uuid::Uuid;

    fn make_article(title: &str, score: f64) -> Article {
        Article {
            id: Uuid::new_v4(),
            title: title.to_string(),
            url: "https://example.com/".to_string(),
            source: "Test".to_string(),
            summary: None,
            image_url: None,
            sentiment_score: score,
            sentiment_label: SentimentLabel::for_score(score),
            published_at: None,
            scraped_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn recent_is_newest_first_and_limited() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store.insert(&make_article(&format!("a{i}"), 0.0)).await.unwrap();
        }

        let recent = store.recent(3).await.unwrap();
        let titles: Vec<&str> = recent.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["a4", "a3", "a2"]);
    }

    #[tokio::test]
    async fn recent_on_empty_store_is_empty() {
        let store = MemoryStore::new();
        assert!(store.recent(20).await.unwrap().is_empty());
    }
}
