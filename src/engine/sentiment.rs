//! # engine::sentiment
//!
//! **Sentiment Scorer** — lexicon polarity over article text plus the
//! aggregate "market mood" read the funding dashboard shows founders.
//!
//! The scorer is intentionally a small weighted bag-of-words: the product
//! only needs a bounded score in `[-1, 1]` and a stable three-way label, not
//! linguistic accuracy.  Two different thresholds are in play and must stay
//! different:
//!
//! * per-article **label**: `±0.1` (see [`SentimentLabel::for_score`])
//! * aggregate **advice**:  `±0.2` (see [`advice_for`])

use serde::Serialize;
use tracing::warn;

use crate::models::SentimentLabel;
use crate::store::ArticleStore;

// ─── Lexicon ──────────────────────────────────────────────────────────────────

/// Word valences, tuned for startup/market news copy.
///
/// Magnitudes stay below 1.0 so the average of any mix of hits remains well
/// inside `[-1, 1]`.
const LEXICON: &[(&str, f64)] = &[
    // Favorable tone
    ("gain", 0.5),
    ("gains", 0.5),
    ("surge", 0.7),
    ("surges", 0.7),
    ("soars", 0.8),
    ("growth", 0.6),
    ("growing", 0.5),
    ("profit", 0.7),
    ("profitability", 0.7),
    ("profitable", 0.7),
    ("raise", 0.4),
    ("raises", 0.4),
    ("funding", 0.3),
    ("backed", 0.3),
    ("record", 0.5),
    ("strong", 0.6),
    ("recovery", 0.5),
    ("recovering", 0.5),
    ("milestone", 0.5),
    ("dominance", 0.4),
    ("leading", 0.4),
    ("largest", 0.3),
    ("fastest", 0.4),
    ("approves", 0.4),
    ("eases", 0.4),
    ("unicorn", 0.4),
    ("unicorns", 0.4),
    ("success", 0.7),
    ("successful", 0.7),
    ("positive", 0.6),
    ("good", 0.5),
    ("great", 0.7),
    // Unfavorable tone
    ("loss", -0.6),
    ("losses", -0.6),
    ("decline", -0.5),
    ("declines", -0.5),
    ("falls", -0.5),
    ("fall", -0.4),
    ("plunge", -0.7),
    ("plunges", -0.7),
    ("crash", -0.8),
    ("slump", -0.6),
    ("layoffs", -0.7),
    ("shutdown", -0.7),
    ("shuts", -0.6),
    ("fraud", -0.9),
    ("scam", -0.9),
    ("penalty", -0.5),
    ("probe", -0.4),
    ("weak", -0.5),
    ("difficult", -0.4),
    ("risk", -0.3),
    ("risky", -0.4),
    ("cautious", -0.3),
    ("downturn", -0.6),
    ("bankruptcy", -0.9),
    ("debt", -0.4),
    ("negative", -0.6),
    ("bad", -0.5),
    ("worst", -0.7),
];

/// Tokens that flip the valence of the word right after them.
const NEGATORS: &[&str] = &["not", "no", "never", "without"];

/// How many recent articles feed the aggregate.
const RECENT_WINDOW: usize = 20;

/// Returned when the article store cannot be read.  Slightly positive default.
const FALLBACK_SCORE: f64 = 0.12;

// ─── Analyze ──────────────────────────────────────────────────────────────────

/// Score arbitrary text, returning `(polarity, label)`.
///
/// The score is the mean valence of matched words (negation-flipped), rounded
/// to 3 decimal places and clamped to `[-1, 1]`.  Text with no scorable words
/// is neutral.  This function cannot fail — the news pipeline must never lose
/// a batch to a scoring error.
pub fn analyze_text(text: &str) -> (f64, SentimentLabel) {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let mut total = 0.0;
    let mut matched = 0u32;

    for (i, token) in tokens.iter().enumerate() {
        let Some(&(_, valence)) = LEXICON.iter().find(|(word, _)| word == token) else {
            continue;
        };

        let negated = i > 0 && NEGATORS.contains(&tokens[i - 1]);
        total += if negated { -valence } else { valence };
        matched += 1;
    }

    if matched == 0 {
        return (0.0, SentimentLabel::Neutral);
    }

    let score = round3(total / f64::from(matched)).clamp(-1.0, 1.0);
    (score, SentimentLabel::for_score(score))
}

// ─── Aggregate ────────────────────────────────────────────────────────────────

/// Mean sentiment of the most recently ingested articles, rounded to 3
/// decimal places.
///
/// `0.0` when nothing has been ingested yet; a fixed slightly-positive
/// fallback when the store cannot be read — the sentiment endpoint never
/// hard-fails.
pub async fn market_sentiment_score(store: &dyn ArticleStore) -> f64 {
    match store.recent(RECENT_WINDOW).await {
        Ok(articles) if articles.is_empty() => 0.0,
        Ok(articles) => {
            let sum: f64 = articles.iter().map(|a| a.sentiment_score).sum();
            round3(sum / articles.len() as f64)
        }
        Err(err) => {
            warn!(error = %err, "Article store read failed — using fallback sentiment");
            FALLBACK_SCORE
        }
    }
}

// ─── Advice ───────────────────────────────────────────────────────────────────

/// Aggregate market stance shown on the funding dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketStance {
    Bullish,
    Bearish,
    Neutral,
}

/// Stance plus founder-facing advice text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarketAdvice {
    pub label: MarketStance,
    pub advice: &'static str,
}

/// Map an aggregate score to stance + advice.
///
/// Coarser thresholds than the per-article label: a mildly positive news
/// cycle (e.g. 0.15) still reads as "mixed signals" here.
pub fn advice_for(score: f64) -> MarketAdvice {
    if score > 0.2 {
        MarketAdvice {
            label: MarketStance::Bullish,
            advice: "Good time to raise funding — investor sentiment is positive.",
        }
    } else if score < -0.2 {
        MarketAdvice {
            label: MarketStance::Bearish,
            advice: "Cautious market — consider waiting before approaching investors.",
        }
    } else {
        MarketAdvice {
            label: MarketStance::Neutral,
            advice: "Mixed signals — evaluate carefully before making moves.",
        }
    }
}

#[inline]
fn round3(value: f64) -> f64 {
    (value * 1_000.0).round() / 1_000.0
}
