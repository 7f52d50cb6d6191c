//! Keyword-based news sentiment scoring.

use crate::core::quote::NewsArticle;
use std::cmp::Ordering;
use std::fmt;

const POSITIVE_WORDS: [&str; 7] = [
    "up", "rise", "gain", "positive", "bullish", "growth", "profit",
];
const NEGATIVE_WORDS: [&str; 7] = [
    "down", "fall", "loss", "negative", "bearish", "decline", "risk",
];

/// Fixed placeholder until a real model backs the score.
const CONFIDENCE: u8 = 75;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Neutral,
    Negative,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tone::Positive => write!(f, "Positive"),
            Tone::Neutral => write!(f, "Neutral"),
            Tone::Negative => write!(f, "Negative"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outlook {
    Bullish,
    Neutral,
    Bearish,
}

impl Outlook {
    pub fn signal(&self) -> &'static str {
        match self {
            Outlook::Bullish => "Strong Buy",
            Outlook::Neutral => "Neutral",
            Outlook::Bearish => "Strong Sell",
        }
    }
}

impl fmt::Display for Outlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outlook::Bullish => write!(f, "Bullish"),
            Outlook::Neutral => write!(f, "Neutral"),
            Outlook::Bearish => write!(f, "Bearish"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArticleSentiment {
    pub title: String,
    pub tone: Tone,
    /// Keyword hit count normalized by the lexicon size.
    pub score: f64,
}

#[derive(Debug)]
pub struct SentimentSummary {
    pub articles: Vec<ArticleSentiment>,
    pub positive_pct: f64,
    pub neutral_pct: f64,
    pub negative_pct: f64,
    pub overall: Outlook,
    pub sentiment_score: f64,
    pub signal_strength: &'static str,
    pub confidence: u8,
    pub total_articles: usize,
}

/// Scores one article by keyword hits on the lowercased title and summary.
/// Matching is plain substring search, so "upgrade" counts as "up".
pub fn score_article(article: &NewsArticle) -> ArticleSentiment {
    let text = format!("{} {}", article.title, article.summary).to_lowercase();

    let mut score: i32 = 0;
    for word in POSITIVE_WORDS {
        if text.contains(word) {
            score += 1;
        }
    }
    for word in NEGATIVE_WORDS {
        if text.contains(word) {
            score -= 1;
        }
    }

    let tone = match score.cmp(&0) {
        Ordering::Greater => Tone::Positive,
        Ordering::Less => Tone::Negative,
        Ordering::Equal => Tone::Neutral,
    };
    let lexicon_size = (POSITIVE_WORDS.len() + NEGATIVE_WORDS.len()) as f64;

    ArticleSentiment {
        title: article.title.clone(),
        tone,
        score: f64::from(score.unsigned_abs()) / lexicon_size,
    }
}

/// Aggregates article scores. No news yields a neutral summary with zero
/// articles rather than an error.
pub fn summarize(news: &[NewsArticle]) -> SentimentSummary {
    let articles: Vec<ArticleSentiment> = news.iter().map(score_article).collect();
    let total = articles.len();

    let positive = articles.iter().filter(|a| a.tone == Tone::Positive).count();
    let neutral = articles.iter().filter(|a| a.tone == Tone::Neutral).count();
    let negative = articles.iter().filter(|a| a.tone == Tone::Negative).count();

    let pct = |count: usize| {
        if total > 0 {
            count as f64 / total as f64 * 100.0
        } else {
            0.0
        }
    };

    let overall = match positive.cmp(&negative) {
        Ordering::Greater => Outlook::Bullish,
        Ordering::Less => Outlook::Bearish,
        Ordering::Equal => Outlook::Neutral,
    };
    let sentiment_score = if total > 0 {
        (positive as f64 - negative as f64) / total as f64 * 100.0
    } else {
        0.0
    };

    SentimentSummary {
        articles,
        positive_pct: pct(positive),
        neutral_pct: pct(neutral),
        negative_pct: pct(negative),
        overall,
        sentiment_score,
        signal_strength: overall.signal(),
        confidence: CONFIDENCE,
        total_articles: total,
    }
}
