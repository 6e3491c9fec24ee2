//! Heading classification: an additive score over typographic and lexical
//! signals, accepted at a fixed threshold.

use serde::Serialize;

use super::fragment::{word_count, DocumentStats};
use super::patterns::{noise_patterns, structural_patterns, HEADING_KEYWORDS};

/// Minimum total score for a fragment to count as a heading.
pub const HEADING_THRESHOLD: u32 = 4;

const MIN_HEADING_CHARS: usize = 2;
const MAX_HEADING_CHARS: usize = 150;
const MAX_HEADING_WORDS: usize = 20;

/// Size above `average × LARGER_RATIO` earns [`Signal::LargerThanBody`].
const LARGER_RATIO: f64 = 1.15;
/// Size at or above `average × MUCH_LARGER_RATIO` earns [`Signal::MuchLargerThanBody`].
const MUCH_LARGER_RATIO: f64 = 1.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Bold,
    StructuralPattern,
    LargerThanBody,
    Keyword,
    TrailingColon,
    MuchLargerThanBody,
}

impl Signal {
    pub const fn weight(self) -> u32 {
        match self {
            Signal::Bold => 2,
            Signal::StructuralPattern => 3,
            Signal::LargerThanBody => 1,
            Signal::Keyword => 2,
            Signal::TrailingColon => 1,
            Signal::MuchLargerThanBody => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    TooShort,
    TooLong,
    TooManyWords,
    Noise,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Score {
    pub signals: Vec<Signal>,
    pub total: u32,
}

impl Score {
    pub fn is_heading(&self) -> bool {
        self.total >= HEADING_THRESHOLD
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Rejected { reason: Rejection },
    Scored(Score),
}

impl Verdict {
    pub fn is_heading(&self) -> bool {
        matches!(self, Verdict::Scored(score) if score.is_heading())
    }
}

fn reject(text: &str) -> Option<Rejection> {
    let chars = text.chars().count();
    if chars < MIN_HEADING_CHARS {
        return Some(Rejection::TooShort);
    }
    if chars > MAX_HEADING_CHARS {
        return Some(Rejection::TooLong);
    }
    if word_count(text) > MAX_HEADING_WORDS {
        return Some(Rejection::TooManyWords);
    }
    let lower = text.to_lowercase();
    if noise_patterns().iter().any(|re| re.is_match(&lower)) {
        return Some(Rejection::Noise);
    }
    None
}

/// Score `text` (already normalized) as a potential heading.
pub fn score_heading(text: &str, size: f64, bold: bool, stats: &DocumentStats) -> Score {
    let lower = text.to_lowercase();
    let checks = [
        (Signal::Bold, bold),
        (
            Signal::StructuralPattern,
            structural_patterns().iter().any(|re| re.is_match(text)),
        ),
        (Signal::LargerThanBody, size > stats.average_size * LARGER_RATIO),
        (
            Signal::Keyword,
            HEADING_KEYWORDS.iter().any(|word| lower.contains(word)),
        ),
        (Signal::TrailingColon, text.ends_with(':')),
        (
            Signal::MuchLargerThanBody,
            size >= stats.average_size * MUCH_LARGER_RATIO,
        ),
    ];

    let signals: Vec<Signal> = checks
        .into_iter()
        .filter_map(|(signal, hit)| hit.then_some(signal))
        .collect();
    let total = signals.iter().map(|s| s.weight()).sum();

    Score { signals, total }
}

/// Full classification: hard rejections first, then scoring.
pub fn classify(text: &str, size: f64, bold: bool, stats: &DocumentStats) -> Verdict {
    match reject(text) {
        Some(reason) => Verdict::Rejected { reason },
        None => Verdict::Scored(score_heading(text, size, bold, stats)),
    }
}
