//! Outline inference from styled text fragments.
//!
//! [`analyze`] is a pure function: it picks a title, scores every fragment as
//! a potential heading, assigns levels to the accepted ones, then dedups,
//! orders and filters them into the final outline. All document-wide
//! aggregates are computed once per call and passed down explicitly.

pub mod classify;
pub mod finalize;
pub mod fragment;
pub mod level;
pub mod patterns;
pub mod title;

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use classify::{classify, Verdict};
use finalize::{finalize, HeadingCandidate};
pub use fragment::{normalize_text, DocumentStats, TextFragment, FLAG_BOLD, FLAG_ITALIC};

/// Title reported when the fragment sequence is empty.
pub const NO_TITLE_FOUND: &str = "No Title Found";
/// Title reported when fragments exist but none qualifies.
pub const UNTITLED_DOCUMENT: &str = "Untitled Document";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
}

impl HeadingLevel {
    /// Map a 0-based size rank to a level; everything past the third rank is H4.
    pub fn from_rank(rank: usize) -> Self {
        match rank {
            0 => HeadingLevel::H1,
            1 => HeadingLevel::H2,
            2 => HeadingLevel::H3,
            _ => HeadingLevel::H4,
        }
    }

    /// Nesting depth, 0 for H1.
    pub fn depth(self) -> usize {
        self as usize
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.depth() + 1)
    }
}

/// How confirmed headings are ordered in the outline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutlineOrder {
    /// Page ascending, then font size descending within a page.
    #[default]
    PageThenSize,
    /// The order the fragments appeared in.
    Document,
}

impl FromStr for OutlineOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "page-size" | "page_size" => Ok(OutlineOrder::PageThenSize),
            "document" => Ok(OutlineOrder::Document),
            other => Err(format!(
                "unknown outline order '{}' (expected 'page-size' or 'document')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeOptions {
    pub order: OutlineOrder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: HeadingLevel,
    pub text: String,
    pub page: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub title: String,
    pub outline: Vec<OutlineEntry>,
}

impl AnalysisResult {
    fn empty() -> Self {
        AnalysisResult {
            title: NO_TITLE_FOUND.to_string(),
            outline: Vec::new(),
        }
    }

    /// The downloadable artifact: pretty JSON with `title` then `outline`.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Infer a title and outline for one document.
pub fn analyze(fragments: &[TextFragment], options: &AnalyzeOptions) -> AnalysisResult {
    let Some(stats) = DocumentStats::from_fragments(fragments) else {
        debug!("no fragments to analyze");
        return AnalysisResult::empty();
    };
    debug!(
        "analyzing {} fragments: max size {}, average size {:.2}, {} distinct sizes",
        fragments.len(),
        stats.max_size,
        stats.average_size,
        stats.unique_sizes.len()
    );

    let title = title::select_title(fragments, &stats)
        .unwrap_or_else(|| UNTITLED_DOCUMENT.to_string());

    let candidates: Vec<HeadingCandidate> = fragments
        .iter()
        .filter_map(|fragment| {
            let text = normalize_text(&fragment.text);
            if !classify(&text, fragment.size, fragment.is_bold(), &stats).is_heading() {
                return None;
            }
            let level = level::assign_level(&text, fragment.size, &stats);
            Some(HeadingCandidate {
                text,
                level,
                page: fragment.page,
                size: fragment.size,
            })
        })
        .collect();
    debug!("{} fragments accepted as headings", candidates.len());

    let outline = finalize(candidates, &title, options.order);
    debug!("outline has {} entries", outline.len());

    AnalysisResult { title, outline }
}

/// Per-fragment diagnostics for tuning the heuristics.
#[derive(Debug, Clone, Serialize)]
pub struct FragmentReport {
    pub page: u32,
    pub size: f64,
    pub text: String,
    pub title_candidate: bool,
    #[serde(flatten)]
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<HeadingLevel>,
}

pub fn explain(fragments: &[TextFragment]) -> Vec<FragmentReport> {
    let Some(stats) = DocumentStats::from_fragments(fragments) else {
        return Vec::new();
    };

    fragments
        .iter()
        .map(|fragment| {
            let text = normalize_text(&fragment.text);
            let verdict = classify(&text, fragment.size, fragment.is_bold(), &stats);
            let level = verdict
                .is_heading()
                .then(|| level::assign_level(&text, fragment.size, &stats));
            FragmentReport {
                page: fragment.page,
                size: fragment.size,
                title_candidate: title::is_title_candidate(fragment, &stats),
                text,
                verdict,
                level,
            }
        })
        .collect()
}
