use log::{debug, trace};

use super::fragment::{normalize_text, word_count, DocumentStats, TextFragment};
use super::patterns::{title_numbered_prefix, TITLE_EXCLUDED_PREFIXES};

/// Title candidates must come from the first pages of the document.
const TITLE_MAX_PAGE: u32 = 2;
/// Fraction of the largest size a title candidate must reach.
const TITLE_SIZE_RATIO: f64 = 0.9;
const TITLE_MIN_WORDS: usize = 3;
const TITLE_MAX_WORDS: usize = 25;

pub fn is_title_candidate(fragment: &TextFragment, stats: &DocumentStats) -> bool {
    if fragment.page > TITLE_MAX_PAGE {
        return false;
    }
    if fragment.size < stats.max_size * TITLE_SIZE_RATIO {
        return false;
    }
    let words = word_count(&fragment.text);
    if !(TITLE_MIN_WORDS..=TITLE_MAX_WORDS).contains(&words) {
        return false;
    }
    if title_numbered_prefix().is_match(&fragment.text) {
        return false;
    }
    let lower = fragment.text.to_lowercase();
    !TITLE_EXCLUDED_PREFIXES
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

/// Size dominates; among equal sizes the earlier page scores higher.
fn title_score(fragment: &TextFragment) -> f64 {
    fragment.size * 1000.0 - f64::from(fragment.page)
}

/// Pick the best title candidate, if any. Exact score ties keep the first
/// candidate in document order.
pub fn select_title(fragments: &[TextFragment], stats: &DocumentStats) -> Option<String> {
    let mut best: Option<(&TextFragment, f64)> = None;

    for fragment in fragments {
        if !is_title_candidate(fragment, stats) {
            continue;
        }
        let score = title_score(fragment);
        trace!("title candidate {:?} (score {})", fragment.text, score);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((fragment, score));
        }
    }

    let (winner, score) = best?;
    debug!("selected title {:?} with score {}", winner.text, score);
    Some(normalize_text(&winner.text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::fragment::fragment;

    fn select(fragments: &[TextFragment]) -> Option<String> {
        let stats = DocumentStats::from_fragments(fragments).unwrap();
        select_title(fragments, &stats)
    }

    #[test]
    fn test_largest_wins() {
        let fragments = vec![
            fragment("A Study of Things", 20.0, 0, 1),
            fragment("The Real Document Title", 24.0, 0, 1),
            fragment("some body text goes here", 10.0, 0, 1),
        ];
        assert_eq!(select(&fragments).as_deref(), Some("The Real Document Title"));
    }

    #[test]
    fn test_earlier_page_breaks_size_tie() {
        let fragments = vec![
            fragment("Second Page Big Banner", 24.0, 0, 2),
            fragment("First Page Big Banner", 24.0, 0, 1),
        ];
        assert_eq!(select(&fragments).as_deref(), Some("First Page Big Banner"));
    }

    #[test]
    fn test_exact_tie_keeps_first() {
        let fragments = vec![
            fragment("Alpha Beta Gamma", 24.0, 0, 1),
            fragment("Delta Epsilon Zeta", 24.0, 0, 1),
        ];
        assert_eq!(select(&fragments).as_deref(), Some("Alpha Beta Gamma"));
    }

    #[test]
    fn test_ineligible_candidates() {
        let fragments = vec![
            fragment("Too Short", 30.0, 0, 1),
            fragment("1. Numbered Big Line", 30.0, 0, 1),
            fragment("Chapter One Begins Here", 30.0, 0, 1),
            fragment("Page Header Running Text", 30.0, 0, 1),
            fragment("Late Page Large Heading", 30.0, 0, 3),
            fragment("Small But Otherwise Fine", 20.0, 0, 1),
        ];
        assert_eq!(select(&fragments), None);
    }

    #[test]
    fn test_within_ninety_percent_of_max() {
        let fragments = vec![
            fragment("x y", 30.0, 0, 5),
            fragment("Nearly As Large Title", 28.0, 0, 1),
        ];
        assert_eq!(select(&fragments).as_deref(), Some("Nearly As Large Title"));
    }

    #[test]
    fn test_title_whitespace_collapsed() {
        let fragments = vec![fragment("Annual   Report\t2024", 18.0, 0, 1)];
        assert_eq!(select(&fragments).as_deref(), Some("Annual Report 2024"));
    }
}
