use std::collections::HashSet;

use log::trace;

use super::fragment::word_count;
use super::patterns::{all_digits, GENERIC_LABELS};
use super::{HeadingLevel, OutlineEntry, OutlineOrder};

/// An accepted, leveled heading before deduplication and ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingCandidate {
    pub text: String,
    pub level: HeadingLevel,
    pub page: u32,
    pub size: f64,
}

const MIN_OUTLINE_WORDS: usize = 2;
const MIN_OUTLINE_CHARS: usize = 3;

/// Turn accepted headings (in document order) into the final outline.
pub fn finalize(
    candidates: Vec<HeadingCandidate>,
    title: &str,
    order: OutlineOrder,
) -> Vec<OutlineEntry> {
    let mut headings = dedup(candidates, title);

    if order == OutlineOrder::PageThenSize {
        // Stable, so equal keys keep document order.
        headings.sort_by(|a, b| a.page.cmp(&b.page).then(b.size.total_cmp(&a.size)));
    }

    headings
        .into_iter()
        .filter(|h| is_confirmed(&h.text))
        .map(|h| OutlineEntry {
            level: h.level,
            text: h.text,
            page: h.page,
        })
        .collect()
}

/// First occurrence of each text wins; the title never repeats as a heading.
fn dedup(candidates: Vec<HeadingCandidate>, title: &str) -> Vec<HeadingCandidate> {
    let title = title.to_lowercase();
    let mut seen = HashSet::new();

    candidates
        .into_iter()
        .filter(|c| {
            let key = c.text.to_lowercase();
            if key == title {
                trace!("dropping heading {:?}: same as title", c.text);
                return false;
            }
            if !seen.insert(key) {
                trace!("dropping heading {:?}: duplicate", c.text);
                return false;
            }
            true
        })
        .collect()
}

fn is_confirmed(text: &str) -> bool {
    let lower = text.to_lowercase();
    word_count(text) >= MIN_OUTLINE_WORDS
        && !all_digits().is_match(text)
        && !GENERIC_LABELS.contains(&lower.as_str())
        && text.trim().chars().count() >= MIN_OUTLINE_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(text: &str, page: u32, size: f64) -> HeadingCandidate {
        HeadingCandidate {
            text: text.to_string(),
            level: HeadingLevel::H2,
            page,
            size,
        }
    }

    fn texts(entries: &[OutlineEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.text.as_str()).collect()
    }

    #[test]
    fn test_dedup_first_wins_case_insensitive() {
        let entries = finalize(
            vec![
                candidate("Project Scope", 1, 14.0),
                candidate("PROJECT SCOPE", 3, 20.0),
                candidate("Next Steps", 4, 14.0),
            ],
            "Untitled Document",
            OutlineOrder::PageThenSize,
        );
        assert_eq!(texts(&entries), vec!["Project Scope", "Next Steps"]);
        assert_eq!(entries[0].page, 1);
    }

    #[test]
    fn test_title_excluded() {
        let entries = finalize(
            vec![candidate("Annual Report Overview", 1, 20.0), candidate("Key Results", 2, 14.0)],
            "annual report overview",
            OutlineOrder::PageThenSize,
        );
        assert_eq!(texts(&entries), vec!["Key Results"]);
    }

    #[test]
    fn test_sort_by_page_then_size() {
        let entries = finalize(
            vec![
                candidate("Small Early Heading", 1, 12.0),
                candidate("Large Later Heading", 1, 16.0),
                candidate("Another Small One", 1, 12.0),
                candidate("Page Zero Heading", 0, 10.0),
            ],
            "",
            OutlineOrder::PageThenSize,
        );
        assert_eq!(
            texts(&entries),
            vec![
                "Page Zero Heading",
                "Large Later Heading",
                "Small Early Heading",
                "Another Small One"
            ]
        );
    }

    #[test]
    fn test_document_order_keeps_input_order() {
        let entries = finalize(
            vec![
                candidate("Small Early Heading", 1, 12.0),
                candidate("Large Later Heading", 1, 16.0),
            ],
            "",
            OutlineOrder::Document,
        );
        assert_eq!(texts(&entries), vec!["Small Early Heading", "Large Later Heading"]);
    }

    #[test]
    fn test_confirmation_filters() {
        let entries = finalize(
            vec![
                candidate("Overview", 1, 14.0),
                candidate("Deployment Plan", 1, 14.0),
            ],
            "",
            OutlineOrder::PageThenSize,
        );
        assert_eq!(texts(&entries), vec!["Deployment Plan"]);
        assert!(is_confirmed("A B"));
        assert!(!is_confirmed("Table"));
        assert!(!is_confirmed("A"));
    }
}
