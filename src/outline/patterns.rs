//! Pattern and vocabulary tables driving title selection, heading scoring and
//! level assignment.
//!
//! Tables are plain data. Regexes are compiled once on first use and shared
//! for the lifetime of the process.

use std::sync::OnceLock;

use regex::Regex;

use super::HeadingLevel;

/// Leading list number that disqualifies a title candidate ("1. ", "2 ").
pub const TITLE_NUMBERED_PREFIX: &str = r"^\d+\.?\s";

/// Lower-cased prefixes that disqualify a title candidate.
pub const TITLE_EXCLUDED_PREFIXES: &[&str] = &["page", "chapter"];

/// Matched against the lower-cased normalized text. Any hit rejects the
/// fragment as a heading outright.
pub const NOISE_PATTERNS: &[&str] = &[
    r"^\d+$",
    r"^page\s+\d+",
    r"^figure\s+\d+",
    r"^table\s+\d+",
    r"^\w{1,2}$",
    r"^[^\w\s]+$",
    r"^\d{4}$",
    r"^www\.",
    r"@",
];

/// Typical heading shapes, matched against the normalized text.
pub const STRUCTURAL_PATTERNS: &[&str] = &[
    r"^\d+\.?\s+[A-Z]",
    r"^\d+\.\d+\.?\s+[A-Z]",
    r"^\d+\.\d+\.\d+\.?\s+[A-Z]",
    r"^\d+\.\d+\.\d+\.\d+\.?\s+[A-Z]",
    r"^[A-Z][a-z]+(\s+[A-Z&][a-z]*)*:?\s*$",
    r"^[A-Z][A-Z\s&]+:?\s*$",
    r"^Appendix\s+[A-Z]",
    r"^Phase\s+[IVX]",
    r"^For\s+(each|the)\s+[A-Z]",
    r"^\d+\.\s+[A-Z]",
];

/// Substrings of the lower-cased text that suggest a section heading.
pub const HEADING_KEYWORDS: &[&str] = &[
    "summary",
    "background",
    "introduction",
    "conclusion",
    "abstract",
    "references",
    "methodology",
    "approach",
    "requirements",
    "evaluation",
    "timeline",
    "milestones",
    "appendix",
    "phase",
    "business",
    "plan",
];

/// Lexical level rules in priority order; the first match decides.
pub const LEVEL_PATTERNS: &[(&str, HeadingLevel)] = &[
    (r"^\d+\.?\s+[A-Z]", HeadingLevel::H1),
    (r"^\d+\.\d+\.?\s+[A-Z]", HeadingLevel::H2),
    (r"^\d+\.\d+\.\d+\.?\s+[A-Z]", HeadingLevel::H3),
    (r"^\d+\.\d+\.\d+\.\d+\.?\s+", HeadingLevel::H4),
    (r"^Appendix\s+[A-Z]:", HeadingLevel::H2),
    (r"^Phase\s+[IVX]+:", HeadingLevel::H3),
    (r"^For\s+(each|the)\s+[A-Z]", HeadingLevel::H4),
    (r"^\d+\.\s+[A-Z]", HeadingLevel::H3),
];

/// Size multiples of the average size used when the document has too few
/// distinct sizes to rank. Checked in order; anything below falls to H4.
pub const SIZE_LEVEL_THRESHOLDS: &[(f64, HeadingLevel)] = &[
    (1.4, HeadingLevel::H1),
    (1.25, HeadingLevel::H2),
    (1.1, HeadingLevel::H3),
];

/// Minimum number of distinct sizes before levels come from size rank.
pub const MIN_SIZES_FOR_RANKING: usize = 4;

/// Lower-cased texts never confirmed as outline entries.
pub const GENERIC_LABELS: &[&str] = &["page", "figure", "table"];

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern:?}: {e}"))
}

pub fn title_numbered_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(TITLE_NUMBERED_PREFIX))
}

pub fn noise_patterns() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| NOISE_PATTERNS.iter().map(|p| compile(p)).collect())
}

pub fn structural_patterns() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| STRUCTURAL_PATTERNS.iter().map(|p| compile(p)).collect())
}

pub fn level_patterns() -> &'static [(Regex, HeadingLevel)] {
    static RES: OnceLock<Vec<(Regex, HeadingLevel)>> = OnceLock::new();
    RES.get_or_init(|| {
        LEVEL_PATTERNS
            .iter()
            .map(|(p, level)| (compile(p), *level))
            .collect()
    })
}

pub fn all_digits() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"^\d+$"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_compile() {
        assert_eq!(noise_patterns().len(), NOISE_PATTERNS.len());
        assert_eq!(structural_patterns().len(), STRUCTURAL_PATTERNS.len());
        assert_eq!(level_patterns().len(), LEVEL_PATTERNS.len());
        assert!(title_numbered_prefix().is_match("3. Results"));
        assert!(all_digits().is_match("2024"));
    }

    #[test]
    fn test_structural_shapes() {
        let matches = |text: &str| structural_patterns().iter().any(|re| re.is_match(text));
        assert!(matches("2.3 Evaluation Plan"));
        assert!(matches("Project Overview:"));
        assert!(matches("RISKS & MITIGATIONS"));
        assert!(matches("Appendix B"));
        assert!(matches("Phase II"));
        assert!(matches("For each Team"));
        assert!(!matches("the quick brown fox jumps"));
        assert!(!matches("Results were mixed across sites."));
    }

    #[test]
    fn test_noise_at_anywhere() {
        let noisy = |text: &str| noise_patterns().iter().any(|re| re.is_match(text));
        assert!(noisy("contact: team@example.org"));
        assert!(noisy("page 12"));
        assert!(noisy("---"));
        assert!(!noisy("methods overview"));
    }
}
