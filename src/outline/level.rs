use super::fragment::DocumentStats;
use super::patterns::{level_patterns, MIN_SIZES_FOR_RANKING, SIZE_LEVEL_THRESHOLDS};
use super::HeadingLevel;

/// Assign a level to an accepted heading. Author-provided numbering and
/// labels win over typography; size decides only when no pattern applies.
pub fn assign_level(text: &str, size: f64, stats: &DocumentStats) -> HeadingLevel {
    if let Some(level) = level_from_text(text) {
        return level;
    }
    level_from_size(size, stats)
}

pub fn level_from_text(text: &str) -> Option<HeadingLevel> {
    level_patterns()
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, level)| *level)
}

pub fn level_from_size(size: f64, stats: &DocumentStats) -> HeadingLevel {
    if stats.unique_sizes.len() >= MIN_SIZES_FOR_RANKING {
        return HeadingLevel::from_rank(stats.size_rank(size));
    }
    SIZE_LEVEL_THRESHOLDS
        .iter()
        .find(|(ratio, _)| size >= stats.average_size * ratio)
        .map_or(HeadingLevel::H4, |(_, level)| *level)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(sizes: &[f64], average_size: f64) -> DocumentStats {
        DocumentStats {
            max_size: sizes[0],
            average_size,
            unique_sizes: sizes.to_vec(),
        }
    }

    #[test]
    fn test_numbered_prefixes() {
        assert_eq!(level_from_text("1. Introduction"), Some(HeadingLevel::H1));
        assert_eq!(level_from_text("2 Scope"), Some(HeadingLevel::H1));
        assert_eq!(level_from_text("1.1 Background"), Some(HeadingLevel::H2));
        assert_eq!(level_from_text("1.1. Background"), Some(HeadingLevel::H2));
        assert_eq!(level_from_text("1.1.1 Details"), Some(HeadingLevel::H3));
        assert_eq!(level_from_text("1.2.3.4 fine print"), Some(HeadingLevel::H4));
    }

    #[test]
    fn test_numbered_prefix_needs_capital() {
        assert_eq!(level_from_text("1.1 background"), None);
        assert_eq!(level_from_text("3 apples"), None);
    }

    #[test]
    fn test_labelled_sections() {
        assert_eq!(level_from_text("Appendix A: Data"), Some(HeadingLevel::H2));
        assert_eq!(level_from_text("Appendix A Data"), None);
        assert_eq!(level_from_text("Phase IV: Rollout"), Some(HeadingLevel::H3));
        assert_eq!(level_from_text("For each Region"), Some(HeadingLevel::H4));
        assert_eq!(level_from_text("For the Board"), Some(HeadingLevel::H4));
    }

    #[test]
    fn test_rank_with_enough_sizes() {
        let s = stats(&[24.0, 18.0, 14.0, 12.0, 10.0], 11.0);
        assert_eq!(level_from_size(24.0, &s), HeadingLevel::H1);
        assert_eq!(level_from_size(18.0, &s), HeadingLevel::H2);
        assert_eq!(level_from_size(14.0, &s), HeadingLevel::H3);
        assert_eq!(level_from_size(12.0, &s), HeadingLevel::H4);
        assert_eq!(level_from_size(10.0, &s), HeadingLevel::H4);
    }

    #[test]
    fn test_thresholds_with_few_sizes() {
        let s = stats(&[20.0, 12.0, 10.0], 10.0);
        assert_eq!(level_from_size(15.0, &s), HeadingLevel::H1);
        assert_eq!(level_from_size(13.0, &s), HeadingLevel::H2);
        assert_eq!(level_from_size(12.0, &s), HeadingLevel::H3);
        assert_eq!(level_from_size(10.5, &s), HeadingLevel::H4);
    }

    #[test]
    fn test_text_beats_size() {
        let s = stats(&[24.0, 18.0, 14.0, 12.0, 10.0], 11.0);
        assert_eq!(assign_level("2.1 Scope", 24.0, &s), HeadingLevel::H2);
        assert_eq!(assign_level("Scope", 24.0, &s), HeadingLevel::H1);
    }
}
