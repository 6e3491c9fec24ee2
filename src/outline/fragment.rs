use serde::{Deserialize, Serialize};

/// Style flag bit for bold text.
pub const FLAG_BOLD: u32 = 16;
/// Style flag bit for italic text.
pub const FLAG_ITALIC: u32 = 2;

/// One styled run of text from a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    pub size: f64,
    #[serde(default)]
    pub font: String,
    #[serde(default)]
    pub flags: u32,
    pub page: u32,
    /// `[x0, y0, x1, y1]` in PDF user space.
    #[serde(default)]
    pub bbox: [f64; 4],
}

impl TextFragment {
    pub fn is_bold(&self) -> bool {
        self.flags & FLAG_BOLD != 0
    }
}

/// Font-size aggregates over a whole document, computed once per analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentStats {
    pub max_size: f64,
    pub average_size: f64,
    /// Distinct sizes, largest first.
    pub unique_sizes: Vec<f64>,
}

impl DocumentStats {
    /// Returns `None` for an empty fragment sequence.
    pub fn from_fragments(fragments: &[TextFragment]) -> Option<Self> {
        if fragments.is_empty() {
            return None;
        }

        let total: f64 = fragments.iter().map(|f| f.size).sum();
        let average_size = total / fragments.len() as f64;

        let mut unique_sizes: Vec<f64> = fragments.iter().map(|f| f.size).collect();
        unique_sizes.sort_by(|a, b| b.total_cmp(a));
        unique_sizes.dedup();

        Some(DocumentStats {
            max_size: unique_sizes[0],
            average_size,
            unique_sizes,
        })
    }

    /// 0-based position of `size` among the distinct sizes. Sizes that never
    /// occur in the document rank last.
    pub fn size_rank(&self, size: f64) -> usize {
        self.unique_sizes
            .iter()
            .position(|s| *s == size)
            .unwrap_or(self.unique_sizes.len().saturating_sub(1))
    }
}

/// Collapse whitespace runs to a single space and trim the edges.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
pub(crate) fn fragment(text: &str, size: f64, flags: u32, page: u32) -> TextFragment {
    TextFragment {
        text: text.to_string(),
        size,
        font: "Helvetica".to_string(),
        flags,
        page,
        bbox: [0.0; 4],
    }
}
