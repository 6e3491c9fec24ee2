use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, warn};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Encoding, Object, ObjectId};

use super::ExtractError;

/// FontDescriptor `Flags` bit for ForceBold.
const FORCE_BOLD_FLAG: i64 = 1 << 18;

/// Glyph advance (in em) assumed when the font carries no widths.
pub const DEFAULT_GLYPH_WIDTH: f32 = 0.5;

/// `DW` of a CIDFont that does not set one, in thousandths of an em.
const DEFAULT_CID_WIDTH: f32 = 1000.0;

/// Glyph advances in thousandths of an em.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GlyphWidths {
    #[default]
    Unknown,
    /// `Widths` array of a simple font, starting at `FirstChar`.
    Simple { first_char: u32, widths: Vec<f32> },
    /// `W` ranges of a Type0 font's descendant CIDFont, `default` for the rest.
    Cid {
        default: f32,
        ranges: Vec<(u32, u32, f32)>,
    },
}

/// Font resource of a page, keyed by its resource name (e.g. `F1`).
#[derive(Debug, Default)]
pub struct PageFont<'a> {
    /// Base font name with any subset tag (`ABCDEF+`) removed.
    pub name: String,
    /// Name of the `Encoding` entry, when it is a simple name.
    pub encoding: Option<String>,
    /// Type0 font; its strings are two-byte codes.
    pub composite: bool,
    pub force_bold: bool,
    pub widths: GlyphWidths,
    /// Maps character codes to text through the font's encoding or
    /// `ToUnicode` CMap. `None` when neither resolves.
    pub decoder: Option<Encoding<'a>>,
}

impl PageFont<'_> {
    pub fn is_two_byte(&self) -> bool {
        self.composite
            || self
                .encoding
                .as_deref()
                .is_some_and(|enc| enc.starts_with("Identity"))
    }

    /// Advance of `code` in em.
    pub fn glyph_width(&self, code: u32) -> f32 {
        let width = match &self.widths {
            GlyphWidths::Unknown => None,
            GlyphWidths::Simple { first_char, widths } => code
                .checked_sub(*first_char)
                .and_then(|i| widths.get(i as usize))
                .copied(),
            GlyphWidths::Cid { default, ranges } => Some(
                ranges
                    .iter()
                    .find(|(first, last, _)| (*first..=*last).contains(&code))
                    .map_or(*default, |(_, _, w)| *w),
            ),
        };
        width
            .filter(|w| *w > 0.0)
            .map_or(DEFAULT_GLYPH_WIDTH, |w| w / 1000.0)
    }
}

pub struct PdfDocument {
    doc: Document,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ExtractError> {
        let doc = Document::load_mem(bytes).map_err(|e| ExtractError::Parse(e.to_string()))?;
        if doc.is_encrypted() {
            return Err(ExtractError::Encrypted);
        }
        Ok(PdfDocument { doc })
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get 1-indexed page object IDs
    pub fn page_ids(&self) -> Vec<(u32, ObjectId)> {
        let mut pages: Vec<_> = self.doc.get_pages().into_iter().collect();
        pages.sort_by_key(|(num, _)| *num);
        pages
    }

    /// Decoded content-stream operations of a page. A page whose content
    /// cannot be decoded yields no operations.
    pub fn page_operations(&self, page_num: u32, page_id: ObjectId) -> Vec<Operation> {
        let data = match self.doc.get_page_content(page_id) {
            Ok(data) => data,
            Err(e) => {
                warn!("skipping page {}: cannot read content: {}", page_num, e);
                return Vec::new();
            }
        };
        match Content::decode(&data) {
            Ok(content) => content.operations,
            Err(e) => {
                warn!("skipping page {}: cannot decode content: {}", page_num, e);
                Vec::new()
            }
        }
    }

    /// Fonts referenced by a page's resources.
    pub fn page_fonts(&self, page_id: ObjectId) -> BTreeMap<Vec<u8>, PageFont<'_>> {
        let fonts = match self.doc.get_page_fonts(page_id) {
            Ok(fonts) => fonts,
            Err(e) => {
                debug!("no font resources for page {:?}: {}", page_id, e);
                return BTreeMap::new();
            }
        };

        fonts
            .into_iter()
            .map(|(key, dict)| {
                let composite = dict
                    .get(b"Subtype")
                    .and_then(Object::as_name)
                    .is_ok_and(|subtype| subtype == b"Type0");
                let font = PageFont {
                    name: dict
                        .get(b"BaseFont")
                        .and_then(Object::as_name)
                        .map(|n| strip_subset_tag(&String::from_utf8_lossy(n)).to_string())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&key).into_owned()),
                    encoding: dict
                        .get(b"Encoding")
                        .and_then(Object::as_name)
                        .ok()
                        .map(|n| String::from_utf8_lossy(n).into_owned()),
                    composite,
                    force_bold: self.descriptor_forces_bold(dict),
                    widths: if composite {
                        self.cid_widths(dict)
                    } else {
                        self.simple_widths(dict)
                    },
                    decoder: self.font_decoder(&key, dict),
                };
                (key, font)
            })
            .collect()
    }

    fn font_decoder<'a>(&'a self, key: &[u8], font: &'a Dictionary) -> Option<Encoding<'a>> {
        let named = matches!(font.get(b"Encoding"), Ok(Object::Name(_)));
        if !named && !font.has(b"ToUnicode") {
            return None;
        }
        match font.get_font_encoding(&self.doc) {
            Ok(encoding) => Some(encoding),
            Err(e) => {
                debug!(
                    "font {}: no usable encoding: {}",
                    String::from_utf8_lossy(key),
                    e
                );
                None
            }
        }
    }

    fn simple_widths(&self, font: &Dictionary) -> GlyphWidths {
        let Ok(widths) = font
            .get_deref(b"Widths", &self.doc)
            .and_then(Object::as_array)
        else {
            return GlyphWidths::Unknown;
        };
        let first_char = font
            .get(b"FirstChar")
            .and_then(Object::as_i64)
            .ok()
            .and_then(|i| u32::try_from(i).ok())
            .unwrap_or(0);
        GlyphWidths::Simple {
            first_char,
            widths: widths.iter().map(|w| number(w).unwrap_or(0.0)).collect(),
        }
    }

    /// `W` and `DW` of the first descendant CIDFont.
    fn cid_widths(&self, font: &Dictionary) -> GlyphWidths {
        let descendant = font
            .get_deref(b"DescendantFonts", &self.doc)
            .and_then(Object::as_array)
            .ok()
            .and_then(|fonts| fonts.first())
            .and_then(|first| self.doc.dereference(first).ok())
            .and_then(|(_, obj)| obj.as_dict().ok());
        let Some(descendant) = descendant else {
            return GlyphWidths::Unknown;
        };

        let default = descendant
            .get(b"DW")
            .ok()
            .and_then(number)
            .unwrap_or(DEFAULT_CID_WIDTH);
        let ranges = descendant
            .get_deref(b"W", &self.doc)
            .and_then(Object::as_array)
            .map(|w| parse_cid_widths(w, &self.doc))
            .unwrap_or_default();
        GlyphWidths::Cid { default, ranges }
    }

    fn descriptor_forces_bold(&self, font: &Dictionary) -> bool {
        font.get_deref(b"FontDescriptor", &self.doc)
            .and_then(Object::as_dict)
            .and_then(|d| d.get(b"Flags"))
            .and_then(Object::as_i64)
            .is_ok_and(|bits| bits & FORCE_BOLD_FLAG != 0)
    }
}

/// Flatten a CIDFont `W` array. Entries are either `c [w1 w2 ...]`, giving
/// consecutive codes from `c`, or `c_first c_last w`.
fn parse_cid_widths(w: &[Object], doc: &Document) -> Vec<(u32, u32, f32)> {
    let code = |obj: &Object| obj.as_i64().ok().and_then(|i| u32::try_from(i).ok());
    let mut ranges = Vec::new();
    let mut i = 0;
    while i + 1 < w.len() {
        let Some(first) = code(&w[i]) else {
            break;
        };
        let next = doc.dereference(&w[i + 1]).map(|(_, obj)| obj);
        if let Ok(Object::Array(widths)) = next {
            for (offset, width) in widths.iter().enumerate() {
                if let Some(width) = number(width) {
                    ranges.push((first + offset as u32, first + offset as u32, width));
                }
            }
            i += 2;
        } else {
            match (code(&w[i + 1]), w.get(i + 2).and_then(number)) {
                (Some(last), Some(width)) => ranges.push((first, last, width)),
                _ => break,
            }
            i += 3;
        }
    }
    ranges
}

pub fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Subset fonts are named `ABCDEF+RealName`.
fn strip_subset_tag(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.bytes().all(|b| b.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_subset_tag() {
        assert_eq!(strip_subset_tag("ABCDEF+Helvetica-Bold"), "Helvetica-Bold");
        assert_eq!(strip_subset_tag("Helvetica"), "Helvetica");
        assert_eq!(strip_subset_tag("Ab+Odd"), "Ab+Odd");
    }

    #[test]
    fn test_glyph_width() {
        let font = PageFont {
            name: "Times-Roman".to_string(),
            widths: GlyphWidths::Simple {
                first_char: 32,
                widths: vec![250.0, 333.0, 0.0],
            },
            ..Default::default()
        };
        assert_eq!(font.glyph_width(32), 0.25);
        assert_eq!(font.glyph_width(33), 0.333);
        assert_eq!(font.glyph_width(34), DEFAULT_GLYPH_WIDTH);
        assert_eq!(font.glyph_width(10), DEFAULT_GLYPH_WIDTH);
        assert_eq!(font.glyph_width(500), DEFAULT_GLYPH_WIDTH);
        assert!(!font.is_two_byte());
    }

    #[test]
    fn test_cid_widths() {
        let doc = Document::with_version("1.5");
        let w = vec![
            36.into(),
            Object::Array(vec![600.into(), 250.into()]),
            70.into(),
            72.into(),
            500.into(),
        ];
        let ranges = parse_cid_widths(&w, &doc);
        assert_eq!(
            ranges,
            vec![(36, 36, 600.0), (37, 37, 250.0), (70, 72, 500.0)]
        );

        let font = PageFont {
            composite: true,
            widths: GlyphWidths::Cid {
                default: 1000.0,
                ranges,
            },
            ..Default::default()
        };
        assert!(font.is_two_byte());
        assert_eq!(font.glyph_width(36), 0.6);
        assert_eq!(font.glyph_width(71), 0.5);
        assert_eq!(font.glyph_width(5), 1.0);
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = PdfDocument::from_bytes(b"definitely not a pdf").err();
        assert!(matches!(err, Some(ExtractError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = PdfDocument::open("/nonexistent/nowhere.pdf").err();
        assert!(matches!(err, Some(ExtractError::Io { .. })));
    }
}
