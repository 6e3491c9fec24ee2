//! Styled text fragments from page content streams.
//!
//! Each page's content is walked with a reduced PDF text state machine. Every
//! text-showing operator yields a run positioned in user space; runs that
//! continue one another on a baseline (same font, same size) are merged into a
//! single fragment, roughly one per styled span of a line.

use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, info, trace};
use lopdf::content::Operation;
use lopdf::Object;

use super::document::{number, PageFont, DEFAULT_GLYPH_WIDTH};
use super::{ExtractError, PdfDocument};
use crate::outline::{TextFragment, FLAG_BOLD, FLAG_ITALIC};

pub const DEFAULT_MAX_PAGES: u32 = 50;
pub const DEFAULT_MIN_CHARS: usize = 2;

/// Baselines closer than this (user-space units) are the same line.
const Y_TOLERANCE: f32 = 1.0;
/// Sizes closer than this are the same size.
const SIZE_TOLERANCE: f32 = 0.05;
/// A horizontal gap wider than `size × WORD_GAP_RATIO` separates words.
const WORD_GAP_RATIO: f32 = 0.15;
/// A gap wider than `size × MAX_JOIN_GAP_RATIO` starts a new fragment.
const MAX_JOIN_GAP_RATIO: f32 = 3.0;

#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Pages past this are never read.
    pub max_pages: u32,
    /// Fragments with fewer characters after trimming are dropped.
    pub min_chars: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            max_pages: DEFAULT_MAX_PAGES,
            min_chars: DEFAULT_MIN_CHARS,
        }
    }
}

pub fn extract_fragments_from_path<P: AsRef<Path>>(
    path: P,
    options: &ExtractOptions,
) -> Result<Vec<TextFragment>, ExtractError> {
    let doc = PdfDocument::open(path)?;
    Ok(extract_fragments(&doc, options))
}

pub fn extract_fragments(doc: &PdfDocument, options: &ExtractOptions) -> Vec<TextFragment> {
    let total = doc.page_count();
    if total > options.max_pages {
        info!(
            "document has {} pages; reading the first {}",
            total, options.max_pages
        );
    }

    let mut fragments = Vec::new();
    for (page_num, page_id) in doc.page_ids().into_iter().take(options.max_pages as usize) {
        let fonts = doc.page_fonts(page_id);
        let operations = doc.page_operations(page_num, page_id);

        let mut walker = PageWalker::new(&fonts);
        walker.walk(&operations);
        let runs = merge_runs(walker.runs);

        let before = fragments.len();
        fragments.extend(
            runs.into_iter()
                .filter_map(|run| run.into_fragment(page_num, options.min_chars)),
        );
        trace!(
            "page {}: {} operations, {} fragments",
            page_num,
            operations.len(),
            fragments.len() - before
        );
    }

    debug!("extracted {} fragments", fragments.len());
    fragments
}

/// Affine matrix `[a, b, c, d, e, f]`.
type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// `m × n` in PDF row-vector convention.
fn multiply(m: &Matrix, n: &Matrix) -> Matrix {
    [
        m[0] * n[0] + m[1] * n[2],
        m[0] * n[1] + m[1] * n[3],
        m[2] * n[0] + m[3] * n[2],
        m[2] * n[1] + m[3] * n[3],
        m[4] * n[0] + m[5] * n[2] + n[4],
        m[4] * n[1] + m[5] * n[3] + n[5],
    ]
}

fn matrix_from(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let mut m = IDENTITY;
    for (slot, operand) in m.iter_mut().zip(operands) {
        *slot = number(operand)?;
    }
    Some(m)
}

#[derive(Debug, Clone)]
struct TextState {
    font_key: Vec<u8>,
    font_size: f32,
    text_matrix: Matrix,
    line_matrix: Matrix,
    horiz_scale: f32,
    char_spacing: f32,
    word_spacing: f32,
    rise: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        TextState {
            font_key: Vec::new(),
            font_size: 0.0,
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            rise: 0.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn translate_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = multiply(&[1.0, 0.0, 0.0, 1.0, tx, ty], &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.leading);
    }

    fn advance(&mut self, tx: f32) {
        self.text_matrix = multiply(&[1.0, 0.0, 0.0, 1.0, tx, 0.0], &self.text_matrix);
    }
}

/// Output of one text-showing operator.
#[derive(Debug, Clone, PartialEq)]
struct Run {
    text: String,
    x: f32,
    y: f32,
    end_x: f32,
    size: f32,
    font: String,
    flags: u32,
}

impl Run {
    /// Whether `next` continues this run on the same line in the same style.
    fn continues_with(&self, next: &Run) -> bool {
        self.font == next.font
            && self.flags == next.flags
            && (self.size - next.size).abs() < SIZE_TOLERANCE
            && (self.y - next.y).abs() < Y_TOLERANCE
            && next.x >= self.x
            && next.x - self.end_x < self.size * MAX_JOIN_GAP_RATIO
    }

    fn into_fragment(self, page: u32, min_chars: usize) -> Option<TextFragment> {
        let text = self.text.trim();
        if text.chars().count() < min_chars {
            return None;
        }
        Some(TextFragment {
            text: text.to_string(),
            size: f64::from(self.size),
            font: self.font,
            flags: self.flags,
            page,
            bbox: [
                f64::from(self.x.min(self.end_x)),
                f64::from(self.y),
                f64::from(self.x.max(self.end_x)),
                f64::from(self.y + self.size),
            ],
        })
    }
}

fn merge_runs(runs: Vec<Run>) -> Vec<Run> {
    let mut merged: Vec<Run> = Vec::new();
    for run in runs {
        if let Some(last) = merged.last_mut() {
            if last.continues_with(&run) {
                let gap = run.x - last.end_x;
                if gap > run.size * WORD_GAP_RATIO
                    && !last.text.ends_with(char::is_whitespace)
                    && !run.text.starts_with(char::is_whitespace)
                {
                    last.text.push(' ');
                }
                last.text.push_str(&run.text);
                last.end_x = last.end_x.max(run.end_x);
                continue;
            }
        }
        merged.push(run);
    }
    merged
}

fn style_flags(font: &PageFont<'_>) -> u32 {
    let upper = font.name.to_uppercase();
    let mut flags = 0;
    if font.force_bold || ["BOLD", "BLACK", "HEAVY", "DEMI"].iter().any(|w| upper.contains(w)) {
        flags |= FLAG_BOLD;
    }
    if upper.contains("ITALIC") || upper.contains("OBLIQUE") {
        flags |= FLAG_ITALIC;
    }
    flags
}

/// Text of the string operand of a text-showing operator. The font's
/// encoding or `ToUnicode` CMap decides when it resolves; otherwise the bytes
/// are guessed at.
fn decode_text(bytes: &[u8], font: Option<&PageFont<'_>>) -> String {
    if let Some(decoder) = font.and_then(|f| f.decoder.as_ref()) {
        match decoder.bytes_to_string(bytes) {
            Ok(text) => return text,
            Err(e) => trace!("falling back to guessed decoding: {}", e),
        }
    }
    if font.is_some_and(PageFont::is_two_byte) && bytes.len() % 2 == 0 {
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        let decoded = String::from_utf16_lossy(&units);
        if !decoded.chars().all(|c| c == '\u{FFFD}' || c == '\0') {
            return decoded;
        }
    }
    decode_simple(bytes)
}

/// UTF-16BE with BOM, then UTF-8, then Latin-1.
fn decode_simple(bytes: &[u8]) -> String {
    if let Some(payload) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = payload
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

struct PageWalker<'a> {
    fonts: &'a BTreeMap<Vec<u8>, PageFont<'a>>,
    ctm: Matrix,
    saved: Vec<Matrix>,
    state: TextState,
    runs: Vec<Run>,
}

impl<'a> PageWalker<'a> {
    fn new(fonts: &'a BTreeMap<Vec<u8>, PageFont<'a>>) -> Self {
        PageWalker {
            fonts,
            ctm: IDENTITY,
            saved: Vec::new(),
            state: TextState::default(),
            runs: Vec::new(),
        }
    }

    fn font(&self) -> Option<&'a PageFont<'a>> {
        self.fonts.get(&self.state.font_key)
    }

    fn walk(&mut self, operations: &[Operation]) {
        for op in operations {
            let operands = op.operands.as_slice();
            let first = operands.first().and_then(number);
            match op.operator.as_str() {
                "q" => self.saved.push(self.ctm),
                "Q" => {
                    if let Some(ctm) = self.saved.pop() {
                        self.ctm = ctm;
                    }
                }
                "cm" => {
                    if let Some(m) = matrix_from(operands) {
                        self.ctm = multiply(&m, &self.ctm);
                    }
                }
                "BT" => {
                    self.state.text_matrix = IDENTITY;
                    self.state.line_matrix = IDENTITY;
                }
                "Tf" => {
                    if let (Some(Object::Name(key)), Some(size)) =
                        (operands.first(), operands.get(1).and_then(number))
                    {
                        self.state.font_key = key.clone();
                        self.state.font_size = size;
                    }
                }
                "Tm" => {
                    if let Some(m) = matrix_from(operands) {
                        self.state.text_matrix = m;
                        self.state.line_matrix = m;
                    }
                }
                "Td" | "TD" => {
                    if let (Some(tx), Some(ty)) = (first, operands.get(1).and_then(number)) {
                        if op.operator == "TD" {
                            self.state.leading = -ty;
                        }
                        self.state.translate_line(tx, ty);
                    }
                }
                "T*" => self.state.next_line(),
                "TL" => {
                    if let Some(v) = first {
                        self.state.leading = v;
                    }
                }
                "Tc" => {
                    if let Some(v) = first {
                        self.state.char_spacing = v;
                    }
                }
                "Tw" => {
                    if let Some(v) = first {
                        self.state.word_spacing = v;
                    }
                }
                "Tz" => {
                    if let Some(v) = first {
                        self.state.horiz_scale = v / 100.0;
                    }
                }
                "Ts" => {
                    if let Some(v) = first {
                        self.state.rise = v;
                    }
                }
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(&[ShowItem::Text(bytes)]);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        let items: Vec<ShowItem> = items
                            .iter()
                            .filter_map(|item| match item {
                                Object::String(bytes, _) => Some(ShowItem::Text(bytes)),
                                other => number(other).map(ShowItem::Adjust),
                            })
                            .collect();
                        self.show(&items);
                    }
                }
                "'" => {
                    self.state.next_line();
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(&[ShowItem::Text(bytes)]);
                    }
                }
                "\"" => {
                    if let (Some(aw), Some(ac), Some(Object::String(bytes, _))) =
                        (first, operands.get(1).and_then(number), operands.get(2))
                    {
                        self.state.word_spacing = aw;
                        self.state.char_spacing = ac;
                        self.state.next_line();
                        self.show(&[ShowItem::Text(bytes)]);
                    }
                }
                _ => {}
            }
        }
    }

    /// Text rendering matrix for the current position.
    fn rendering_matrix(&self) -> Matrix {
        let s = &self.state;
        let tsm = [s.horiz_scale, 0.0, 0.0, 1.0, 0.0, s.rise];
        multiply(&multiply(&tsm, &s.text_matrix), &self.ctm)
    }

    /// Emit one run for a show operator and advance the text position.
    fn show(&mut self, items: &[ShowItem<'_>]) {
        let font = self.font();
        let start = self.rendering_matrix();
        // Effective size is the vertical scale of the rendering matrix. A
        // negative font size mirrors the glyphs but still sets their size.
        let size = (self.state.font_size * (start[1].powi(2) + start[3].powi(2)).sqrt()).abs();
        let mut text = String::new();

        for item in items {
            match item {
                ShowItem::Text(bytes) => {
                    text.push_str(&decode_text(bytes, font));
                    self.advance_glyphs(bytes, font);
                }
                ShowItem::Adjust(adjust) => {
                    let tx = -adjust / 1000.0 * self.state.font_size * self.state.horiz_scale;
                    let gap = -adjust / 1000.0 * self.state.font_size.abs();
                    if gap > self.state.font_size.abs() * WORD_GAP_RATIO && !text.ends_with(' ') {
                        text.push(' ');
                    }
                    self.state.advance(tx);
                }
            }
        }

        if text.is_empty() || size <= 0.0 {
            return;
        }
        let end = self.rendering_matrix();
        let (font_name, flags) = match font {
            Some(font) => (font.name.clone(), style_flags(font)),
            None => (String::from_utf8_lossy(&self.state.font_key).into_owned(), 0),
        };
        self.runs.push(Run {
            text,
            x: start[4],
            y: start[5],
            end_x: end[4],
            size,
            font: font_name,
            flags,
        });
    }

    fn advance_glyphs(&mut self, bytes: &[u8], font: Option<&PageFont<'_>>) {
        let two_byte = font.is_some_and(PageFont::is_two_byte);
        let codes: Vec<u32> = if two_byte {
            bytes
                .chunks(2)
                .map(|c| c.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b)))
                .collect()
        } else {
            bytes.iter().map(|b| u32::from(*b)).collect()
        };

        let s = &self.state;
        let mut tx = 0.0;
        for code in codes {
            let width = font.map_or(DEFAULT_GLYPH_WIDTH, |f| f.glyph_width(code));
            let mut spacing = s.char_spacing;
            if code == 32 && !two_byte {
                spacing += s.word_spacing;
            }
            tx += (width * s.font_size + spacing) * s.horiz_scale;
        }
        self.state.advance(tx);
    }
}

enum ShowItem<'b> {
    Text(&'b [u8]),
    Adjust(f32),
}
