//! Text measurement oracle used by the bounds resolver.
//!
//! [`FontMetrics`] reads glyph advances from system fonts through `fontdb` and
//! falls back to calibrated per-character widths when no face matches.
//! [`FixedMetrics`] is a font-independent oracle for reproducible layouts.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

pub const DEFAULT_FONT_SIZE: f32 = 12.0;
pub const DEFAULT_LINE_HEIGHT: f32 = 1.4;

static TEXT_MEASURER: Lazy<Mutex<TextMeasurer>> = Lazy::new(|| Mutex::new(TextMeasurer::new()));

#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub family: String,
    pub size: f32,
    pub weight: String,
    /// Absolute line height in px.
    pub line_height: f32,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            size: DEFAULT_FONT_SIZE,
            weight: "normal".to_string(),
            line_height: DEFAULT_FONT_SIZE * DEFAULT_LINE_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextSize {
    pub width: f32,
    pub height: f32,
}

pub trait TextMeasure: Send + Sync {
    /// Advance width of a single line.
    fn line_width(&self, line: &str, font: &FontSpec) -> f32;

    /// Size of a text block. Lines break on `\n`, and words wrap when a
    /// maximum width is given.
    fn measure(&self, text: &str, font: &FontSpec, max_width: Option<f32>) -> TextSize {
        let mut lines = Vec::new();
        for line in split_lines(text) {
            match max_width {
                Some(limit) => lines.extend(wrap_line(&line, limit, |candidate| {
                    self.line_width(candidate, font)
                })),
                None => lines.push(line),
            }
        }
        if lines.is_empty() {
            lines.push(String::new());
        }
        let width = lines
            .iter()
            .map(|line| self.line_width(line, font))
            .fold(0.0, f32::max);
        TextSize {
            width,
            height: lines.len() as f32 * font.line_height,
        }
    }
}

/// System-font measurement with a heuristic fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontMetrics {
    /// Skip font lookup entirely and use the calibrated character table.
    pub fast: bool,
}

impl TextMeasure for FontMetrics {
    fn line_width(&self, line: &str, font: &FontSpec) -> f32 {
        if self.fast {
            return fallback_text_width(line, font);
        }
        measure_text_width(line, font.size, &font.family, &font.weight)
            .unwrap_or_else(|| fallback_text_width(line, font))
    }
}

/// Every character advances by `char_width` em.
#[derive(Debug, Clone, Copy)]
pub struct FixedMetrics {
    pub char_width: f32,
}

impl Default for FixedMetrics {
    fn default() -> Self {
        Self { char_width: 0.6 }
    }
}

impl TextMeasure for FixedMetrics {
    fn line_width(&self, line: &str, font: &FontSpec) -> f32 {
        line.chars().count() as f32 * self.char_width * font.size
    }
}

pub fn measure_text_width(text: &str, font_size: f32, font_family: &str, weight: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut guard = TEXT_MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family, parse_weight(weight))
}

fn parse_weight(weight: &str) -> Weight {
    match weight.trim() {
        "bold" | "bolder" => Weight::BOLD,
        "lighter" => Weight::LIGHT,
        other => other.parse::<u16>().map(Weight).unwrap_or(Weight::NORMAL),
    }
}

struct TextMeasurer {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<(String, u16), Option<FontFace>>,
}

impl TextMeasurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            cache: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, font_family: &str, weight: Weight) -> Option<f32> {
        let key = (normalize_family_key(font_family), weight.0);
        if !self.cache.contains_key(&key) {
            let face = self.load_face(font_family, weight);
            self.cache.insert(key.clone(), face);
        }
        let face = self.cache.get_mut(&key).and_then(|face| face.as_mut())?;
        let normalized = text.replace('\t', "    ");
        Some(face.measure_width(&normalized, font_size))
    }

    fn load_face(&mut self, font_family: &str, weight: Weight) -> Option<FontFace> {
        let mut names: Vec<String> = Vec::new();
        let mut generics: Vec<Option<Family<'_>>> = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            match raw.to_ascii_lowercase().as_str() {
                "serif" => generics.push(Some(Family::Serif)),
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    generics.push(Some(Family::SansSerif))
                }
                "monospace" | "ui-monospace" => generics.push(Some(Family::Monospace)),
                "cursive" => generics.push(Some(Family::Cursive)),
                "fantasy" => generics.push(Some(Family::Fantasy)),
                _ => {
                    names.push(raw.to_string());
                    generics.push(None);
                }
            }
        }
        if generics.is_empty() {
            generics.push(Some(Family::SansSerif));
        }

        let mut named = names.iter();
        let families: Vec<Family<'_>> = generics
            .into_iter()
            .filter_map(|generic| generic.or_else(|| named.next().map(|name| Family::Name(name.as_str()))))
            .collect();

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| FontFace::new(data.to_vec(), index))
            .flatten()
    }
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [u16; 128],
    advance_cache: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn new(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph_id) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph_id).unwrap_or(0);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
            advance_cache: HashMap::new(),
        })
    }

    fn measure_width(&mut self, text: &str, font_size: f32) -> f32 {
        let scale = font_size / self.units_per_em as f32;
        let fallback = font_size * 0.56;
        let Self {
            data,
            index,
            ascii_advances,
            advance_cache,
            ..
        } = self;
        let mut face: Option<Face<'_>> = None;
        let mut width = 0.0f32;

        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let advance = if ch.is_ascii() {
                Some(ascii_advances[ch as usize]).filter(|advance| *advance > 0)
            } else if let Some(cached) = advance_cache.get(&ch) {
                *cached
            } else {
                if face.is_none() {
                    face = Face::parse(data, *index).ok();
                }
                let value = face.as_ref().and_then(|parsed| {
                    parsed
                        .glyph_index(ch)
                        .and_then(|glyph| parsed.glyph_hor_advance(glyph))
                });
                advance_cache.insert(ch, value);
                value
            };
            width += match advance {
                Some(advance) => advance as f32 * scale,
                None => fallback,
            };
        }
        width.max(0.0)
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}

pub(crate) fn split_lines(text: &str) -> Vec<String> {
    text.replace("<br/>", "\n")
        .replace("<br>", "\n")
        .split('\n')
        .map(|line| line.trim().to_string())
        .collect()
}

pub(crate) fn wrap_line(line: &str, max_width: f32, width_of: impl Fn(&str) -> f32) -> Vec<String> {
    if width_of(line) <= max_width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if width_of(&candidate) > max_width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current.push_str(word);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn fallback_text_width(text: &str, font: &FontSpec) -> f32 {
    let bold = matches!(parse_weight(&font.weight), Weight(weight) if weight >= 600);
    let factor = if bold { 1.06 } else { 1.0 };
    text.chars().map(char_width_factor).sum::<f32>() * font.size * factor
}

pub(crate) fn char_width_factor(ch: char) -> f32 {
    // Em widths of a typical sans-serif face.
    match ch {
        ' ' => 0.306,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' => 0.321,
        'I' | 'i' | 'j' | 'l' => 0.25,
        'f' | 't' | 'r' => 0.34,
        'M' | 'W' | 'm' | 'w' => 0.87,
        'A'..='Z' => 0.66,
        'a'..='z' => 0.57,
        '0'..='9' => 0.6,
        '@' | '#' | '%' | '&' => 0.946,
        c if is_wide(c) => 1.0,
        _ => 0.568,
    }
}

fn is_wide(ch: char) -> bool {
    matches!(ch as u32, 0x1100..=0x115F | 0x2E80..=0xA4CF | 0xAC00..=0xD7A3 | 0xF900..=0xFAFF | 0xFF00..=0xFF60)
}
