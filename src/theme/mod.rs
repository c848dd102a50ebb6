pub mod attrs;

pub use attrs::{AttrRule, DynamicAttr, DynamicAttributes, RuleFn, resolve_attributes};

use crate::scene::{Props, SceneNode};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_COLOR_PRIMARY: &str = "#FF356A";
pub const DEFAULT_COLOR_BG: &str = "#FFFFFF";

static HEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid hex pattern"));
static RGB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*[\d.]+\s*)?\)$")
        .expect("valid rgb pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Linear blend; `amount` 0 keeps `self`, 1 yields `other`.
    pub fn mix(self, other: Rgb, amount: f32) -> Rgb {
        let amount = amount.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * amount).round() as u8;
        Rgb {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
        }
    }

    fn brightness(self) -> f32 {
        (0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32) / 255.0
    }
}

const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };
const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

/// Parses `#rgb`, `#rrggbb`, `rgb()`/`rgba()` and the names white/black.
pub fn parse_color(input: &str) -> Option<Rgb> {
    let input = input.trim();
    match input.to_ascii_lowercase().as_str() {
        "white" => return Some(WHITE),
        "black" => return Some(BLACK),
        _ => {}
    }
    if let Some(caps) = HEX_RE.captures(input) {
        let digits = caps.get(1)?.as_str();
        let expanded: String = if digits.len() == 3 {
            digits.chars().flat_map(|ch| [ch, ch]).collect()
        } else {
            digits.to_string()
        };
        let value = u32::from_str_radix(&expanded, 16).ok()?;
        return Some(Rgb {
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        });
    }
    let caps = RGB_RE.captures(input)?;
    let channel = |index: usize| -> Option<u8> { caps.get(index)?.as_str().parse().ok() };
    Some(Rgb {
        r: channel(1)?,
        g: channel(2)?,
        b: channel(3)?,
    })
}

/// Unparseable colors are treated as light.
pub fn is_dark_color(color: &str) -> bool {
    parse_color(color).is_some_and(|rgb| rgb.brightness() < 0.5)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSeed {
    pub color_primary: String,
    pub color_bg: String,
    pub is_dark_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub color_primary: String,
    pub color_primary_bg: String,
    pub color_primary_text: String,
    pub color_text: String,
    pub color_text_secondary: String,
    pub color_white: String,
    pub color_bg: String,
    pub color_bg_elevated: String,
    pub is_dark_mode: bool,
}

pub fn generate_theme_colors(seed: &ThemeSeed) -> ThemeColors {
    let primary = parse_color(&seed.color_primary).unwrap_or(BLACK);
    let bg = parse_color(&seed.color_bg).unwrap_or(if seed.is_dark_mode { BLACK } else { WHITE });
    let (text, text_secondary, elevated) = if seed.is_dark_mode {
        (WHITE, WHITE.mix(bg, 0.35), bg.mix(WHITE, 0.08))
    } else {
        (Rgb { r: 38, g: 38, b: 38 }, Rgb { r: 102, g: 102, b: 102 }, WHITE)
    };
    ThemeColors {
        color_primary: seed.color_primary.clone(),
        color_primary_bg: primary.mix(bg, 0.9).to_hex(),
        color_primary_text: (if primary.brightness() < 0.6 { WHITE } else { BLACK }).to_hex(),
        color_text: text.to_hex(),
        color_text_secondary: text_secondary.to_hex(),
        color_white: WHITE.to_hex(),
        color_bg: seed.color_bg.clone(),
        color_bg_elevated: elevated.to_hex(),
        is_dark_mode: seed.is_dark_mode,
    }
}

pub type PaletteFn = Arc<dyn Fn(usize, usize) -> String + Send + Sync>;

/// Ordered color sequence, or a generator of `(index, total)`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Palette {
    Colors(Vec<String>),
    #[serde(skip)]
    Generator(PaletteFn),
}

impl Default for Palette {
    fn default() -> Self {
        Palette::Colors(Vec::new())
    }
}

impl fmt::Debug for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Palette::Colors(colors) => f.debug_tuple("Colors").field(colors).finish(),
            Palette::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

/// Color for the item at `path`, chosen by its top-level index.
pub fn palette_color(palette: &Palette, path: &[usize], total: usize) -> Option<String> {
    let index = *path.first()?;
    match palette {
        Palette::Colors(colors) if colors.is_empty() => None,
        Palette::Colors(colors) => Some(colors[index % colors.len()].clone()),
        Palette::Generator(generate) => Some(generate(index, total)),
    }
}

/// Post-processing applied to the rendered document root.
#[derive(Clone)]
pub struct StylizeHook(pub Arc<dyn Fn(&mut SceneNode) + Send + Sync>);

impl StylizeHook {
    pub fn new(hook: impl Fn(&mut SceneNode) + Send + Sync + 'static) -> Self {
        Self(Arc::new(hook))
    }

    pub fn apply(&self, root: &mut SceneNode) {
        (self.0)(root)
    }
}

impl fmt::Debug for StylizeHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StylizeHook(..)")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaseTheme {
    /// Applied to every element of the document.
    pub global: DynamicAttributes,
    pub shape: Props,
    pub text: Props,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemTheme {
    pub icon: DynamicAttributes,
    pub label: DynamicAttributes,
    pub desc: DynamicAttributes,
    pub value: DynamicAttributes,
    pub shape: DynamicAttributes,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeConfig {
    pub color_bg: Option<String>,
    pub color_primary: Option<String>,
    pub palette: Palette,
    pub base: BaseTheme,
    pub title: Props,
    pub desc: Props,
    pub item: ItemTheme,
    #[serde(skip)]
    pub stylize: Option<StylizeHook>,
}

impl ThemeConfig {
    pub fn color_primary(&self) -> &str {
        self.color_primary.as_deref().unwrap_or(DEFAULT_COLOR_PRIMARY)
    }

    pub fn color_bg(&self) -> &str {
        self.color_bg.as_deref().unwrap_or(DEFAULT_COLOR_BG)
    }

    pub fn colors(&self) -> ThemeColors {
        let color_bg = self.color_bg();
        generate_theme_colors(&ThemeSeed {
            color_primary: self.color_primary().to_string(),
            color_bg: color_bg.to_string(),
            is_dark_mode: is_dark_color(color_bg),
        })
    }

    /// Palette color for `path`, falling back to the primary color.
    pub fn item_color(&self, path: &[usize], total: usize) -> String {
        palette_color(&self.palette, path, total).unwrap_or_else(|| self.color_primary().to_string())
    }
}
