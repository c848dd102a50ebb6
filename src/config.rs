use crate::padding::Padding;
use crate::theme::ThemeConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Where the first item of a circular structure sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartMode {
    /// Items are rotated half a slot so the ring is symmetric about the top.
    #[default]
    Top,
    /// The first slot starts exactly at twelve o'clock.
    Equal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Gap between neighbouring items in list structures.
    pub gap: f32,
    pub columns: usize,
    pub steps_gap: f32,
    pub level_gap: f32,
    pub node_gap: f32,
    pub radius: f32,
    pub start_mode: StartMode,
    pub spacing: f32,
    pub ticks: usize,
    pub show_connections: bool,
    pub title_width: f32,
    pub connector_color: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            gap: 20.0,
            columns: 3,
            steps_gap: 40.0,
            level_gap: 80.0,
            node_gap: 60.0,
            radius: 150.0,
            start_mode: StartMode::Top,
            spacing: 120.0,
            ticks: crate::layout::force::DEFAULT_TICKS,
            show_connections: true,
            title_width: 720.0,
            connector_color: "#1890ff".to_string(),
        }
    }
}

/// A document dimension: plain numbers are pixels, strings pass through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Length {
    Px(f32),
    Css(String),
}

impl Length {
    pub fn to_attr(&self) -> String {
        match self {
            Length::Px(value) => format!("{}px", crate::scene::format_number(*value)),
            Length::Css(value) => value.clone(),
        }
    }

    /// Pixel size, when the length is absolute.
    pub fn as_px(&self) -> Option<f32> {
        match self {
            Length::Px(value) => Some(*value),
            Length::Css(value) => value.strip_suffix("px").unwrap_or(value).trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ViewBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use crate::scene::format_number;
        write!(
            f,
            "{} {} {} {}",
            format_number(self.x),
            format_number(self.y),
            format_number(self.width),
            format_number(self.height)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid viewBox `{0}`")]
pub struct ViewBoxError(String);

impl FromStr for ViewBox {
    type Err = ViewBoxError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let parts = input
            .split(|ch: char| ch == ',' || ch.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(str::parse::<f32>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ViewBoxError(input.to_string()))?;
        match parts.as_slice() {
            [x, y, width, height] => Ok(ViewBox::new(*x, *y, *width, *height)),
            _ => Err(ViewBoxError(input.to_string())),
        }
    }
}

impl TryFrom<String> for ViewBox {
    type Error = ViewBoxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ViewBox> for String {
    fn from(value: ViewBox) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    pub padding: Padding,
    /// Fixed frame; when set the fit-to-content pass is skipped.
    pub view_box: Option<ViewBox>,
    pub width: Option<Length>,
    pub height: Option<Length>,
    pub id: Option<String>,
    pub class_name: Option<String>,
    pub attributes: BTreeMap<String, String>,
    /// Keep the add/remove affordances in the output.
    pub show_buttons: bool,
    /// Raster size used when the document has no intrinsic size.
    pub raster_width: f32,
    pub raster_height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            padding: Padding::default(),
            view_box: None,
            width: None,
            height: None,
            id: None,
            class_name: None,
            attributes: BTreeMap::new(),
            show_buttons: false,
            raster_width: 1200.0,
            raster_height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: ThemeConfig,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    #[serde(alias = "themeConfig")]
    theme: Option<ThemeConfig>,
    layout: Option<LayoutConfig>,
    render: Option<RenderConfig>,
    padding: Option<Padding>,
    view_box: Option<ViewBox>,
    width: Option<Length>,
    height: Option<Length>,
}

/// Parses a JSON or JSON5 configuration document onto the defaults.
///
/// Top-level `padding`, `viewBox`, `width` and `height` are accepted as
/// shorthands for the same keys under `render`.
pub fn parse_config(source: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = json5::from_str(source)?;
    let mut config = Config::default();
    if let Some(theme) = parsed.theme {
        config.theme = theme;
    }
    if let Some(layout) = parsed.layout {
        config.layout = layout;
    }
    if let Some(render) = parsed.render {
        config.render = render;
    }
    if let Some(padding) = parsed.padding {
        config.render.padding = padding;
    }
    if let Some(view_box) = parsed.view_box {
        config.render.view_box = Some(view_box);
    }
    if let Some(width) = parsed.width {
        config.render.width = Some(width);
    }
    if let Some(height) = parsed.height {
        config.render.height = Some(height);
    }
    Ok(config)
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let config = load_config(None).expect("defaults");
        assert_eq!(config.layout.gap, 20.0);
        assert_eq!(config.layout.ticks, 300);
        assert_eq!(config.render.padding, Padding::Uniform(20.0));
        assert!(!config.render.show_buttons);
    }

    #[test]
    fn merges_sections_and_shorthands() {
        let config = parse_config(
            r##"{
                // comments are fine
                theme: { colorPrimary: "#1890FF" },
                layout: { gap: 32, startMode: "equal" },
                padding: [10, 20],
                viewBox: "0 0 400 300",
                width: 640,
            }"##,
        )
        .expect("config");
        assert_eq!(config.theme.color_primary(), "#1890FF");
        assert_eq!(config.layout.gap, 32.0);
        assert_eq!(config.layout.columns, 3);
        assert_eq!(config.layout.start_mode, StartMode::Equal);
        assert_eq!(config.render.padding, Padding::Sides(vec![10.0, 20.0]));
        assert_eq!(config.render.view_box, Some(ViewBox::new(0.0, 0.0, 400.0, 300.0)));
        assert_eq!(config.render.width.as_ref().map(Length::to_attr).as_deref(), Some("640px"));
    }

    #[test]
    fn view_box_round_trips_as_text() {
        let view_box: ViewBox = "-10 -5.5 120 80".parse().expect("view box");
        assert_eq!(view_box.to_string(), "-10 -5.5 120 80");
        assert!("1 2 3".parse::<ViewBox>().is_err());
    }

    #[test]
    fn css_lengths_pass_through() {
        assert_eq!(Length::Css("100%".into()).to_attr(), "100%");
        assert_eq!(Length::Css("300px".into()).as_px(), Some(300.0));
        assert_eq!(Length::Px(12.5).as_px(), Some(12.5));
    }
}
