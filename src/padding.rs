use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_PADDING: f32 = 20.0;

/// Padding shorthand: one number, or a list of one to four numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Padding {
    Uniform(f32),
    Sides(Vec<f32>),
}

impl Default for Padding {
    fn default() -> Self {
        Padding::Uniform(DEFAULT_PADDING)
    }
}

/// Expanded `[top, right, bottom, left]`.
pub type ParsedPadding = [f32; 4];

/// Expands a shorthand the way CSS `padding` does. Any arity other than one
/// to four yields zero on every side.
pub fn parse_padding(padding: &Padding) -> ParsedPadding {
    match padding {
        Padding::Uniform(value) => [*value; 4],
        Padding::Sides(sides) => match sides.as_slice() {
            [all] => [*all; 4],
            [vertical, horizontal] => [*vertical, *horizontal, *vertical, *horizontal],
            [top, horizontal, bottom] => [*top, *horizontal, *bottom, *horizontal],
            [top, right, bottom, left] => [*top, *right, *bottom, *left],
            _ => [0.0; 4],
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid padding value: {0}")]
pub struct ParsePaddingError(String);

/// Accepts `"20"`, `"10,20"` or `"10 20 30"`.
impl FromStr for Padding {
    type Err = ParsePaddingError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let values = input
            .split(|ch: char| ch == ',' || ch.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<f32>().map_err(|_| ParsePaddingError(part.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        match values.as_slice() {
            [] => Err(ParsePaddingError(input.to_string())),
            [single] => Ok(Padding::Uniform(*single)),
            _ => Ok(Padding::Sides(values)),
        }
    }
}
