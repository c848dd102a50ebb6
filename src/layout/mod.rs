/// Derives `from_token`/`as_str` for a keyword enum. The first token of each
/// variant is canonical; the rest are accepted aliases.
macro_rules! keyword_enum {
    ($ty:ident { $($variant:ident => $name:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl $ty {
            pub fn from_token(token: &str) -> Option<Self> {
                match token {
                    $($name $(| $alias)* => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }
    };
}

mod align;
mod flex;
pub mod force;
pub mod tree;

pub use align::*;
pub use flex::*;

use crate::scene::{Bounds, SceneNode, group};
use serde::{Deserialize, Serialize};

/// Coarse placement of an item relative to the layout center, used by items
/// to mirror their internal arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PositionClass {
    #[default]
    Normal,
    Center,
    Flipped,
}

/// Moves `node` so the top-left corner of `bounds` lands on `(x, y)`.
pub(crate) fn place(node: &SceneNode, bounds: &Bounds, x: f32, y: f32) -> SceneNode {
    let dx = x - bounds.x;
    let dy = y - bounds.y;
    if dx.abs() < f32::EPSILON && dy.abs() < f32::EPSILON {
        return node.clone();
    }
    group().at(dx, dy).child(node.clone())
}

/// Container props shared by the layout components. A declared size is kept
/// so the container resolves to its own box rather than its content.
pub(crate) fn container(props: &crate::scene::Props) -> SceneNode {
    let mut node = group();
    for key in ["id", "x", "y", "width", "height", crate::scene::ROLE_KEY] {
        if let Some(value) = props.get(key) {
            node.props.insert(key.to_string(), value.clone());
        }
    }
    node
}
