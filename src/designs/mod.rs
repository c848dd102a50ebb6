//! Design catalog: reusable components, item designs and structures, plus
//! the composition step that turns them into a role-tagged template.

pub mod components;
pub mod items;
pub mod structures;

pub use items::{ITEMS, ItemComponent, ItemProps, item_by_name};
pub use structures::{STRUCTURES, Structure, StructureProps, structure_by_name};

use crate::error::{RenderError, Result};
use crate::render::{Document, InfographicOptions, Renderer, StaticSurface, attach_and_fit};
use crate::scene::{LayoutContext, materialize};
use crate::text_metrics::TextMeasure;
use tracing::{debug, warn};

/// Builds the template for `structure` drawing each datum with `item`.
///
/// Components are expanded with `measure`, so the result only holds
/// primitive nodes and can be stored, edited and rendered later.
pub fn compose(
    structure: &str,
    item: &str,
    options: &InfographicOptions,
    measure: &dyn TextMeasure,
) -> Result<Document> {
    let structure = structure_by_name(structure)
        .ok_or_else(|| RenderError::UnknownStructure(structure.to_string()))?;
    let item = item_by_name(item).ok_or_else(|| RenderError::UnknownItem(item.to_string()))?;
    let ctx = LayoutContext::new(measure);
    let colors = options.theme.colors();
    let props = StructureProps {
        data: &options.data,
        item,
        layout: &options.layout,
        colors: &colors,
        ctx,
    };
    let root = materialize(&structure.render(&props), &ctx);
    debug!(
        structure = structure.name(),
        item = item.name(),
        items = options.data.items.len(),
        dark = colors.is_dark_mode,
        "template composed"
    );
    Ok(Document::new(root))
}

/// Composes, renders and fits a graphic in one go.
pub fn render_infographic(
    structure: &str,
    item: &str,
    options: &InfographicOptions,
    measure: &dyn TextMeasure,
) -> Result<Document> {
    let template = compose(structure, item, options, measure)?;
    render_template(template, options, measure)
}

/// Renders a stored template and fits its frame to the content.
pub fn render_template(
    template: Document,
    options: &InfographicOptions,
    measure: &dyn TextMeasure,
) -> Result<Document> {
    let mut renderer = Renderer::new(options.clone(), template);
    renderer.render()?;
    let mut document = renderer.into_document();
    if !attach_and_fit(&mut document, &StaticSurface::new(measure), &options.render) {
        warn!("document has no content to fit; leaving the view box unset");
    }
    Ok(document)
}
