use super::Document;
use crate::config::{RenderConfig, ViewBox};
use crate::padding::{ParsedPadding, parse_padding};
use crate::scene::{Bounds, LayoutContext, resolve_bounds};
use crate::text_metrics::TextMeasure;
use tracing::debug;

/// The host a document is attached to, able to report geometry.
pub trait HostSurface {
    fn is_attached(&self) -> bool;

    /// Bounding box of the document content in user units.
    fn content_bounds(&self, document: &Document) -> Option<Bounds>;

    /// Rendered size of the document element, when the host knows it.
    fn viewport_size(&self, document: &Document) -> Option<(f32, f32)>;
}

/// Measures documents offline through a text oracle.
pub struct StaticSurface<'a> {
    measure: &'a dyn TextMeasure,
}

impl<'a> StaticSurface<'a> {
    pub fn new(measure: &'a dyn TextMeasure) -> Self {
        Self { measure }
    }
}

impl HostSurface for StaticSurface<'_> {
    fn is_attached(&self) -> bool {
        true
    }

    fn content_bounds(&self, document: &Document) -> Option<Bounds> {
        let ctx = LayoutContext::new(self.measure);
        Some(resolve_bounds(&document.root, &ctx))
    }

    fn viewport_size(&self, document: &Document) -> Option<(f32, f32)> {
        let width = document.width.as_ref()?.as_px()?;
        let height = document.height.as_ref()?.as_px()?;
        Some((width, height))
    }
}

/// A surface the document has not been attached to yet.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedSurface;

impl HostSurface for DetachedSurface {
    fn is_attached(&self) -> bool {
        false
    }

    fn content_bounds(&self, _document: &Document) -> Option<Bounds> {
        None
    }

    fn viewport_size(&self, _document: &Document) -> Option<(f32, f32)> {
        None
    }
}

/// Second rendering phase: frame the document around its content.
///
/// A fixed view box from `config` is applied as is. Otherwise the view box
/// becomes the content box grown by the configured padding. Returns `false`
/// and leaves the document untouched when the surface is detached or the
/// content has no area.
pub fn attach_and_fit(document: &mut Document, surface: &dyn HostSurface, config: &RenderConfig) -> bool {
    if let Some(view_box) = config.view_box {
        debug!(%view_box, "fixed view box, skipping fit");
        document.view_box = Some(view_box);
        return true;
    }
    fit_padding(document, surface, parse_padding(&config.padding))
}

fn fit_padding(document: &mut Document, surface: &dyn HostSurface, padding: ParsedPadding) -> bool {
    if !surface.is_attached() {
        debug!("document not attached, skipping fit");
        return false;
    }
    let Some(bbox) = surface.content_bounds(document) else {
        return false;
    };
    if bbox.is_empty() {
        debug!(?bbox, "degenerate content box, skipping fit");
        return false;
    }

    // Padding is given in screen pixels; convert it to user units when the
    // element's rendered size is known.
    let [top, right, bottom, left] = match surface.viewport_size(document) {
        Some((width, height)) if width > 0.0 && height > 0.0 => {
            let scale_x = bbox.width / width;
            let scale_y = bbox.height / height;
            [
                padding[0] * scale_y,
                padding[1] * scale_x,
                padding[2] * scale_y,
                padding[3] * scale_x,
            ]
        }
        _ => padding,
    };
    let view_box = ViewBox::new(
        bbox.x - left,
        bbox.y - top,
        bbox.width + right + left,
        bbox.height + top + bottom,
    );
    debug!(%view_box, "fitted view box");
    document.view_box = Some(view_box);
    true
}
