use crate::geometry::BoundingBox;

/// Opaque handle to a host-managed element.
///
/// Handles are issued by the host and compared by identity, never by
/// content. A handle stays measurable for at least the duration of one
/// synchronous pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

/// Document loading phase as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// Content is still being parsed; defer the first pass.
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ReadyState::Loading)
    }
}

/// Seam to the embedding document and its layout engine.
///
/// The engine only ever talks to the document through this trait: geometry
/// and computed-style reads are synchronous, and an inline style write must
/// be visible on the next read. Everything else about the host (tree
/// construction, event dispatch, reflow scheduling) stays on the host's
/// side of the seam.
pub trait HostDocument {
    /// Current loading phase of the document.
    fn ready_state(&self) -> ReadyState;

    /// All descendants of `root` matching a CSS selector, in document order.
    fn select(&self, root: ElementId, selector: &str) -> Vec<ElementId>;

    /// All descendants of `root` bearing the attribute, in document order.
    fn elements_with_attribute(&self, root: ElementId, name: &str) -> Vec<ElementId>;

    /// Attribute value, or `None` when the attribute is absent.
    fn attribute(&self, element: ElementId, name: &str) -> Option<String>;

    /// Live post-layout bounding box of the element.
    fn bounding_box(&self, element: ElementId) -> BoundingBox;

    /// Resolved value of a computed style property, empty when unresolved.
    fn computed_style(&self, element: ElementId, property: &str) -> String;

    /// Write one inline style declaration. An empty value removes the
    /// declaration without touching the rest of the inline style.
    fn set_style_property(&mut self, element: ElementId, property: &str, value: &str);

    /// Serialized inline `style` attribute, `None` when the attribute is
    /// absent (as opposed to present but empty).
    fn style_attribute(&self, element: ElementId) -> Option<String>;

    /// Drop the inline `style` attribute entirely.
    fn remove_style_attribute(&mut self, element: ElementId);
}
