use std::time::{Duration, Instant};

use indexmap::IndexMap;

use crate::controller::{MatchController, ViewportEvent};
use crate::dom::{ElementId, HostDocument, ReadyState};
use crate::error::Result;
use crate::geometry::{BoundingBox, Viewport};
use crate::style::{BoxSizing, parse_px};

/// Box-model inputs of one simulated element.
///
/// `natural_height` is the border-box height the layout stub reports while
/// no inline `height` declaration is present. An inline `height` write is
/// honoured the way a layout engine would: verbatim for border-box
/// elements, plus vertical insets for content-box ones. Other dimension
/// properties do not feed back into measurement; the stub models the
/// default `height` pipeline only.
#[derive(Debug, Clone, Copy)]
pub struct SimLayout {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub natural_height: f64,
    pub margin_top: f64,
    pub padding_top: f64,
    pub padding_bottom: f64,
    pub border_top: f64,
    pub border_bottom: f64,
    pub box_sizing: BoxSizing,
}

impl Default for SimLayout {
    fn default() -> Self {
        Self {
            top: 0.0,
            left: 0.0,
            width: 100.0,
            natural_height: 0.0,
            margin_top: 0.0,
            padding_top: 0.0,
            padding_bottom: 0.0,
            border_top: 0.0,
            border_bottom: 0.0,
            box_sizing: BoxSizing::ContentBox,
        }
    }
}

impl SimLayout {
    fn vertical_insets(&self) -> f64 {
        self.padding_top + self.padding_bottom + self.border_top + self.border_bottom
    }
}

#[derive(Debug, Clone, Default)]
struct SimElement {
    classes: Vec<String>,
    attributes: IndexMap<String, String>,
    inline: IndexMap<String, String>,
    has_style_attribute: bool,
    layout: SimLayout,
}

/// In-memory stand-in for a host document.
///
/// The element tree is flat: every inserted element counts as a descendant
/// of any element used as a query root (queries skip the root itself).
/// Selector support covers the class-list subset the engine's own tests
/// use: comma-separated `.class` terms.
#[derive(Debug, Default)]
pub struct SimulatedDocument {
    ready_state: Option<ReadyState>,
    elements: Vec<SimElement>,
}

impl SimulatedDocument {
    pub fn new() -> Self {
        Self {
            ready_state: None,
            elements: Vec::new(),
        }
    }

    /// Start building a new element; `insert` finishes it and returns its
    /// handle. Insertion order is document order.
    pub fn element(&mut self) -> SimElementBuilder<'_> {
        SimElementBuilder {
            doc: self,
            element: SimElement::default(),
        }
    }

    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_state = Some(state);
    }

    /// Mutable access to an element's layout inputs, for scripting layout
    /// changes between passes.
    pub fn layout_mut(&mut self, element: ElementId) -> &mut SimLayout {
        &mut self.entry_mut(element).layout
    }

    /// Current inline declaration for a property, if any.
    pub fn inline_style(&self, element: ElementId, property: &str) -> Option<String> {
        self.entry(element).inline.get(property).cloned()
    }

    pub fn has_style_attribute(&self, element: ElementId) -> bool {
        self.entry(element).has_style_attribute
    }

    fn entry(&self, element: ElementId) -> &SimElement {
        &self.elements[element.raw() as usize]
    }

    fn entry_mut(&mut self, element: ElementId) -> &mut SimElement {
        &mut self.elements[element.raw() as usize]
    }

    fn measured_height(&self, element: &SimElement) -> f64 {
        match element.inline.get("height") {
            Some(value) => {
                let px = parse_px(value);
                match element.layout.box_sizing {
                    BoxSizing::BorderBox => px,
                    BoxSizing::ContentBox => px + element.layout.vertical_insets(),
                }
            }
            None => element.layout.natural_height,
        }
    }

    fn matches_selector(&self, element: &SimElement, selector: &str) -> bool {
        selector.split(',').map(str::trim).any(|term| {
            term.strip_prefix('.')
                .is_some_and(|class| element.classes.iter().any(|c| c == class))
        })
    }
}

impl HostDocument for SimulatedDocument {
    fn ready_state(&self) -> ReadyState {
        self.ready_state.unwrap_or(ReadyState::Complete)
    }

    fn select(&self, root: ElementId, selector: &str) -> Vec<ElementId> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(idx, element)| {
                *idx as u64 != root.raw() && self.matches_selector(element, selector)
            })
            .map(|(idx, _)| ElementId::from_raw(idx as u64))
            .collect()
    }

    fn elements_with_attribute(&self, root: ElementId, name: &str) -> Vec<ElementId> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(idx, element)| {
                *idx as u64 != root.raw() && element.attributes.contains_key(name)
            })
            .map(|(idx, _)| ElementId::from_raw(idx as u64))
            .collect()
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.entry(element).attributes.get(name).cloned()
    }

    fn bounding_box(&self, element: ElementId) -> BoundingBox {
        let entry = self.entry(element);
        BoundingBox::new(
            entry.layout.top,
            entry.layout.left,
            entry.layout.width,
            self.measured_height(entry),
        )
    }

    fn computed_style(&self, element: ElementId, property: &str) -> String {
        let entry = self.entry(element);
        let px = |value: f64| format!("{}px", value);
        match property {
            "margin-top" => px(entry.layout.margin_top),
            "padding-top" => px(entry.layout.padding_top),
            "padding-bottom" => px(entry.layout.padding_bottom),
            "border-top-width" => px(entry.layout.border_top),
            "border-bottom-width" => px(entry.layout.border_bottom),
            "box-sizing" => match entry.layout.box_sizing {
                BoxSizing::BorderBox => "border-box".to_string(),
                BoxSizing::ContentBox => "content-box".to_string(),
            },
            other => entry.inline.get(other).cloned().unwrap_or_default(),
        }
    }

    fn set_style_property(&mut self, element: ElementId, property: &str, value: &str) {
        let entry = self.entry_mut(element);
        if value.is_empty() {
            entry.inline.shift_remove(property);
        } else {
            entry.inline.insert(property.to_string(), value.to_string());
            entry.has_style_attribute = true;
        }
    }

    fn style_attribute(&self, element: ElementId) -> Option<String> {
        let entry = self.entry(element);
        entry.has_style_attribute.then(|| {
            entry
                .inline
                .iter()
                .map(|(property, value)| format!("{}: {};", property, value))
                .collect::<Vec<_>>()
                .join(" ")
        })
    }

    fn remove_style_attribute(&mut self, element: ElementId) {
        let entry = self.entry_mut(element);
        entry.inline.clear();
        entry.has_style_attribute = false;
    }
}

/// Builder for one simulated element.
pub struct SimElementBuilder<'a> {
    doc: &'a mut SimulatedDocument,
    element: SimElement,
}

impl<'a> SimElementBuilder<'a> {
    pub fn class(mut self, name: impl Into<String>) -> Self {
        self.element.classes.push(name.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.element.attributes.insert(name.into(), value.into());
        self
    }

    pub fn top(mut self, top: f64) -> Self {
        self.element.layout.top = top;
        self
    }

    pub fn natural_height(mut self, height: f64) -> Self {
        self.element.layout.natural_height = height;
        self
    }

    pub fn margin_top(mut self, margin: f64) -> Self {
        self.element.layout.margin_top = margin;
        self
    }

    pub fn padding(mut self, top: f64, bottom: f64) -> Self {
        self.element.layout.padding_top = top;
        self.element.layout.padding_bottom = bottom;
        self
    }

    pub fn border(mut self, top: f64, bottom: f64) -> Self {
        self.element.layout.border_top = top;
        self.element.layout.border_bottom = bottom;
        self
    }

    pub fn box_sizing(mut self, box_sizing: BoxSizing) -> Self {
        self.element.layout.box_sizing = box_sizing;
        self
    }

    /// Pre-set a stale inline `height` declaration, as a previous pass
    /// would have left behind.
    pub fn inline_height(mut self, height: f64) -> Self {
        self.element
            .inline
            .insert("height".to_string(), format!("{}px", height));
        self.element.has_style_attribute = true;
        self
    }

    pub fn insert(self) -> ElementId {
        let id = ElementId::from_raw(self.doc.elements.len() as u64);
        self.doc.elements.push(self.element);
        id
    }
}

/// Scripted driver pairing a [`SimulatedDocument`] with a deterministic
/// clock. Dispatches viewport events into a controller at the simulated
/// time, the way the host's event loop and timer would.
pub struct SimulatedViewport {
    document: SimulatedDocument,
    now: Instant,
}

impl SimulatedViewport {
    pub fn new(document: SimulatedDocument) -> Self {
        Self {
            document,
            now: Instant::now(),
        }
    }

    pub fn document(&self) -> &SimulatedDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut SimulatedDocument {
        &mut self.document
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    /// Move the simulated clock forward.
    pub fn advance(&mut self, delta: Duration) {
        self.now += delta;
    }

    /// Attach the controller to this viewport's document.
    pub fn bind(&mut self, controller: &mut MatchController) -> Result<()> {
        controller.bind(&mut self.document)
    }

    /// Mark the document ready and deliver the one-shot content-ready
    /// signal.
    pub fn content_ready(&mut self, controller: &mut MatchController) -> Result<()> {
        self.document.set_ready_state(ReadyState::Complete);
        self.dispatch(controller, ViewportEvent::ContentReady)
    }

    pub fn resize(&mut self, controller: &mut MatchController, viewport: Viewport) -> Result<()> {
        self.dispatch(controller, ViewportEvent::Resize(viewport))
    }

    pub fn orientation_change(&mut self, controller: &mut MatchController) -> Result<()> {
        self.dispatch(controller, ViewportEvent::OrientationChange)
    }

    pub fn dispatch(
        &mut self,
        controller: &mut MatchController,
        event: ViewportEvent,
    ) -> Result<()> {
        controller.on_event(&mut self.document, event, self.now)
    }

    /// Fire the controller's deferred pass if its deadline has passed,
    /// standing in for the host's timer.
    pub fn tick(&mut self, controller: &mut MatchController) -> Result<()> {
        controller.poll(&mut self.document, self.now)
    }
}
