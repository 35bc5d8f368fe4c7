use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::dom::ElementId;

/// Property used when the configured one fails validation.
pub const DEFAULT_PROPERTY: &str = "height";

/// Default minimum spacing between triggered recompute passes.
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(80);

/// Lower-case CSS-ish identifier, two characters or more. Property names
/// and grouping attribute names both validate against this shape.
static PROPERTY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z-]{2,}$").expect("property name pattern"));

/// Validate a property or attribute name, returning its canonical
/// (ASCII-lowercased) form.
pub fn validated_property(raw: &str) -> Option<String> {
    let canonical = raw.to_ascii_lowercase();
    PROPERTY_NAME.is_match(&canonical).then_some(canonical)
}

/// Resolved per-controller configuration.
///
/// Built by merging a caller [`ConfigOverlay`] over [`MatchConfig::default`].
/// The dimension property is sanitized once at controller construction and
/// stays constant for the instance's lifetime.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Explicit CSS selector for the managed elements. Takes precedence
    /// over attribute-based grouping when non-empty after trimming.
    pub selector: Option<String>,
    /// Partition the set into visual rows; when false the whole set is
    /// reconciled as a single row.
    pub by_row: bool,
    /// External element whose measured dimension every member takes,
    /// bypassing the max-height vote. Never written to itself.
    pub target: Option<ElementId>,
    /// Attribute whose value defines group membership when no selector is
    /// given.
    pub group_attribute: Option<String>,
    /// Attribute value selecting the primary target set.
    pub group_value: Option<String>,
    /// The box dimension being equalized.
    pub property: String,
    /// Members excluded from the vote write-back: they receive the row's
    /// dimension, then immediately have it reset.
    pub excluded: Vec<ElementId>,
    /// Whether the controller self-installs resize/orientation triggers.
    pub events: bool,
    /// Minimum spacing between triggered passes. Zero disables throttling.
    pub throttle: Duration,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            selector: None,
            by_row: true,
            target: None,
            group_attribute: None,
            group_value: None,
            property: DEFAULT_PROPERTY.to_string(),
            excluded: Vec::new(),
            events: true,
            throttle: DEFAULT_THROTTLE,
        }
    }
}

impl MatchConfig {
    /// True when `element` is excluded from write-back by handle identity.
    pub fn is_excluded(&self, element: ElementId) -> bool {
        self.excluded.contains(&element)
    }
}

/// Caller-supplied configuration fragment.
///
/// Every field is optional; unset fields take the default. Merging is pure
/// and field-by-field, caller values win.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverlay {
    pub selector: Option<String>,
    pub by_row: Option<bool>,
    pub target: Option<ElementId>,
    pub group_attribute: Option<String>,
    pub group_value: Option<String>,
    pub property: Option<String>,
    pub excluded: Option<Vec<ElementId>>,
    pub events: Option<bool>,
    pub throttle: Option<Duration>,
}

impl ConfigOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    pub fn by_row(mut self, by_row: bool) -> Self {
        self.by_row = Some(by_row);
        self
    }

    pub fn target(mut self, target: ElementId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn group(mut self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        self.group_attribute = Some(attribute.into());
        self.group_value = Some(value.into());
        self
    }

    pub fn property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    /// Exclude a single element from the write-back.
    pub fn exclude(mut self, element: ElementId) -> Self {
        self.excluded.get_or_insert_with(Vec::new).push(element);
        self
    }

    /// Exclude a collection of elements from the write-back.
    pub fn exclude_all(mut self, elements: impl IntoIterator<Item = ElementId>) -> Self {
        self.excluded.get_or_insert_with(Vec::new).extend(elements);
        self
    }

    pub fn events(mut self, events: bool) -> Self {
        self.events = Some(events);
        self
    }

    pub fn throttle(mut self, throttle: Duration) -> Self {
        self.throttle = Some(throttle);
        self
    }

    /// Merge this overlay over `base`, caller fields winning.
    pub fn merge_over(self, base: MatchConfig) -> MatchConfig {
        MatchConfig {
            selector: self.selector.or(base.selector),
            by_row: self.by_row.unwrap_or(base.by_row),
            target: self.target.or(base.target),
            group_attribute: self.group_attribute.or(base.group_attribute),
            group_value: self.group_value.or(base.group_value),
            property: self.property.unwrap_or(base.property),
            excluded: self.excluded.unwrap_or(base.excluded),
            events: self.events.unwrap_or(base.events),
            throttle: self.throttle.unwrap_or(base.throttle),
        }
    }

    /// Merge over the stock defaults.
    pub fn resolve(self) -> MatchConfig {
        self.merge_over(MatchConfig::default())
    }
}
