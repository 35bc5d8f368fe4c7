use indexmap::IndexMap;

use crate::dom::{ElementId, HostDocument};

/// Attribute-based grouping protocol: any descendant bearing one of these
/// attributes is reconciled with siblings sharing the same value.
pub const MATCH_ATTRIBUTE: &str = "data-match-height";
pub const MATCH_ATTRIBUTE_SHORT: &str = "data-mh";

/// One target set discovered through an attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeGroup {
    pub value: String,
    pub members: Vec<ElementId>,
}

/// Partition every attribute-bearing descendant of `container` into groups
/// keyed by the attribute's value, in first-encounter order.
pub fn discover_groups(
    host: &dyn HostDocument,
    container: ElementId,
    attribute: &str,
) -> Vec<AttributeGroup> {
    let mut groups: IndexMap<String, Vec<ElementId>> = IndexMap::new();
    for element in host.elements_with_attribute(container, attribute) {
        let value = host.attribute(element, attribute).unwrap_or_default();
        groups.entry(value).or_default().push(element);
    }
    groups
        .into_iter()
        .map(|(value, members)| AttributeGroup { value, members })
        .collect()
}
