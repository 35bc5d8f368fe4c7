//! Attribute grouping module orchestrator following the RSB module specification.

mod core;

pub use core::{AttributeGroup, MATCH_ATTRIBUTE, MATCH_ATTRIBUTE_SHORT, discover_groups};
