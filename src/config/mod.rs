//! Configuration module orchestrator following the RSB module specification.

mod core;

pub use core::{ConfigOverlay, DEFAULT_PROPERTY, DEFAULT_THROTTLE, MatchConfig, validated_property};
