//! Box-model helper module orchestrator following the RSB module specification.

mod core;

pub use core::{BoxSizing, clear_property, format_px, parse_px, vertical_insets};
