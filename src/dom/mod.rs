//! Host document module orchestrator following the RSB module specification.
//!
//! Downstream code imports the host seam from here while the implementation
//! details live in the private `core` module.

mod core;

pub use core::{ElementId, HostDocument, ReadyState};
