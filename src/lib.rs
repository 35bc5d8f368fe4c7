//! Experimental pilot implementation of the Level height-matching engine MVP.
//!
//! Level equalizes the rendered height (or another box dimension) of
//! related elements by partitioning them into visual rows from post-layout
//! geometry and writing each row's target dimension back through a
//! host-provided document seam. The modules follow the RSB `MODULE_SPEC`
//! pattern so we can eventually promote the code into a production crate
//! without major surgery.

pub mod config;
pub mod controller;
pub mod dom;
pub mod error;
pub mod geometry;
pub mod groups;
pub mod logging;
pub mod metrics;
pub mod reconcile;
pub mod sim;
pub mod style;

pub use config::{ConfigOverlay, DEFAULT_PROPERTY, DEFAULT_THROTTLE, MatchConfig, validated_property};
pub use controller::diagnostics::{LifecycleLoggerHook, MetricsSnapshotHook};
pub use controller::throttle::{ThrottleDecision, ThrottleGate};
pub use controller::{
    ControllerSettings, MatchController, PassHooks, PassReport, ViewportEvent, match_height,
};
pub use dom::{ElementId, HostDocument, ReadyState};
pub use error::{MatchError, Result};
pub use geometry::{BoundingBox, Viewport};
pub use groups::{AttributeGroup, MATCH_ATTRIBUTE, MATCH_ATTRIBUTE_SHORT, discover_groups};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink,
};
pub use metrics::{MetricSnapshot, PassMetrics};
pub use reconcile::{ROW_TOLERANCE, RowItem, RowStats, reconcile};
pub use sim::{SimElementBuilder, SimLayout, SimulatedDocument, SimulatedViewport};
pub use style::{BoxSizing, clear_property, format_px, parse_px, vertical_insets};
