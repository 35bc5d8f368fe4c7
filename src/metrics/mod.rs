use crate::logging::{LogEvent, LogFields, LogLevel};
use crate::reconcile::RowStats;
use serde_json::json;
use std::time::Duration;

/// Accumulated pass accounting, shared behind `Arc<Mutex<..>>` so hooks and
/// the controller can record into the same instance.
#[derive(Debug, Default, Clone)]
pub struct PassMetrics {
    passes: u64,
    target_sets: u64,
    rows: u64,
    writes: u64,
    resets: u64,
}

impl PassMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_pass(&mut self, sets: usize, stats: &RowStats) {
        self.passes = self.passes.saturating_add(1);
        self.target_sets = self.target_sets.saturating_add(sets as u64);
        self.rows = self.rows.saturating_add(stats.rows as u64);
        self.writes = self.writes.saturating_add(stats.writes as u64);
        self.resets = self.resets.saturating_add(stats.resets as u64);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            passes: self.passes,
            target_sets: self.target_sets,
            rows: self.rows,
            writes: self.writes,
            resets: self.resets,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub passes: u64,
    pub target_sets: u64,
    pub rows: u64,
    pub writes: u64,
    pub resets: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(
            LogLevel::Info,
            target.to_string(),
            "pass_metrics".to_string(),
            self.as_fields(),
        )
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("passes".to_string(), json!(self.passes));
        map.insert("target_sets".to_string(), json!(self.target_sets));
        map.insert("rows".to_string(), json!(self.rows));
        map.insert("writes".to_string(), json!(self.writes));
        map.insert("resets".to_string(), json!(self.resets));
        map
    }
}
