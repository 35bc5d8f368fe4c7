use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde_json::json;

use crate::error::Result;
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::PassMetrics;

use super::{PassHooks, PassReport};

/// Logs pass lifecycle events for observability/debugging.
pub struct LifecycleLoggerHook {
    logger: Logger,
    level: LogLevel,
}

impl LifecycleLoggerHook {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            level: LogLevel::Debug,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    fn emit(&self, message: &str, fields: impl IntoIterator<Item = (String, serde_json::Value)>) {
        let event = event_with_fields(self.level, "level::controller.lifecycle", message, fields);
        let _ = self.logger.log_event(event);
    }
}

impl PassHooks for LifecycleLoggerHook {
    fn name(&self) -> &str {
        "diagnostics.lifecycle_logger"
    }

    fn before_update(&mut self) -> Result<()> {
        self.emit("pass_started", std::iter::empty());
        Ok(())
    }

    fn after_update(&mut self, report: &PassReport) -> Result<()> {
        self.emit(
            "pass_finished",
            [
                json_kv("sets", json!(report.sets)),
                json_kv("rows", json!(report.stats.rows)),
                json_kv("singleton_rows", json!(report.stats.singleton_rows)),
                json_kv("writes", json!(report.stats.writes)),
                json_kv("resets", json!(report.stats.resets)),
            ],
        );
        Ok(())
    }
}

/// Periodically emits pass metrics snapshots through the provided logger.
pub struct MetricsSnapshotHook {
    logger: Logger,
    metrics: Arc<Mutex<PassMetrics>>,
    target: String,
    interval: Duration,
    last_emit: Option<Instant>,
    started_at: Instant,
}

impl MetricsSnapshotHook {
    pub fn new(logger: Logger, metrics: Arc<Mutex<PassMetrics>>) -> Self {
        Self {
            logger,
            metrics,
            target: "level::controller.metrics".to_string(),
            interval: Duration::from_secs(5),
            last_emit: None,
            started_at: Instant::now(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    fn emit_snapshot(&mut self) {
        if self.interval.is_zero() {
            return;
        }

        let now = Instant::now();
        if let Some(last) = self.last_emit {
            if now.duration_since(last) < self.interval {
                return;
            }
        }

        self.last_emit = Some(now);
        let uptime = now.duration_since(self.started_at);

        if let Ok(guard) = self.metrics.lock() {
            let event = guard.snapshot(uptime).to_log_event(&self.target);
            let _ = self.logger.log_event(event);
        }
    }
}

impl PassHooks for MetricsSnapshotHook {
    fn name(&self) -> &str {
        "diagnostics.metrics_snapshot"
    }

    fn after_update(&mut self, _report: &PassReport) -> Result<()> {
        self.emit_snapshot();
        Ok(())
    }
}
