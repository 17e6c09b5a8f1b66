//! Observability seams: structured facts and leveled text diagnostics.

use log::Level;
use serde_json::Value;

/// Sink for structured provisioning facts, one JSON object per event.
pub trait FactsEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value);
}

/// Sink for leveled, human-oriented diagnostics.
///
/// Level parity is an operational surface: genuine errors (create, ownership,
/// mode failures) arrive at `Warn`; normal progress arrives at `Debug`.
pub trait AuditSink {
    fn log(&self, level: Level, msg: &str);
}

/// Default sink that discards everything; embedders supply real transports.
#[derive(Default)]
pub struct JsonlSink;

impl FactsEmitter for JsonlSink {
    fn emit(&self, _subsystem: &str, _event: &str, _decision: &str, _fields: Value) {}
}

impl AuditSink for JsonlSink {
    fn log(&self, _level: Level, _msg: &str) {}
}

/// Sink that forwards everything to the `log` facade.
#[derive(Default)]
pub struct LogSink;

impl AuditSink for LogSink {
    fn log(&self, level: Level, msg: &str) {
        log::log!(level, "{msg}");
    }
}

impl FactsEmitter for LogSink {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        log::debug!(target: "homestead::facts", "{subsystem} {event} {decision} {fields}");
    }
}
