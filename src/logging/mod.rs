pub mod facts;
pub(crate) mod audit;

pub use audit::now_iso;
pub use facts::{AuditSink, FactsEmitter, JsonlSink, LogSink};
