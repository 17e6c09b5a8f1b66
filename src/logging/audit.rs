//! Audit helpers that emit structured facts across provisioning stages.
//!
//! Side-effects:
//! - Emits JSON facts via `FactsEmitter` for the `path` and `skel` stages and
//!   a `provision.result` summary.
//! - Ensures a minimal envelope on every fact: `ts`, `provision_id`, `user`,
//!   `decision`.
//! - Routes leveled text diagnostics through `AuditSink`.

use log::Level;
use serde_json::{json, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::constants::SUBSYSTEM;
use crate::logging::{AuditSink, FactsEmitter};

/// Current UTC time as an RFC3339 string.
pub fn now_iso() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

pub(crate) struct AuditCtx<'a> {
    pub facts: &'a dyn FactsEmitter,
    pub audit: &'a dyn AuditSink,
    pub provision_id: String,
    pub user: String,
    pub ts: String,
}

impl<'a> AuditCtx<'a> {
    pub(crate) fn new(
        facts: &'a dyn FactsEmitter,
        audit: &'a dyn AuditSink,
        provision_id: String,
        user: String,
    ) -> Self {
        Self {
            facts,
            audit,
            provision_id,
            user,
            ts: now_iso(),
        }
    }

    pub(crate) fn warn(&self, msg: &str) {
        self.audit.log(Level::Warn, msg);
    }

    pub(crate) fn debug(&self, msg: &str) {
        self.audit.log(Level::Debug, msg);
    }

    pub(crate) fn trace(&self, msg: &str) {
        self.audit.log(Level::Trace, msg);
    }
}

/// Stage for typed fact emission.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Stage {
    Path,
    Skel,
    Result,
}

impl Stage {
    fn as_event(self) -> &'static str {
        match self {
            Stage::Path => "path",
            Stage::Skel => "skel",
            Stage::Result => "provision.result",
        }
    }
}

/// Decision severity for emitted facts.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Decision {
    Success,
    Failure,
    Warn,
}

impl Decision {
    fn as_str(self) -> &'static str {
        match self {
            Decision::Success => "success",
            Decision::Failure => "failure",
            Decision::Warn => "warn",
        }
    }
}

/// Builder facade over fact emission with a centralized envelope.
pub(crate) struct StageLogger<'a> {
    ctx: &'a AuditCtx<'a>,
}

impl<'a> StageLogger<'a> {
    pub(crate) fn new(ctx: &'a AuditCtx<'a>) -> Self {
        Self { ctx }
    }

    pub(crate) fn path(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Path)
    }

    pub(crate) fn skel(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Skel)
    }

    pub(crate) fn result(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::Result)
    }
}

pub(crate) struct EventBuilder<'a> {
    ctx: &'a AuditCtx<'a>,
    stage: Stage,
    fields: serde_json::Map<String, Value>,
}

impl<'a> EventBuilder<'a> {
    fn new(ctx: &'a AuditCtx<'a>, stage: Stage) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert("stage".to_string(), json!(stage.as_event()));
        Self { ctx, stage, fields }
    }

    pub(crate) fn path(mut self, path: impl Into<String>) -> Self {
        self.fields.insert("path".into(), json!(path.into()));
        self
    }

    pub(crate) fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    pub(crate) fn emit(self, decision: Decision) {
        let Self {
            ctx,
            stage,
            mut fields,
        } = self;
        fields.entry("ts").or_insert_with(|| json!(ctx.ts));
        fields
            .entry("provision_id")
            .or_insert_with(|| json!(ctx.provision_id));
        fields.entry("user").or_insert_with(|| json!(ctx.user));
        fields
            .entry("decision")
            .or_insert_with(|| json!(decision.as_str()));
        ctx.facts
            .emit(SUBSYSTEM, stage.as_event(), decision.as_str(), Value::Object(fields));
    }

    pub(crate) fn emit_success(self) {
        self.emit(Decision::Success);
    }

    pub(crate) fn emit_failure(self) {
        self.emit(Decision::Failure);
    }

    pub(crate) fn emit_warn(self) {
        self.emit(Decision::Warn);
    }
}
