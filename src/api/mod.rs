//! Orchestrator: the single provisioning entry point.
//!
//! Side-effects:
//! - Emits structured facts for the `path` and `skel` stages plus a
//!   `provision.result` summary, all stamped with a deterministic
//!   per-call provision id.
//! - Brackets every filesystem mutation in a `PrivilegeScope`; the broker is
//!   released on all exit paths by drop.
//! - A disabled policy returns success without touching the filesystem or
//!   the broker.

use std::path::Path;
use std::time::Instant;

use serde_json::json;

use crate::adapters::{
    LookupCache, NoopLookupCache, NoopPrivilegeBroker, PrivilegeBroker, PrivilegeScope,
};
use crate::fs;
use crate::logging::audit::{AuditCtx, StageLogger};
use crate::logging::{AuditSink, FactsEmitter};
use crate::policy::Policy;
use crate::types::{provision_id, HomeSpec, ProvisionReport, SkelReport};

pub mod errors;
pub use errors::ApiError;

/// Home-directory provisioner, parameterized over its observability sinks.
pub struct Homestead<E: FactsEmitter, A: AuditSink> {
    facts: E,
    audit: A,
    policy: Policy,
    privs: Box<dyn PrivilegeBroker>,
    cache: Box<dyn LookupCache>,
}

impl<E: FactsEmitter, A: AuditSink> Homestead<E, A> {
    pub fn new(facts: E, audit: A, policy: Policy) -> Self {
        Self {
            facts,
            audit,
            policy,
            privs: Box::new(NoopPrivilegeBroker),
            cache: Box::new(NoopLookupCache),
        }
    }

    #[must_use]
    pub fn with_privilege_broker(mut self, privs: Box<dyn PrivilegeBroker>) -> Self {
        self.privs = privs;
        self
    }

    #[must_use]
    pub fn with_lookup_cache(mut self, cache: Box<dyn LookupCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Provision `home` for `user`, owned by `uid`:`gid`.
    ///
    /// Creates the directory chain (ancestors 0:0 with the intermediate
    /// mode, leaf with the target identity and leaf mode), then populates the
    /// new home from the configured skeleton, if any. Skeleton problems are
    /// recorded in the report and logged; they never change the outcome.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::PathCreation` when the directory chain itself
    /// cannot be created; this is the only fatal path.
    pub fn provision_home(
        &self,
        home: &Path,
        user: &str,
        uid: u32,
        gid: u32,
    ) -> Result<ProvisionReport, ApiError> {
        let t0 = Instant::now();
        let mut report = ProvisionReport::default();
        if !self.policy.enabled {
            return Ok(report);
        }
        report.enabled = true;

        let spec = HomeSpec {
            home: home.to_path_buf(),
            uid,
            gid,
            dir_mode: self.policy.dir_mode,
            leaf_mode: self.policy.leaf_mode,
            skel_dir: self.policy.skel_dir.clone(),
        };
        let pid = provision_id(&spec, user);
        let tctx = AuditCtx::new(&self.facts, &self.audit, pid.to_string(), user.to_string());
        let slog = StageLogger::new(&tctx);
        let fsctx = fs::FsCtx {
            cache: self.cache.as_ref(),
            audit: &tctx,
        };

        // Everything from here on runs under the privilege bracket; the
        // scope's drop releases it on all exit paths.
        let _scope = PrivilegeScope::enter(self.privs.as_ref());

        match fs::create_path(&fsctx, &spec, user) {
            Ok(pr) => {
                slog.path()
                    .path(home.display().to_string())
                    .field("created", json!(pr.created.len()))
                    .field("already_present", json!(pr.already_present))
                    .emit_success();
                report.path = pr;
            }
            Err(e) => {
                slog.path()
                    .path(home.display().to_string())
                    .field("error", json!(e.to_string()))
                    .emit_failure();
                slog.result().path(home.display().to_string()).emit_failure();
                return Err(ApiError::PathCreation(e.to_string()));
            }
        }

        if let Some(skel) = spec.skel_dir.as_deref() {
            tctx.debug(&format!(
                "copying skeleton files from '{}' into '{}'",
                skel.display(),
                home.display()
            ));
            let sr = match fs::copy_dir(&fsctx, skel, home, uid, gid) {
                Ok(sr) => sr,
                Err(e) => {
                    tctx.debug("error copying skeleton files");
                    let mut sr = SkelReport::default();
                    sr.record_failure(e.to_string());
                    sr
                }
            };
            let builder = slog
                .skel()
                .path(home.display().to_string())
                .field("attempted", json!(sr.attempted))
                .field("copied", json!(sr.copied))
                .field("failed", json!(sr.failed))
                .field("skipped", json!(sr.skipped));
            if sr.failed == 0 {
                builder.emit_success();
            } else {
                builder.emit_warn();
            }
            report.skel = Some(sr);
        }

        report.duration_ms = u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX);
        slog.result()
            .path(home.display().to_string())
            .field("duration_ms", json!(report.duration_ms))
            .emit_success();
        Ok(report)
    }
}
