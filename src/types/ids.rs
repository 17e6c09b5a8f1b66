//! Deterministic UUIDv5 identifiers for provisioning calls.
//!
//! The UUID namespace is derived from a stable tag (`NS_TAG`) so that the
//! same (user, home) pair yields the same `provision_id` across runs, which
//! lets log pipelines correlate retries of the same provisioning event.
use uuid::Uuid;

use super::spec::HomeSpec;
use crate::constants::NS_TAG;

fn namespace() -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, NS_TAG.as_bytes())
}

/// Compute the deterministic id stamped on every fact of one call.
#[must_use]
pub fn provision_id(spec: &HomeSpec, user: &str) -> Uuid {
    let s = format!("{user}@{}", spec.home.display());
    Uuid::new_v5(&namespace(), s.as_bytes())
}
