//! Lookup-cache invalidation seam.
//!
//! Filesystem layers that cache lookup results (a prior "not found" in
//! particular) must be invalidated before every existence check, or a
//! directory created earlier in the same call could still appear missing on
//! the next check. The crate only consumes the invalidation hook; the cache
//! itself belongs to the embedding application's filesystem layer.

use std::path::Path;

pub trait LookupCache {
    fn invalidate(&self, path: &Path);
}

/// Cache adapter for filesystem layers that do not cache lookups.
#[derive(Default)]
pub struct NoopLookupCache;

impl LookupCache for NoopLookupCache {
    fn invalidate(&self, _path: &Path) {}
}
