//! Filesystem mechanism: directory-chain creation and skeleton population.
//!
//! Pure mechanism, no policy. Callers hold the privilege bracket; every
//! existence check goes through the injected `LookupCache` invalidation hook
//! first.

use std::path::Path;

use rustix::fs::{AtFlags, Mode, CWD};
use rustix::process::{Gid, Uid};

use crate::adapters::LookupCache;
use crate::logging::audit::AuditCtx;

pub(crate) mod dirs;
pub(crate) mod meta;
pub(crate) mod skel;

pub(crate) use dirs::create_path;
pub(crate) use skel::copy_dir;

/// Shared call context for the mechanism layer.
pub(crate) struct FsCtx<'a> {
    pub cache: &'a dyn LookupCache,
    pub audit: &'a AuditCtx<'a>,
}

pub(crate) fn errno_to_io(e: rustix::io::Errno) -> std::io::Error {
    std::io::Error::from_raw_os_error(e.raw_os_error())
}

/// chown following symlinks (directories and regular files).
pub(crate) fn chown(path: &Path, uid: u32, gid: u32) -> std::io::Result<()> {
    rustix::fs::chown(path, Some(Uid::from_raw(uid)), Some(Gid::from_raw(gid)))
        .map_err(errno_to_io)
}

/// chown on the node itself, never its target (symlinks).
pub(crate) fn lchown(path: &Path, uid: u32, gid: u32) -> std::io::Result<()> {
    rustix::fs::chownat(
        CWD,
        path,
        Some(Uid::from_raw(uid)),
        Some(Gid::from_raw(gid)),
        AtFlags::SYMLINK_NOFOLLOW,
    )
    .map_err(errno_to_io)
}

pub(crate) fn chmod(path: &Path, mode: u32) -> std::io::Result<()> {
    rustix::fs::chmod(path, Mode::from_bits_truncate(mode)).map_err(errno_to_io)
}

#[cfg(test)]
macro_rules! test_fs_ctx {
    ($ctx:ident) => {
        let facts = crate::logging::JsonlSink;
        let audit = crate::logging::JsonlSink;
        let actx =
            crate::logging::audit::AuditCtx::new(&facts, &audit, "test".into(), "test".into());
        let cache = crate::adapters::NoopLookupCache;
        let $ctx = crate::fs::FsCtx {
            cache: &cache,
            audit: &actx,
        };
    };
}
#[cfg(test)]
pub(crate) use test_fs_ctx;
