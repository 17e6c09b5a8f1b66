//! Directory-chain creation with differentiated intermediate/leaf identity.
//!
//! Intermediate ancestors are created owned 0:0 with the configured
//! intermediate mode; only the leaf gets the target identity and leaf mode.
//! A directory that already exists at any step is left untouched.

use std::path::{Component, Path, PathBuf};

use rustix::fs::Mode;
use rustix::process::umask;

use super::{chown, errno_to_io, FsCtx};
use crate::types::{Error, ErrorKind, HomeSpec, PathReport, Result};

/// Zeroes the process umask so directory modes apply exactly as requested;
/// restores the previous mask on drop, on success and failure paths alike.
/// The umask is process-global, so callers must not overlap two guards.
struct UmaskGuard {
    prev: Mode,
}

impl UmaskGuard {
    fn zero() -> Self {
        Self {
            prev: umask(Mode::empty()),
        }
    }
}

impl Drop for UmaskGuard {
    fn drop(&mut self) {
        umask(self.prev);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Created {
    New,
    Existing,
}

/// Create one directory with the exact mode and identity, unless it already
/// exists. Existing directories are never re-owned or re-moded.
pub(crate) fn create_dir_once(
    ctx: &FsCtx,
    path: &Path,
    uid: u32,
    gid: u32,
    mode: u32,
) -> Result<Created> {
    ctx.cache.invalidate(path);
    match std::fs::metadata(path) {
        Ok(_) => {
            ctx.audit.debug(&format!("'{}' already exists", path.display()));
            return Ok(Created::Existing);
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            ctx.audit
                .warn(&format!("error checking '{}': {}", path.display(), e));
            return Err(Error::io(ErrorKind::Lookup, path, &e));
        }
    }

    // The requested mode is absolute, not subject to the ambient umask.
    let _mask = UmaskGuard::zero();

    if let Err(e) = rustix::fs::mkdir(path, Mode::from_bits_truncate(mode)) {
        let e = errno_to_io(e);
        ctx.audit
            .warn(&format!("error creating '{}': {}", path.display(), e));
        return Err(Error::io(ErrorKind::Create, path, &e));
    }

    // Ownership is applied only once the directory exists.
    if let Err(e) = chown(path, uid, gid) {
        ctx.audit.warn(&format!(
            "error setting ownership of '{}': {}",
            path.display(),
            e
        ));
        return Err(Error::io(ErrorKind::Ownership, path, &e));
    }

    ctx.audit
        .trace(&format!("directory '{}' created", path.display()));
    Ok(Created::New)
}

/// Walk the target path left to right, creating every missing directory.
///
/// All but the last segment are created owned 0:0 with `spec.dir_mode`; the
/// last segment gets (`spec.uid`, `spec.gid`, `spec.leaf_mode`). The walk
/// aborts on the first segment that fails.
pub(crate) fn create_path(ctx: &FsCtx, spec: &HomeSpec, user: &str) -> Result<PathReport> {
    let mut report = PathReport::default();

    ctx.cache.invalidate(&spec.home);
    if std::fs::metadata(&spec.home).is_ok() {
        // Path already exists, nothing to be done.
        report.already_present = true;
        return Ok(report);
    }

    ctx.audit.debug(&format!(
        "creating home directory '{}' for user '{}'",
        spec.home.display(),
        user
    ));

    let comps: Vec<Component> = spec.home.components().collect();
    let last_normal = comps
        .iter()
        .rposition(|c| matches!(c, Component::Normal(_)));

    let mut cur = PathBuf::new();
    for (idx, comp) in comps.iter().enumerate() {
        cur.push(comp.as_os_str());
        if !matches!(comp, Component::Normal(_)) {
            continue;
        }
        let created = if Some(idx) == last_normal {
            create_dir_once(ctx, &cur, spec.uid, spec.gid, spec.leaf_mode)?
        } else {
            create_dir_once(ctx, &cur, 0, 0, spec.dir_mode)?
        };
        if created == Created::New {
            report.created.push(cur.clone());
        }
    }

    ctx.audit
        .debug(&format!("home directory '{}' created", spec.home.display()));
    Ok(report)
}
