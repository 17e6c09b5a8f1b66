//! Skeleton-tree population for newly created home directories.
//!
//! The source directory is a template in the manner of `/etc/skel`; its
//! structure and files are duplicated into the new home with the target
//! identity. The whole walk is best-effort: per-entry failures are logged and
//! accumulated in the report, never fatal to the aggregate copy.

use std::fs::File;
use std::io::{Read, Write};
use std::os::unix::fs as unix_fs;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use super::dirs::create_dir_once;
use super::meta::{kind_of, EntryKind};
use super::{chmod, chown, lchown, FsCtx};
use crate::constants::{COPY_CHUNK_SIZE, SETID_BITS};
use crate::types::{Error, ErrorKind, Result, SkelReport};

/// Copy one regular file with exclusive-create semantics.
///
/// Ownership and mode are applied only once the data transfer is finished;
/// their failures (and write errors mid-transfer) are logged but do not fail
/// the entry. Only a source or destination that cannot be opened does.
pub(crate) fn copy_file(
    ctx: &FsCtx,
    src: &Path,
    dst: &Path,
    uid: u32,
    gid: u32,
    mode: u32,
) -> Result<()> {
    let mut reader = match File::open(src) {
        Ok(f) => f,
        Err(e) => {
            ctx.audit
                .debug(&format!("trouble with '{}': {}", src.display(), e));
            return Err(Error::io(ErrorKind::Read, src, &e));
        }
    };

    // Exclusive create: a pre-existing destination fails this entry instead
    // of being silently overwritten.
    let mut writer = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(dst)
    {
        Ok(f) => f,
        Err(e) => {
            ctx.audit
                .debug(&format!("trouble with '{}': {}", dst.display(), e));
            return Err(Error::io(ErrorKind::Write, dst, &e));
        }
    };

    let mut buf = [0u8; COPY_CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(_) => break,
        };
        if let Err(e) = writer.write_all(&buf[..n]) {
            ctx.audit
                .warn(&format!("error writing to '{}': {}", dst.display(), e));
            break;
        }
    }

    // Identity and mode go on only after the content is in place.
    if let Err(e) = chown(dst, uid, gid) {
        ctx.audit.warn(&format!(
            "error chown'ing '{}' to {uid}/{gid}: {e}",
            dst.display()
        ));
    }
    if let Err(e) = chmod(dst, mode) {
        ctx.audit.warn(&format!(
            "error chmod'ing '{}' to {mode:04o}: {e}",
            dst.display()
        ));
    }
    if let Err(e) = writer.sync_all() {
        ctx.audit
            .warn(&format!("error closing '{}': {}", dst.display(), e));
    }
    Ok(())
}

/// Copy one symlink, re-pointing intra-skeleton targets into the new tree.
///
/// A target under `src_root` has that prefix rewritten to `dst_root` so the
/// skeleton's internal structure is preserved; anything else is copied
/// verbatim. Ownership applies to the link itself, not its target.
pub(crate) fn copy_symlink(
    ctx: &FsCtx,
    src_root: &Path,
    src_path: &Path,
    dst_root: &Path,
    dst_path: &Path,
    uid: u32,
    gid: u32,
) -> Result<()> {
    let target = match std::fs::read_link(src_path) {
        Ok(t) => t,
        Err(e) => {
            ctx.audit
                .warn(&format!("error reading link '{}': {}", src_path.display(), e));
            return Err(Error::io(ErrorKind::Link, src_path, &e));
        }
    };

    let target = match target.strip_prefix(src_root) {
        Ok(rest) => dst_root.join(rest),
        Err(_) => target,
    };

    if let Err(e) = unix_fs::symlink(&target, dst_path) {
        ctx.audit.warn(&format!(
            "error symlinking '{}' to '{}': {}",
            target.display(),
            dst_path.display(),
            e
        ));
        return Err(Error::io(ErrorKind::Link, dst_path, &e));
    }

    if let Err(e) = lchown(dst_path, uid, gid) {
        ctx.audit.warn(&format!(
            "error chown'ing '{}' to {uid}/{gid}: {e}",
            dst_path.display()
        ));
    }
    Ok(())
}

/// Mirror `src_dir` into `dst_dir` recursively, pre-order: each directory
/// shell is created before its children are copied.
///
/// Per-entry outcomes are accumulated; only a source directory that cannot
/// be enumerated at all is an error.
pub(crate) fn copy_dir(
    ctx: &FsCtx,
    src_dir: &Path,
    dst_dir: &Path,
    uid: u32,
    gid: u32,
) -> Result<SkelReport> {
    let entries = match std::fs::read_dir(src_dir) {
        Ok(it) => it,
        Err(e) => {
            ctx.audit.warn(&format!(
                "error copying '{}' skeleton files: {}",
                src_dir.display(),
                e
            ));
            return Err(Error::io(ErrorKind::Read, src_dir, &e));
        }
    };

    let mut report = SkelReport::default();
    for entry in entries {
        let entry = match entry {
            Ok(en) => en,
            Err(e) => {
                ctx.audit.debug(&format!(
                    "unable to read an entry of '{}' ({}), skipping",
                    src_dir.display(),
                    e
                ));
                report.record_failure(format!("{}: {e}", src_dir.display()));
                continue;
            }
        };
        let src_path = entry.path();
        let dst_path = dst_dir.join(entry.file_name());
        report.attempted += 1;

        let (kind, md) = match kind_of(&src_path) {
            Ok(k) => k,
            Err(e) => {
                ctx.audit.debug(&format!(
                    "unable to stat '{}' ({}), skipping",
                    src_path.display(),
                    e
                ));
                report.record_failure(format!("{}: {e}", src_path.display()));
                continue;
            }
        };

        match kind {
            EntryKind::Directory => {
                match create_dir_once(ctx, &dst_path, uid, gid, md.mode() & 0o7777) {
                    Ok(_) => report.copied += 1,
                    Err(e) => report.record_failure(e.to_string()),
                }
                // Recurse even after a shell failure: the children record
                // their own outcomes.
                match copy_dir(ctx, &src_path, &dst_path, uid, gid) {
                    Ok(child) => report.absorb(child),
                    Err(e) => report.record_failure(e.to_string()),
                }
            }
            EntryKind::RegularFile => {
                let mode = md.mode() & 0o7777 & !SETID_BITS;
                match copy_file(ctx, &src_path, &dst_path, uid, gid, mode) {
                    Ok(()) => report.copied += 1,
                    Err(e) => report.record_failure(e.to_string()),
                }
            }
            EntryKind::Symlink => {
                match copy_symlink(ctx, src_dir, &src_path, dst_dir, &dst_path, uid, gid) {
                    Ok(()) => report.copied += 1,
                    Err(e) => report.record_failure(e.to_string()),
                }
            }
            EntryKind::Other => {
                ctx.audit.debug(&format!(
                    "skipping skeleton entry '{}'",
                    src_path.display()
                ));
                report.skipped += 1;
            }
        }
    }
    Ok(report)
}
