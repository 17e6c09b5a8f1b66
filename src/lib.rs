#![forbid(unsafe_code)]
//! Homestead: on-demand home directory provisioning.
//!
//! Given a target path, an owning identity, and a permission policy, ensure
//! the full directory chain exists (intermediate ancestors owned 0:0 with the
//! intermediate mode, the leaf owned by the target identity with the leaf
//! mode), then optionally populate the new home from a skeleton template tree
//! in the manner of `/etc/skel`.
//!
//! Safety model highlights:
//! - All filesystem mutation is bracketed by a `PrivilegeScope` guard whose
//!   release is guaranteed on every exit path, including early error returns.
//! - Directory modes are applied exactly as configured: the process umask is
//!   zeroed (and restored) around each creation.
//! - Pre-existing directories are never re-owned or re-moded.
//! - Copied regular files never keep setuid/setgid bits.
//! - This crate forbids `unsafe` and uses `rustix` for the syscalls std
//!   leaves uncovered (chown, mkdir-with-mode, chmod, umask).

pub mod constants;
pub mod adapters;
pub mod api;
pub(crate) mod fs;
pub mod logging;
pub mod policy;
pub mod types;

pub use api::*;
