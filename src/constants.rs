//! Shared crate-wide constants for homestead.
//!
//! Centralizes magic values and default labels used across modules.
//! Adjusting these here will propagate through the crate.

/// Chunk size in bytes for streaming skeleton file contents.
pub const COPY_CHUNK_SIZE: usize = 8192;

/// Default mode for the leaf (home) directory when the embedding
/// configuration does not override it.
pub const DEFAULT_LEAF_MODE: u32 = 0o700;

/// Default mode for intermediate ancestor directories.
pub const DEFAULT_DIR_MODE: u32 = 0o711;

/// setuid | setgid. Neither bit survives a skeleton file copy.
pub const SETID_BITS: u32 = 0o6000;

/// UUIDv5 namespace tag for deterministic per-call provision IDs.
pub const NS_TAG: &str = "https://homestead/provision";

/// Subsystem label stamped on every emitted fact.
pub const SUBSYSTEM: &str = "homestead";
