//! Policy governs whether provisioning runs at all and with which modes.
//!
//! Values come from the embedding application's configuration layer (for a
//! server, typically one directive); the crate only consumes them.

use std::path::PathBuf;

use crate::constants::{DEFAULT_DIR_MODE, DEFAULT_LEAF_MODE};

#[derive(Clone, Debug)]
pub struct Policy {
    /// Master switch. A disabled policy makes provisioning a silent no-op.
    pub enabled: bool,
    /// Mode for intermediate ancestor directories (owned 0:0).
    pub dir_mode: u32,
    /// Mode for the leaf (home) directory (owned by the target identity).
    pub leaf_mode: u32,
    /// Optional skeleton tree copied into the new home.
    pub skel_dir: Option<PathBuf>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            enabled: false,
            dir_mode: DEFAULT_DIR_MODE,
            leaf_mode: DEFAULT_LEAF_MODE,
            skel_dir: None,
        }
    }
}

impl Policy {
    /// Enabled policy with the stock defaults (leaf 0o700, dirs 0o711).
    #[must_use]
    pub fn enabled_preset() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }
}
