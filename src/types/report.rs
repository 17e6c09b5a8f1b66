use std::path::PathBuf;

/// Outcome of the directory-chain step.
#[derive(Clone, Debug, Default)]
pub struct PathReport {
    /// Directories newly created by this call, in creation order.
    /// Segments that already existed are absent: they are never mutated.
    pub created: Vec<PathBuf>,
    /// The full target path existed before the call; nothing was done.
    pub already_present: bool,
}

/// Per-entry outcome accumulator for the best-effort skeleton copy.
///
/// One entry's failure never aborts the tree copy; it is counted and its
/// message recorded here instead.
#[derive(Clone, Debug, Default)]
pub struct SkelReport {
    /// Entries examined, across the whole tree.
    pub attempted: usize,
    /// Entries copied (directory shells created, files written, links made).
    pub copied: usize,
    /// Entries that failed to stat or to copy.
    pub failed: usize,
    /// Entries of unsupported kinds (devices, sockets, fifos), skipped.
    pub skipped: usize,
    /// Messages for each recorded failure.
    pub errors: Vec<String>,
}

impl SkelReport {
    pub(crate) fn absorb(&mut self, child: SkelReport) {
        self.attempted += child.attempted;
        self.copied += child.copied;
        self.failed += child.failed;
        self.skipped += child.skipped;
        self.errors.extend(child.errors);
    }

    pub(crate) fn record_failure(&mut self, msg: String) {
        self.failed += 1;
        self.errors.push(msg);
    }
}

/// Summary of one provisioning call.
#[derive(Clone, Debug, Default)]
pub struct ProvisionReport {
    /// False when the policy was disabled and nothing was touched.
    pub enabled: bool,
    pub path: PathReport,
    /// Present when a skeleton root was configured and the copy ran.
    pub skel: Option<SkelReport>,
    pub duration_ms: u64,
}
