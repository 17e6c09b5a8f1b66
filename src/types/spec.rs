use std::path::PathBuf;

/// Resolved inputs for one provisioning call.
///
/// Combines the per-call target and identity with the policy's mode and
/// skeleton values; immutable for the duration of the call.
#[derive(Clone, Debug)]
pub struct HomeSpec {
    /// Target home directory.
    pub home: PathBuf,
    /// Owning user id of the leaf directory and copied skeleton entries.
    pub uid: u32,
    /// Owning group id of the leaf directory and copied skeleton entries.
    pub gid: u32,
    /// Mode for intermediate ancestor directories (owned 0:0).
    pub dir_mode: u32,
    /// Mode for the leaf directory (owned uid:gid).
    pub leaf_mode: u32,
    /// Optional skeleton tree to copy into the new home.
    pub skel_dir: Option<PathBuf>,
}
