//! Non-following metadata classification for skeleton entries.

use std::fs::Metadata;
use std::io;
use std::path::Path;

/// Kind of a filesystem node, reported on the node itself: a symlink
/// classifies as a symlink, never as its target's kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EntryKind {
    Directory,
    RegularFile,
    Symlink,
    Other,
}

impl EntryKind {
    pub(crate) fn of(md: &Metadata) -> Self {
        let ft = md.file_type();
        if ft.is_dir() {
            Self::Directory
        } else if ft.is_file() {
            Self::RegularFile
        } else if ft.is_symlink() {
            Self::Symlink
        } else {
            Self::Other
        }
    }
}

/// Classify the node at `path` without following symlinks.
pub(crate) fn kind_of(path: &Path) -> io::Result<(EntryKind, Metadata)> {
    let md = std::fs::symlink_metadata(path)?;
    Ok((EntryKind::of(&md), md))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs as unix_fs;

    #[test]
    fn classifies_without_following_links() {
        let td = tempfile::tempdir().unwrap();
        let root = td.path();
        std::fs::create_dir(root.join("d")).unwrap();
        std::fs::write(root.join("f"), b"x").unwrap();
        unix_fs::symlink(root.join("d"), root.join("l")).unwrap();

        assert_eq!(kind_of(&root.join("d")).unwrap().0, EntryKind::Directory);
        assert_eq!(kind_of(&root.join("f")).unwrap().0, EntryKind::RegularFile);
        // The link points at a directory but must classify as a symlink.
        assert_eq!(kind_of(&root.join("l")).unwrap().0, EntryKind::Symlink);
    }

    #[test]
    fn missing_path_is_an_error() {
        let td = tempfile::tempdir().unwrap();
        assert!(kind_of(&td.path().join("absent")).is_err());
    }
}
