//! Working-directory probes used when validating `folder` answers.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

/// What a folder probe found at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderStatus {
    /// The path is an existing directory.
    Existing,
    /// The path did not exist; it was created and removed again.
    Creatable,
    /// Something other than a directory already sits at the path.
    Unusable,
    /// The path does not exist and cannot be created.
    Invalid,
}

impl FolderStatus {
    pub fn is_usable(self) -> bool {
        matches!(self, FolderStatus::Existing | FolderStatus::Creatable)
    }
}

/// Probe `path` without leaving anything behind.
///
/// Only the final component is created, so a path whose parent is missing is
/// reported as invalid.
pub fn probe_folder(path: &Path) -> FolderStatus {
    if path.is_dir() {
        return FolderStatus::Existing;
    }
    if path.exists() {
        return FolderStatus::Unusable;
    }
    match fs::create_dir(path) {
        Ok(()) => {
            if let Err(err) = fs::remove_dir(path) {
                warn!(path = %path.display(), error = %err, "probe directory left behind");
            }
            FolderStatus::Creatable
        }
        Err(err) => {
            debug!(path = %path.display(), error = %err, "folder cannot be created");
            FolderStatus::Invalid
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_directory_is_usable() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert_eq!(probe_folder(temp.path()), FolderStatus::Existing);
    }

    #[test]
    fn creatable_directory_is_removed_after_probe() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("fresh");
        assert_eq!(probe_folder(&path), FolderStatus::Creatable);
        assert!(!path.exists());
    }

    #[test]
    fn file_in_the_way_is_unusable() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("file");
        fs::write(&path, "x").expect("write");
        assert_eq!(probe_folder(&path), FolderStatus::Unusable);
    }

    #[test]
    fn missing_parent_is_invalid() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("missing").join("child");
        assert_eq!(probe_folder(&path), FolderStatus::Invalid);
        assert!(!FolderStatus::Invalid.is_usable());
    }
}
