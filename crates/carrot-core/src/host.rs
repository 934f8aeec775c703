use crate::model::{DirectoryEntry, DirectoryListing, EditorFile};
use crate::path::normalize_separators;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("failed to list directory {path}: {reason}")]
    DirectoryListingFailed { path: String, reason: String },
    #[error("failed to read file {path}: {reason}")]
    FileReadFailed { path: String, reason: String },
    #[error("{path} is a directory, not a file")]
    NotAFile { path: String },
}

impl HostError {
    pub fn listing_failed(path: &Path, reason: impl ToString) -> Self {
        Self::DirectoryListingFailed {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn read_failed(path: &Path, reason: impl ToString) -> Self {
        Self::FileReadFailed {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result of an open-file or open-directory dialog. Cancelling is a normal
/// outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    Selected(PathBuf),
    Cancelled,
}

impl DialogOutcome {
    /// Interpret raw dialog text; blank input counts as cancelled.
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            DialogOutcome::Cancelled
        } else {
            DialogOutcome::Selected(PathBuf::from(trimmed))
        }
    }

    pub fn selected(&self) -> Option<&Path> {
        match self {
            DialogOutcome::Selected(path) => Some(path.as_path()),
            DialogOutcome::Cancelled => None,
        }
    }
}

pub trait FileReader {
    /// Whole file as text. Unreadable, missing and non UTF-8 files fail with
    /// [`HostError::FileReadFailed`].
    fn read_file_contents(&self, path: &Path) -> Result<String, HostError>;
}

/// File-system operations the host runtime provides.
pub trait HostBridge: FileReader {
    /// Every file and directory below `path`, recursively, with absolute
    /// paths. The root itself is not included.
    fn list_directory(&self, path: &Path) -> Result<Vec<DirectoryEntry>, HostError>;
}

pub fn load_listing<H>(host: &H, path: &Path) -> Result<DirectoryListing, HostError>
where
    H: HostBridge + ?Sized,
{
    let entries = host.list_directory(path)?;
    let root = normalize_separators(&path.to_string_lossy());
    Ok(DirectoryListing::new(root, entries))
}

pub fn load_editor_file<R>(reader: &R, path: &Path) -> Result<EditorFile, HostError>
where
    R: FileReader + ?Sized,
{
    let contents = reader.read_file_contents(path)?;
    Ok(EditorFile::new(
        normalize_separators(&path.to_string_lossy()),
        contents,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedHost;

    impl FileReader for FixedHost {
        fn read_file_contents(&self, path: &Path) -> Result<String, HostError> {
            if path.ends_with("missing.txt") {
                Err(HostError::read_failed(path, "No such file or directory"))
            } else {
                Ok(format!("text of {}", path.display()))
            }
        }
    }

    impl HostBridge for FixedHost {
        fn list_directory(&self, path: &Path) -> Result<Vec<DirectoryEntry>, HostError> {
            Ok(vec![DirectoryEntry::file(
                format!("{}/a.txt", path.display()),
                3,
                "t",
            )])
        }
    }

    #[test]
    fn dialog_input_blank_means_cancelled() {
        assert_eq!(DialogOutcome::from_input("   "), DialogOutcome::Cancelled);
        assert_eq!(
            DialogOutcome::from_input(" /tmp/x ").selected(),
            Some(Path::new("/tmp/x"))
        );
    }

    #[test]
    fn load_helpers_wrap_bridge_results() {
        let listing = load_listing(&FixedHost, Path::new("/work")).expect("listing");
        assert_eq!(listing.root_path, "/work");
        assert_eq!(listing.entries.len(), 1);

        let file = load_editor_file(&FixedHost, Path::new("/work/a.txt")).expect("file");
        assert_eq!(file.name, "a.txt");
        assert_eq!(file.contents, "text of /work/a.txt");

        let err = load_editor_file(&FixedHost, Path::new("/work/missing.txt"))
            .expect_err("read should fail");
        assert!(matches!(err, HostError::FileReadFailed { .. }));
    }
}
