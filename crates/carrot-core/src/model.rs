use crate::path::{self, normalize_separators};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Title used for tabs that hold no file.
pub const UNTITLED_TAB_NAME: &str = "Directory";

/// One file or directory as reported by the host listing. Never mutated after
/// the listing is taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
    pub mod_time: String,
}

impl DirectoryEntry {
    pub fn file(path: impl Into<String>, size: u64, mod_time: impl Into<String>) -> Self {
        Self::new(path.into(), false, size, mod_time.into())
    }

    pub fn directory(path: impl Into<String>, mod_time: impl Into<String>) -> Self {
        Self::new(path.into(), true, 0, mod_time.into())
    }

    fn new(path: String, is_dir: bool, size: u64, mod_time: String) -> Self {
        let path = normalize_separators(&path);
        let name = path::base_name(&path).unwrap_or(path.as_str()).to_string();
        Self {
            name,
            path,
            is_dir,
            size,
            mod_time,
        }
    }
}

/// Flat recursive enumeration of everything under `root_path`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryListing {
    pub root_path: String,
    pub entries: Vec<DirectoryEntry>,
}

impl DirectoryListing {
    pub fn new(root_path: impl Into<String>, entries: Vec<DirectoryEntry>) -> Self {
        Self {
            root_path: root_path.into(),
            entries,
        }
    }

    pub fn relative_path_of(&self, entry: &DirectoryEntry) -> String {
        path::relative_path(&entry.path, &self.root_path)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparisonStatus {
    Same,
    Different,
    LeftOnly,
    RightOnly,
}

impl ComparisonStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonStatus::Same => "same",
            ComparisonStatus::Different => "different",
            ComparisonStatus::LeftOnly => "left-only",
            ComparisonStatus::RightOnly => "right-only",
        }
    }

    /// Anything but `same`.
    pub fn is_difference(&self) -> bool {
        !matches!(self, ComparisonStatus::Same)
    }

    pub fn is_one_sided(&self) -> bool {
        matches!(self, ComparisonStatus::LeftOnly | ComparisonStatus::RightOnly)
    }
}

impl fmt::Display for ComparisonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonStatus {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalized = input.trim().to_lowercase();
        match normalized.as_str() {
            "same" => Ok(ComparisonStatus::Same),
            "different" => Ok(ComparisonStatus::Different),
            "left-only" | "left_only" => Ok(ComparisonStatus::LeftOnly),
            "right-only" | "right_only" => Ok(ComparisonStatus::RightOnly),
            other => Err(format!("Unknown comparison status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelSide {
    Left,
    Right,
}

impl PanelSide {
    pub fn opposite(self) -> Self {
        match self {
            PanelSide::Left => PanelSide::Right,
            PanelSide::Right => PanelSide::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PanelSide::Left => "left",
            PanelSide::Right => "right",
        }
    }
}

impl fmt::Display for PanelSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of comparing one relative path across both trees.
///
/// Build through [`ComparisonRecord::left_only`], [`ComparisonRecord::right_only`]
/// or [`ComparisonRecord::paired`] so that the entries present always match
/// the status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRecord {
    pub relative_path: String,
    pub status: ComparisonStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_entry: Option<DirectoryEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_entry: Option<DirectoryEntry>,
}

impl ComparisonRecord {
    pub fn left_only(relative_path: impl Into<String>, entry: DirectoryEntry) -> Self {
        Self {
            relative_path: relative_path.into(),
            status: ComparisonStatus::LeftOnly,
            left_entry: Some(entry),
            right_entry: None,
        }
    }

    pub fn right_only(relative_path: impl Into<String>, entry: DirectoryEntry) -> Self {
        Self {
            relative_path: relative_path.into(),
            status: ComparisonStatus::RightOnly,
            left_entry: None,
            right_entry: Some(entry),
        }
    }

    /// Record for a path present on both sides. `status` must be `Same` or
    /// `Different`.
    pub fn paired(
        relative_path: impl Into<String>,
        status: ComparisonStatus,
        left: DirectoryEntry,
        right: DirectoryEntry,
    ) -> Self {
        debug_assert!(!status.is_one_sided());
        Self {
            relative_path: relative_path.into(),
            status,
            left_entry: Some(left),
            right_entry: Some(right),
        }
    }

    pub fn entry(&self, side: PanelSide) -> Option<&DirectoryEntry> {
        match side {
            PanelSide::Left => self.left_entry.as_ref(),
            PanelSide::Right => self.right_entry.as_ref(),
        }
    }
}

/// A loaded text file. Re-opening the same path builds a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorFile {
    pub path: String,
    pub name: String,
    pub contents: String,
}

impl EditorFile {
    pub fn new(path: impl Into<String>, contents: impl Into<String>) -> Self {
        let path = path.into();
        let name = extract_file_name(&path);
        Self {
            path,
            name,
            contents: contents.into(),
        }
    }
}

pub fn extract_file_name(file_path: &str) -> String {
    path::base_name(&normalize_separators(file_path))
        .unwrap_or(UNTITLED_TAB_NAME)
        .to_string()
}

/// View state of the diff widget, stored per tab so switching tabs keeps the
/// reading position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffViewState {
    pub scroll_top: usize,
    pub cursor_line: usize,
    #[serde(default)]
    pub folded: BTreeSet<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_wire_shape_uses_camel_case() {
        let entry = DirectoryEntry::file("/L/x.txt", 10, "t1");
        let json = serde_json::to_value(&entry).expect("serialize entry");
        assert_eq!(json["name"], "x.txt");
        assert_eq!(json["isDir"], false);
        assert_eq!(json["modTime"], "t1");

        let parsed: DirectoryEntry = serde_json::from_value(serde_json::json!({
            "name": "sub",
            "path": "/R/sub",
            "isDir": true,
            "size": 0,
            "modTime": "t2"
        }))
        .expect("deserialize entry");
        assert!(parsed.is_dir);
        assert_eq!(parsed.path, "/R/sub");
    }

    #[test]
    fn status_parses_and_prints_kebab_case() {
        for status in [
            ComparisonStatus::Same,
            ComparisonStatus::Different,
            ComparisonStatus::LeftOnly,
            ComparisonStatus::RightOnly,
        ] {
            assert_eq!(status.as_str().parse::<ComparisonStatus>(), Ok(status));
        }
        assert_eq!(
            serde_json::to_value(ComparisonStatus::RightOnly).expect("serialize"),
            "right-only"
        );
        assert!("changed".parse::<ComparisonStatus>().is_err());
    }

    #[test]
    fn editor_file_name_comes_from_path() {
        assert_eq!(EditorFile::new("/tmp/a/readme.md", "").name, "readme.md");
        assert_eq!(EditorFile::new(r"C:\work\main.rs", "").name, "main.rs");
        assert_eq!(EditorFile::new("", "").name, UNTITLED_TAB_NAME);
    }

    #[test]
    fn record_entry_lookup_by_side() {
        let left = DirectoryEntry::file("/L/a", 1, "t");
        let record = ComparisonRecord::left_only("a", left.clone());
        assert_eq!(record.entry(PanelSide::Left), Some(&left));
        assert_eq!(record.entry(PanelSide::Right), None);
        assert_eq!(PanelSide::Left.opposite(), PanelSide::Right);
    }
}
