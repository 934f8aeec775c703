//! Opening a file out of a directory tree.
//!
//! The opened file and its counterpart from the other tree land in a brand
//! new tab, each on the side of the tree it came from, so the diff reads the
//! same way round as the trees the user was browsing.

use crate::host::{load_editor_file, FileReader, HostError};
use crate::model::{ComparisonRecord, DirectoryEntry, EditorFile, PanelSide};
use crate::session::{EditorTab, PanelState, Session, TabId};
use std::path::Path;
use tracing::{debug, warn};

/// Open `file` (already read from `source_side`'s tree) in a new active tab,
/// paired with its counterpart when the comparison has one.
///
/// A counterpart that cannot be read is logged and skipped; the tab then
/// holds only `file`.
pub fn open_from_tree<R>(
    session: &mut Session,
    reader: &R,
    file: EditorFile,
    record: Option<&ComparisonRecord>,
    source_side: PanelSide,
) -> TabId
where
    R: FileReader + ?Sized,
{
    let counterpart = record
        .filter(|record| !record.status.is_one_sided())
        .and_then(|record| record.entry(source_side.opposite()))
        .and_then(|entry| read_counterpart(reader, entry));

    let mut tab = EditorTab::empty();
    tab.title = file.name.clone();
    if let Some(other) = counterpart {
        *tab.panels.get_mut(source_side.opposite()) = PanelState::with_file(other);
    }
    *tab.panels.get_mut(source_side) = PanelState::with_file(file);

    session.open_tab(tab)
}

/// Read `entry` from `source_side`'s tree and hand it to [`open_from_tree`].
///
/// Fails without touching the session when the entry is a directory or
/// cannot be read.
pub fn open_entry_from_tree<R>(
    session: &mut Session,
    reader: &R,
    entry: &DirectoryEntry,
    record: Option<&ComparisonRecord>,
    source_side: PanelSide,
) -> Result<TabId, HostError>
where
    R: FileReader + ?Sized,
{
    if entry.is_dir {
        return Err(HostError::NotAFile {
            path: entry.path.clone(),
        });
    }
    let file = load_editor_file(reader, Path::new(&entry.path))?;
    Ok(open_from_tree(session, reader, file, record, source_side))
}

fn read_counterpart<R>(reader: &R, entry: &DirectoryEntry) -> Option<EditorFile>
where
    R: FileReader + ?Sized,
{
    if entry.is_dir {
        debug!(path = %entry.path, "counterpart is a directory, opening single file");
        return None;
    }
    match load_editor_file(reader, Path::new(&entry.path)) {
        Ok(file) => Some(file),
        Err(err) => {
            warn!("counterpart_read_failed: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{compare, comparison_map};
    use crate::model::{ComparisonStatus, DirectoryListing};
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapReader {
        files: HashMap<String, String>,
    }

    impl MapReader {
        fn with(mut self, path: &str, contents: &str) -> Self {
            self.files.insert(path.to_string(), contents.to_string());
            self
        }
    }

    impl FileReader for MapReader {
        fn read_file_contents(&self, path: &Path) -> Result<String, HostError> {
            let key = path.to_string_lossy().to_string();
            self.files
                .get(&key)
                .cloned()
                .ok_or_else(|| HostError::read_failed(path, "not found"))
        }
    }

    fn trees() -> (DirectoryListing, DirectoryListing) {
        (
            DirectoryListing::new(
                "/L",
                vec![
                    DirectoryEntry::file("/L/a.txt", 1, "t1"),
                    DirectoryEntry::file("/L/left.txt", 1, "t1"),
                    DirectoryEntry::directory("/L/clash", "t1"),
                ],
            ),
            DirectoryListing::new(
                "/R",
                vec![
                    DirectoryEntry::file("/R/a.txt", 2, "t1"),
                    DirectoryEntry::file("/R/clash", 1, "t1"),
                ],
            ),
        )
    }

    fn reader() -> MapReader {
        MapReader::default()
            .with("/L/a.txt", "left a")
            .with("/R/a.txt", "right a")
            .with("/L/left.txt", "only left")
            .with("/R/clash", "a file")
    }

    fn file_at(session: &Session, side: PanelSide) -> Option<String> {
        session
            .active_tab()
            .panels
            .get(side)
            .file
            .as_ref()
            .map(|file| file.path.clone())
    }

    #[test]
    fn pairs_files_on_their_original_sides_from_either_tree() {
        let (left, right) = trees();
        let map = comparison_map(compare(Some(&left), Some(&right)));
        let record = map.get("a.txt");
        assert_eq!(record.map(|r| r.status), Some(ComparisonStatus::Different));

        for side in [PanelSide::Left, PanelSide::Right] {
            let mut session = Session::new();
            let entry = record.and_then(|r| r.entry(side)).expect("entry on side");
            let id = open_entry_from_tree(&mut session, &reader(), entry, record, side)
                .expect("open");

            assert_eq!(session.len(), 2);
            assert_eq!(session.active_tab_id(), id);
            assert_eq!(file_at(&session, PanelSide::Left).as_deref(), Some("/L/a.txt"));
            assert_eq!(file_at(&session, PanelSide::Right).as_deref(), Some("/R/a.txt"));
            assert_eq!(session.active_tab().title, "a.txt");
            assert!(session.active_tab().compare_mode());
        }
    }

    #[test]
    fn one_sided_file_opens_alone_on_its_side() {
        let (left, right) = trees();
        let map = comparison_map(compare(Some(&left), Some(&right)));
        let record = map.get("left.txt");
        let file = EditorFile::new("/L/left.txt", "only left");

        let mut session = Session::new();
        open_from_tree(&mut session, &reader(), file, record, PanelSide::Left);
        assert_eq!(file_at(&session, PanelSide::Left).as_deref(), Some("/L/left.txt"));
        assert!(file_at(&session, PanelSide::Right).is_none());

        let right_only = ComparisonRecord::right_only(
            "new.txt",
            DirectoryEntry::file("/R/new.txt", 1, "t"),
        );
        open_from_tree(
            &mut session,
            &reader(),
            EditorFile::new("/R/new.txt", "new"),
            Some(&right_only),
            PanelSide::Right,
        );
        assert!(file_at(&session, PanelSide::Left).is_none());
        assert_eq!(file_at(&session, PanelSide::Right).as_deref(), Some("/R/new.txt"));
        assert_eq!(session.active_tab().title, "new.txt");
    }

    #[test]
    fn unreadable_counterpart_degrades_to_single_file() {
        let (left, right) = trees();
        let map = comparison_map(compare(Some(&left), Some(&right)));
        let record = map.get("a.txt");
        let reader = MapReader::default().with("/L/a.txt", "left a");

        let mut session = Session::new();
        let entry = record.and_then(|r| r.left_entry.as_ref()).expect("left entry");
        open_entry_from_tree(&mut session, &reader, entry, record, PanelSide::Left)
            .expect("originating read succeeds");
        assert_eq!(session.len(), 2);
        assert_eq!(file_at(&session, PanelSide::Left).as_deref(), Some("/L/a.txt"));
        assert!(file_at(&session, PanelSide::Right).is_none());
    }

    #[test]
    fn failed_originating_read_leaves_session_untouched() {
        let (left, right) = trees();
        let map = comparison_map(compare(Some(&left), Some(&right)));
        let record = map.get("a.txt");
        let mut session = Session::new();
        let before = session.active_tab_id();

        let entry = record.and_then(|r| r.left_entry.as_ref()).expect("left entry");
        let err = open_entry_from_tree(&mut session, &MapReader::default(), entry, record, PanelSide::Left)
            .expect_err("read fails");
        assert!(matches!(err, HostError::FileReadFailed { .. }));
        assert_eq!(session.len(), 1);
        assert_eq!(session.active_tab_id(), before);
    }

    #[test]
    fn directory_counterpart_is_not_paired() {
        let (left, right) = trees();
        let map = comparison_map(compare(Some(&left), Some(&right)));
        let record = map.get("clash");
        assert_eq!(record.map(|r| r.status), Some(ComparisonStatus::Different));

        let mut session = Session::new();
        let entry = record.and_then(|r| r.right_entry.as_ref()).expect("right entry");
        open_entry_from_tree(&mut session, &reader(), entry, record, PanelSide::Right)
            .expect("open");
        assert!(file_at(&session, PanelSide::Left).is_none());
        assert_eq!(file_at(&session, PanelSide::Right).as_deref(), Some("/R/clash"));

        let left_dir = record.and_then(|r| r.left_entry.as_ref()).expect("left entry");
        let err = open_entry_from_tree(&mut session, &reader(), left_dir, record, PanelSide::Left)
            .expect_err("directories cannot be opened");
        assert!(matches!(err, HostError::NotAFile { .. }));
    }
}
