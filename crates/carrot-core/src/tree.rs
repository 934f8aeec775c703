//! Hierarchical view over a flat [`DirectoryListing`].
//!
//! A [`TreeView`] lives for one render pass. Building it indexes the flat
//! entries by parent relative path; nothing is nested up front, so collapsed
//! subtrees cost nothing beyond that index. The only other cached state is
//! the "does this directory contain a difference" answer, keyed by relative
//! path and discarded with the view.

use crate::compare::ComparisonMap;
use crate::model::{ComparisonStatus, DirectoryEntry, DirectoryListing, PanelSide};
use crate::path::{depth_of, parent_relative_path};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    None,
    /// Content differs between the two sides.
    Red,
    /// Present only on the side being rendered.
    Blue,
}

impl Highlight {
    pub fn for_status(status: Option<ComparisonStatus>, side: PanelSide) -> Self {
        match (status, side) {
            (Some(ComparisonStatus::Different), _) => Highlight::Red,
            (Some(ComparisonStatus::LeftOnly), PanelSide::Left) => Highlight::Blue,
            (Some(ComparisonStatus::RightOnly), PanelSide::Right) => Highlight::Blue,
            _ => Highlight::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode<'a> {
    pub entry: &'a DirectoryEntry,
    pub relative_path: String,
    pub depth: usize,
    pub status: Option<ComparisonStatus>,
    pub highlight: Highlight,
    pub expanded: bool,
}

#[derive(Debug)]
struct IndexedEntry<'a> {
    entry: &'a DirectoryEntry,
    relative_path: String,
}

pub struct TreeView<'a> {
    comparisons: &'a ComparisonMap,
    side: PanelSide,
    only_different: bool,
    entries: Vec<IndexedEntry<'a>>,
    by_parent: HashMap<String, Vec<usize>>,
    containment: HashMap<String, bool>,
}

impl<'a> TreeView<'a> {
    /// Entries sharing a relative path collapse into one, the later entry
    /// winning, the same way [`crate::compare`] pairs them.
    pub fn new(
        listing: &'a DirectoryListing,
        comparisons: &'a ComparisonMap,
        side: PanelSide,
        only_different: bool,
    ) -> Self {
        let mut entries: Vec<IndexedEntry<'a>> = Vec::with_capacity(listing.entries.len());
        let mut slots: HashMap<String, usize> = HashMap::with_capacity(listing.entries.len());
        for entry in &listing.entries {
            let relative_path = listing.relative_path_of(entry);
            match slots.get(&relative_path) {
                Some(&slot) => entries[slot].entry = entry,
                None => {
                    slots.insert(relative_path.clone(), entries.len());
                    entries.push(IndexedEntry {
                        entry,
                        relative_path,
                    });
                }
            }
        }

        let mut by_parent: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, item) in entries.iter().enumerate() {
            let parent = parent_relative_path(&item.relative_path);
            if parent != item.relative_path {
                by_parent.entry(parent.to_string()).or_default().push(idx);
            }
        }

        Self {
            comparisons,
            side,
            only_different,
            entries,
            by_parent,
            containment: HashMap::new(),
        }
    }

    pub fn side(&self) -> PanelSide {
        self.side
    }

    pub fn roots(&mut self) -> Vec<TreeNode<'a>> {
        self.children("")
    }

    /// Direct children of `parent`, directories first, each group ordered by
    /// name. With `only_different` set, files without a difference and
    /// directories with no differing descendant are left out.
    pub fn children(&mut self, parent: &str) -> Vec<TreeNode<'a>> {
        self.children_in(parent, None)
    }

    /// Depth-first rows for a list widget, descending only into the
    /// directories whose relative paths are in `expanded`.
    pub fn visible_rows(&mut self, expanded: &HashSet<String>) -> Vec<TreeNode<'a>> {
        let mut rows = Vec::new();
        let mut descended: HashSet<String> = HashSet::new();
        let mut stack: Vec<TreeNode<'a>> = self
            .children_in("", Some(expanded))
            .into_iter()
            .rev()
            .collect();

        while let Some(node) = stack.pop() {
            let descend = node.entry.is_dir
                && node.expanded
                && descended.insert(node.relative_path.clone());
            let relative = node.relative_path.clone();
            rows.push(node);
            if descend {
                let children = self.children_in(&relative, Some(expanded));
                stack.extend(children.into_iter().rev());
            }
        }
        rows
    }

    fn children_in(&mut self, parent: &str, expanded: Option<&HashSet<String>>) -> Vec<TreeNode<'a>> {
        let (mut dirs, mut files): (Vec<usize>, Vec<usize>) = self
            .child_indices(parent)
            .partition(|idx| self.entries[*idx].entry.is_dir);
        dirs.sort_by(|a, b| compare_names(&self.entries[*a].entry.name, &self.entries[*b].entry.name));
        files.sort_by(|a, b| compare_names(&self.entries[*a].entry.name, &self.entries[*b].entry.name));

        if self.only_different {
            let mut kept = Vec::with_capacity(dirs.len());
            for idx in dirs {
                let relative = self.entries[idx].relative_path.clone();
                if self.contains_difference(&relative) {
                    kept.push(idx);
                }
            }
            dirs = kept;
            files.retain(|idx| self.file_qualifies(&self.entries[*idx].relative_path));
        }

        dirs.into_iter()
            .chain(files)
            .map(|idx| self.node_at(idx, expanded))
            .collect()
    }

    pub fn status_of(&self, relative_path: &str) -> Option<ComparisonStatus> {
        self.comparisons.get(relative_path).map(|record| record.status)
    }

    /// Whether any descendant of the directory at `relative_path`, at any
    /// depth, is a file with a difference.
    ///
    /// Post-order walk over an explicit stack; a directory already on the
    /// walk is not entered twice.
    pub fn contains_difference(&mut self, relative_path: &str) -> bool {
        if let Some(cached) = self.containment.get(relative_path) {
            return *cached;
        }

        let mut visited: HashSet<String> = HashSet::new();
        let mut stack: Vec<(String, bool)> = vec![(relative_path.to_string(), false)];

        while let Some((dir, children_done)) = stack.pop() {
            if children_done {
                let found = self.child_indices(&dir).any(|idx| {
                    let child = &self.entries[idx];
                    if child.entry.is_dir {
                        self.containment
                            .get(&child.relative_path)
                            .copied()
                            .unwrap_or(false)
                    } else {
                        self.file_qualifies(&child.relative_path)
                    }
                });
                self.containment.insert(dir, found);
                continue;
            }

            if self.containment.contains_key(&dir) || !visited.insert(dir.clone()) {
                continue;
            }

            let child_dirs: Vec<String> = self
                .child_indices(&dir)
                .filter(|idx| self.entries[*idx].entry.is_dir)
                .map(|idx| self.entries[idx].relative_path.clone())
                .filter(|child| !self.containment.contains_key(child) && !visited.contains(child))
                .collect();
            stack.push((dir, true));
            stack.extend(child_dirs.into_iter().map(|child| (child, false)));
        }

        self.containment
            .get(relative_path)
            .copied()
            .unwrap_or(false)
    }

    fn child_indices(&self, parent: &str) -> impl Iterator<Item = usize> + '_ {
        self.by_parent
            .get(parent)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    fn file_qualifies(&self, relative_path: &str) -> bool {
        self.status_of(relative_path)
            .is_some_and(|status| status.is_difference())
    }

    fn node_at(&self, idx: usize, expanded: Option<&HashSet<String>>) -> TreeNode<'a> {
        let item = &self.entries[idx];
        let status = self.status_of(&item.relative_path);
        let expanded = item.entry.is_dir
            && expanded.is_some_and(|expanded| expanded.contains(&item.relative_path));
        TreeNode {
            entry: item.entry,
            relative_path: item.relative_path.clone(),
            depth: depth_of(&item.relative_path),
            status,
            highlight: Highlight::for_status(status, self.side),
            expanded,
        }
    }
}

// Case-insensitive first; on a tie lowercase sorts ahead of uppercase.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{compare, comparison_map};

    fn names(nodes: &[TreeNode<'_>]) -> Vec<String> {
        nodes.iter().map(|node| node.relative_path.clone()).collect()
    }

    fn sample() -> (DirectoryListing, DirectoryListing) {
        let left = DirectoryListing::new(
            "/L",
            vec![
                DirectoryEntry::file("/L/zeta.txt", 1, "t"),
                DirectoryEntry::directory("/L/src", "t"),
                DirectoryEntry::file("/L/src/main.rs", 10, "t"),
                DirectoryEntry::directory("/L/src/deep", "t"),
                DirectoryEntry::directory("/L/src/deep/er", "t"),
                DirectoryEntry::file("/L/src/deep/er/leaf.rs", 1, "t1"),
                DirectoryEntry::directory("/L/docs", "t"),
                DirectoryEntry::file("/L/docs/guide.md", 5, "t"),
                DirectoryEntry::file("/L/Alpha.txt", 1, "t"),
                DirectoryEntry::file("/L/only-left.txt", 1, "t"),
            ],
        );
        let right = DirectoryListing::new(
            "/R",
            vec![
                DirectoryEntry::file("/R/zeta.txt", 1, "t"),
                DirectoryEntry::directory("/R/src", "t"),
                DirectoryEntry::file("/R/src/main.rs", 10, "t"),
                DirectoryEntry::directory("/R/src/deep", "t"),
                DirectoryEntry::directory("/R/src/deep/er", "t"),
                DirectoryEntry::file("/R/src/deep/er/leaf.rs", 1, "t2"),
                DirectoryEntry::directory("/R/docs", "t"),
                DirectoryEntry::file("/R/docs/guide.md", 5, "t"),
                DirectoryEntry::file("/R/Alpha.txt", 1, "t"),
                DirectoryEntry::file("/R/only-right.txt", 1, "t"),
            ],
        );
        (left, right)
    }

    #[test]
    fn directories_sort_before_files_and_names_ignore_case() {
        let (left, right) = sample();
        let map = comparison_map(compare(Some(&left), Some(&right)));
        let mut view = TreeView::new(&left, &map, PanelSide::Left, false);
        assert_eq!(
            names(&view.roots()),
            vec!["docs", "src", "Alpha.txt", "only-left.txt", "zeta.txt"]
        );
        assert_eq!(names(&view.children("src")), vec!["src/deep", "src/main.rs"]);
    }

    #[test]
    fn case_ties_put_lowercase_first() {
        assert_eq!(compare_names("a", "A"), Ordering::Less);
        assert_eq!(compare_names("B", "a"), Ordering::Greater);
    }

    #[test]
    fn highlight_depends_on_rendered_side() {
        use ComparisonStatus::*;
        assert_eq!(Highlight::for_status(Some(Different), PanelSide::Left), Highlight::Red);
        assert_eq!(Highlight::for_status(Some(Different), PanelSide::Right), Highlight::Red);
        assert_eq!(Highlight::for_status(Some(LeftOnly), PanelSide::Left), Highlight::Blue);
        assert_eq!(Highlight::for_status(Some(LeftOnly), PanelSide::Right), Highlight::None);
        assert_eq!(Highlight::for_status(Some(RightOnly), PanelSide::Right), Highlight::Blue);
        assert_eq!(Highlight::for_status(Some(Same), PanelSide::Left), Highlight::None);
        assert_eq!(Highlight::for_status(None, PanelSide::Left), Highlight::None);
    }

    #[test]
    fn only_different_keeps_every_ancestor_of_a_deep_change() {
        let (left, right) = sample();
        let map = comparison_map(compare(Some(&left), Some(&right)));
        let mut view = TreeView::new(&left, &map, PanelSide::Left, true);

        assert_eq!(names(&view.roots()), vec!["src", "only-left.txt"]);
        assert_eq!(names(&view.children("src")), vec!["src/deep"]);
        assert_eq!(names(&view.children("src/deep")), vec!["src/deep/er"]);
        assert_eq!(names(&view.children("src/deep/er")), vec!["src/deep/er/leaf.rs"]);
        assert!(!view.contains_difference("docs"));
    }

    #[test]
    fn one_sided_files_qualify_on_their_own_side() {
        let (left, right) = sample();
        let map = comparison_map(compare(Some(&left), Some(&right)));
        let mut view = TreeView::new(&right, &map, PanelSide::Right, true);
        let roots = view.roots();
        assert_eq!(names(&roots), vec!["src", "only-right.txt"]);
        assert_eq!(roots[1].highlight, Highlight::Blue);
    }

    #[test]
    fn visible_rows_follow_expansion() {
        let (left, right) = sample();
        let map = comparison_map(compare(Some(&left), Some(&right)));
        let expanded: HashSet<String> = ["src".to_string(), "src/deep".to_string()]
            .into_iter()
            .collect();
        let mut view = TreeView::new(&left, &map, PanelSide::Left, false);
        let rows = view.visible_rows(&expanded);
        assert_eq!(
            names(&rows),
            vec![
                "docs",
                "src",
                "src/deep",
                "src/deep/er",
                "src/main.rs",
                "Alpha.txt",
                "only-left.txt",
                "zeta.txt",
            ]
        );
        assert!(rows[1].expanded);
        assert!(!rows[0].expanded);
        assert_eq!(rows[3].depth, 2);
        assert_eq!(rows[3].highlight, Highlight::None);
    }

    #[test]
    fn missing_records_never_qualify() {
        let left = DirectoryListing::new(
            "/L",
            vec![
                DirectoryEntry::directory("/L/d", "t"),
                DirectoryEntry::file("/L/d/f", 1, "t"),
            ],
        );
        let map = ComparisonMap::new();
        let mut view = TreeView::new(&left, &map, PanelSide::Left, true);
        assert!(view.roots().is_empty());
    }

    #[test]
    fn repeated_entries_collapse_into_one_row() {
        let left = DirectoryListing::new(
            "/L",
            vec![
                DirectoryEntry::directory("/L/d", "t"),
                DirectoryEntry::directory("/L/d", "t"),
                DirectoryEntry::directory("/L/d/e", "t"),
                DirectoryEntry::directory("/L/d/e", "t"),
                DirectoryEntry::file("/L/d/e/x", 1, "t1"),
            ],
        );
        let right = DirectoryListing::new(
            "/R",
            vec![
                DirectoryEntry::directory("/R/d", "t"),
                DirectoryEntry::directory("/R/d/e", "t"),
                DirectoryEntry::file("/R/d/e/x", 1, "t2"),
            ],
        );
        let map = comparison_map(compare(Some(&left), Some(&right)));
        let mut view = TreeView::new(&left, &map, PanelSide::Left, true);

        assert!(view.contains_difference("d"));
        assert!(view.contains_difference("d/e"));
        assert_eq!(names(&view.roots()), vec!["d"]);

        let expanded: HashSet<String> = ["d".to_string(), "d/e".to_string()].into_iter().collect();
        assert_eq!(names(&view.visible_rows(&expanded)), vec!["d", "d/e", "d/e/x"]);
    }

    #[test]
    fn later_duplicate_entry_wins() {
        let left = DirectoryListing::new(
            "/L",
            vec![
                DirectoryEntry::file("/L/a.txt", 1, "old"),
                DirectoryEntry::file("/L/a.txt", 2, "new"),
            ],
        );
        let map = ComparisonMap::new();
        let mut view = TreeView::new(&left, &map, PanelSide::Left, false);
        let roots = view.roots();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].entry.size, 2);
    }

    #[test]
    fn wide_tree_with_one_deep_change_filters_to_its_branch() {
        let mut entries = Vec::new();
        for dir in 0..500 {
            entries.push(DirectoryEntry::directory(format!("/L/d{dir:03}"), "t"));
            for file in 0..10 {
                entries.push(DirectoryEntry::file(format!("/L/d{dir:03}/f{file}"), 1, "t"));
            }
        }
        let left = DirectoryListing::new("/L", entries.clone());
        let mut right_entries: Vec<DirectoryEntry> = entries
            .into_iter()
            .map(|entry| {
                let path = entry.path.replacen("/L", "/R", 1);
                if entry.is_dir {
                    DirectoryEntry::directory(path, "t")
                } else if path == "/R/d250/f3" {
                    DirectoryEntry::file(path, 2, "t")
                } else {
                    DirectoryEntry::file(path, 1, "t")
                }
            })
            .collect();
        right_entries.reverse();
        let right = DirectoryListing::new("/R", right_entries);

        let map = comparison_map(compare(Some(&left), Some(&right)));
        let mut view = TreeView::new(&left, &map, PanelSide::Left, true);
        assert_eq!(names(&view.roots()), vec!["d250"]);
        assert_eq!(names(&view.children("d250")), vec!["d250/f3"]);
    }

    #[test]
    fn non_ascii_names_sort_by_lowercased_code_point() {
        assert_eq!(compare_names("\u{e9}clair", "zebra"), Ordering::Greater);
        assert_eq!(compare_names("\u{c9}clair", "\u{e9}clair"), Ordering::Greater);
    }
}
