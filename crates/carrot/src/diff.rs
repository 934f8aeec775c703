//! Line diff between the two files of a compare tab, plus the folding of
//! unchanged blocks.

use similar::{ChangeTag, TextDiff};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Equal,
    Delete,
    Insert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub kind: LineKind,
    /// 1-based line number in the left file.
    pub old_number: Option<usize>,
    /// 1-based line number in the right file.
    pub new_number: Option<usize>,
    pub text: String,
}

/// One rendered row: a diff line, or a folded run of unchanged lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffRow {
    Line(usize),
    Folded { start: usize, len: usize },
}

pub fn diff_lines(old: &str, new: &str) -> Vec<DiffLine> {
    let diff = TextDiff::from_lines(old, new);
    diff.iter_all_changes()
        .map(|change| {
            let kind = match change.tag() {
                ChangeTag::Equal => LineKind::Equal,
                ChangeTag::Delete => LineKind::Delete,
                ChangeTag::Insert => LineKind::Insert,
            };
            DiffLine {
                kind,
                old_number: change.old_index().map(|index| index + 1),
                new_number: change.new_index().map(|index| index + 1),
                text: change
                    .value()
                    .trim_end_matches(|c: char| c == '\n' || c == '\r')
                    .to_string(),
            }
        })
        .collect()
}

/// The maximal run of unchanged lines around `index`, as `(start, len)`.
pub fn equal_block_at(lines: &[DiffLine], index: usize) -> Option<(usize, usize)> {
    if lines.get(index)?.kind != LineKind::Equal {
        return None;
    }
    let mut start = index;
    while start > 0 && lines[start - 1].kind == LineKind::Equal {
        start -= 1;
    }
    let mut end = index + 1;
    while end < lines.len() && lines[end].kind == LineKind::Equal {
        end += 1;
    }
    Some((start, end - start))
}

/// Rows to render. `folded` holds the start index of each folded block;
/// entries that no longer start an unchanged block are ignored.
pub fn display_rows(lines: &[DiffLine], folded: &BTreeSet<usize>) -> Vec<DiffRow> {
    let mut rows = Vec::with_capacity(lines.len());
    let mut index = 0;
    while index < lines.len() {
        if folded.contains(&index) {
            if let Some((start, len)) = equal_block_at(lines, index) {
                if start == index {
                    rows.push(DiffRow::Folded { start, len });
                    index += len;
                    continue;
                }
            }
        }
        rows.push(DiffRow::Line(index));
        index += 1;
    }
    rows
}

/// `(inserted, deleted)` line counts.
pub fn change_counts(lines: &[DiffLine]) -> (usize, usize) {
    lines.iter().fold((0, 0), |(inserted, deleted), line| match line.kind {
        LineKind::Insert => (inserted + 1, deleted),
        LineKind::Delete => (inserted, deleted + 1),
        LineKind::Equal => (inserted, deleted),
    })
}
