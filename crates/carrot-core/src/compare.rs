use crate::model::{ComparisonRecord, ComparisonStatus, DirectoryEntry, DirectoryListing};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Comparison records indexed by relative path.
pub type ComparisonMap = HashMap<String, ComparisonRecord>;

/// Classify every entry of two listings.
///
/// Files are equal when size and modification time match; contents are never
/// read, so two different files that happen to share both are reported
/// `same`. Directories present on both sides are always `same`, and a
/// directory facing a file at the same relative path is `different`.
///
/// Records come out sorted by relative path, but callers should index them
/// with [`comparison_map`] rather than rely on the order.
pub fn compare(
    left: Option<&DirectoryListing>,
    right: Option<&DirectoryListing>,
) -> Vec<ComparisonRecord> {
    match (left, right) {
        (None, None) => Vec::new(),
        (Some(left), None) => index_by_relative_path(left)
            .into_iter()
            .map(|(relative, entry)| ComparisonRecord::left_only(relative, entry.clone()))
            .collect(),
        (None, Some(right)) => index_by_relative_path(right)
            .into_iter()
            .map(|(relative, entry)| ComparisonRecord::right_only(relative, entry.clone()))
            .collect(),
        (Some(left), Some(right)) => compare_both(left, right),
    }
}

fn compare_both(left: &DirectoryListing, right: &DirectoryListing) -> Vec<ComparisonRecord> {
    let left_map = index_by_relative_path(left);
    let right_map = index_by_relative_path(right);
    let all_paths: BTreeSet<&String> = left_map.keys().chain(right_map.keys()).collect();

    let mut records = Vec::with_capacity(all_paths.len());
    for relative in all_paths {
        let record = match (left_map.get(relative), right_map.get(relative)) {
            (Some(left_entry), None) => {
                ComparisonRecord::left_only(relative.clone(), (*left_entry).clone())
            }
            (None, Some(right_entry)) => {
                ComparisonRecord::right_only(relative.clone(), (*right_entry).clone())
            }
            (Some(left_entry), Some(right_entry)) => ComparisonRecord::paired(
                relative.clone(),
                classify_pair(left_entry, right_entry),
                (*left_entry).clone(),
                (*right_entry).clone(),
            ),
            (None, None) => continue,
        };
        records.push(record);
    }
    records
}

/// Status of two entries that share a relative path.
pub fn classify_pair(left: &DirectoryEntry, right: &DirectoryEntry) -> ComparisonStatus {
    if left.is_dir != right.is_dir {
        return ComparisonStatus::Different;
    }
    if left.is_dir {
        return ComparisonStatus::Same;
    }
    if left.size != right.size || left.mod_time != right.mod_time {
        ComparisonStatus::Different
    } else {
        ComparisonStatus::Same
    }
}

// A later entry with the same relative path replaces an earlier one.
fn index_by_relative_path(listing: &DirectoryListing) -> BTreeMap<String, &DirectoryEntry> {
    listing
        .entries
        .iter()
        .map(|entry| (listing.relative_path_of(entry), entry))
        .collect()
}

pub fn comparison_map(records: Vec<ComparisonRecord>) -> ComparisonMap {
    records
        .into_iter()
        .map(|record| (record.relative_path.clone(), record))
        .collect()
}

/// Per-status counts, shown in the status bar.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonSummary {
    pub same: usize,
    pub different: usize,
    pub left_only: usize,
    pub right_only: usize,
}

impl ComparisonSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ComparisonRecord>) -> Self {
        let mut summary = Self::default();
        for record in records {
            match record.status {
                ComparisonStatus::Same => summary.same += 1,
                ComparisonStatus::Different => summary.different += 1,
                ComparisonStatus::LeftOnly => summary.left_only += 1,
                ComparisonStatus::RightOnly => summary.right_only += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.same + self.different + self.left_only + self.right_only
    }

    pub fn has_differences(&self) -> bool {
        self.different + self.left_only + self.right_only > 0
    }
}
