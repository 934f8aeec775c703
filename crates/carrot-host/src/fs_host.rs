use carrot_core::path::normalize_separators;
use carrot_core::{DirectoryEntry, FileReader, HostBridge, HostError};
use chrono::{DateTime, SecondsFormat, Utc};
use ignore::WalkBuilder;
use std::fs;
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, warn};

/// Host bridge over the local file system.
///
/// Listings include hidden files and do not honour ignore files; a diff tool
/// has to see everything that is on disk. Symlinks are not followed.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsHost;

impl FsHost {
    pub fn new() -> Self {
        Self
    }
}

impl FileReader for FsHost {
    fn read_file_contents(&self, path: &Path) -> Result<String, HostError> {
        let metadata = fs::metadata(path).map_err(|err| HostError::read_failed(path, err))?;
        if metadata.is_dir() {
            return Err(HostError::NotAFile {
                path: normalize_separators(&path.to_string_lossy()),
            });
        }
        let bytes = fs::read(path).map_err(|err| HostError::read_failed(path, err))?;
        String::from_utf8(bytes).map_err(|_| HostError::read_failed(path, "file is not valid UTF-8"))
    }
}

impl HostBridge for FsHost {
    fn list_directory(&self, path: &Path) -> Result<Vec<DirectoryEntry>, HostError> {
        let metadata = fs::metadata(path).map_err(|err| HostError::listing_failed(path, err))?;
        if !metadata.is_dir() {
            return Err(HostError::listing_failed(path, "not a directory"));
        }

        let walker = WalkBuilder::new(path)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut entries = Vec::new();
        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("listing_entry_skipped: root={} error={err}", path.display());
                    continue;
                }
            };
            if entry.depth() == 0 {
                continue;
            }
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(err) => {
                    warn!("listing_metadata_skipped: path={} error={err}", entry.path().display());
                    continue;
                }
            };

            let entry_path = normalize_separators(&entry.path().to_string_lossy());
            let mod_time = metadata.modified().map(format_mod_time).unwrap_or_default();
            if metadata.is_dir() {
                entries.push(DirectoryEntry::directory(entry_path, mod_time));
            } else {
                entries.push(DirectoryEntry::file(entry_path, metadata.len(), mod_time));
            }
        }

        debug!(root = %path.display(), count = entries.len(), "directory listed");
        Ok(entries)
    }
}

fn format_mod_time(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Millis, true)
}
