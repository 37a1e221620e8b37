//! Writing the set to disk in performance order.
//!
//! Each entry is copied to `"{position:02} - {display_name}"` inside the
//! destination folder, so a plain file listing shows the set order.

use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::curation::SetCuration;
use crate::error::ExportError;

/// One file to materialize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportItem {
    pub source: PathBuf,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub dest: PathBuf,
    pub copied: usize,
}

/// Destination file name for the entry at 1-based `position`.
pub fn export_name(position: usize, display_name: &str) -> String {
    format!("{position:02} - {display_name}")
}

/// The copy list for `set`, in set order.
pub fn plan(set: &SetCuration) -> Vec<ExportItem> {
    set.entries()
        .iter()
        .map(|e| ExportItem {
            source: e.track.path.clone(),
            file_name: export_name(e.position, &e.track.display_name),
        })
        .collect()
}

/// Copy the set into `dest`, creating it if needed.
///
/// Stops at the first failing copy. Files copied before it stay in place.
pub fn export_set(set: &SetCuration, dest: &Path) -> Result<ExportReport, ExportError> {
    if set.is_empty() {
        return Err(ExportError::EmptySet);
    }

    fs::create_dir_all(dest).map_err(|source| ExportError::CreateDir {
        dir: dest.to_path_buf(),
        source,
    })?;

    let items = plan(set);
    for item in &items {
        let to = dest.join(&item.file_name);
        copy_preserving_times(&item.source, &to).map_err(|source| {
            warn!(from = %item.source.display(), to = %to.display(), error = %source, "export aborted");
            ExportError::Copy {
                from: item.source.clone(),
                to: to.clone(),
                source,
            }
        })?;
    }

    info!(dest = %dest.display(), copied = items.len(), "set exported");
    Ok(ExportReport {
        dest: dest.to_path_buf(),
        copied: items.len(),
    })
}

/// Copy contents and permissions, then carry over access/modification times.
fn copy_preserving_times(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to)?;
    let meta = fs::metadata(from)?;
    let mut times = FileTimes::new();
    if let Ok(modified) = meta.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    File::options().write(true).open(to)?.set_times(times)
}
