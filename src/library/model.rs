use std::path::{Path, PathBuf};

use crate::harmony::{CamelotCode, code_for, code_text};

/// Tempo reported when detection failed.
pub const UNDETECTED_BPM: u32 = 120;

/// Stable track identity, derived from the full source path.
///
/// Two files with the same name in different folders are different tracks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackId(PathBuf);

impl TrackId {
    pub fn from_path(path: &Path) -> Self {
        Self(std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

/// An analyzed audio file. Read-only once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: TrackId,
    pub path: PathBuf,
    /// File name including extension.
    pub display_name: String,
    pub tempo_bpm: u32,
    /// One of the 24 canonical key labels, when known.
    pub key: Option<String>,
    /// Normalized loudness in `0..=100`.
    pub loudness_percent: Option<u8>,
    pub duration_secs: Option<u32>,
}

impl Track {
    /// A track carrying only the fallback values used when analysis fails.
    pub fn unanalyzed(path: &Path) -> Self {
        Self {
            id: TrackId::from_path(path),
            path: path.to_path_buf(),
            display_name: display_name_for(path),
            tempo_bpm: UNDETECTED_BPM,
            key: None,
            loudness_percent: None,
            duration_secs: None,
        }
    }

    /// Wheel code derived from `key`; never stored separately.
    pub fn camelot(&self) -> Option<CamelotCode> {
        self.key.as_deref().and_then(code_for)
    }

    pub fn key_text(&self) -> &str {
        self.key.as_deref().unwrap_or("N/A")
    }

    pub fn camelot_text(&self) -> String {
        code_text(self.camelot())
    }

    pub fn loudness_text(&self) -> String {
        match self.loudness_percent {
            Some(p) => format!("{p}%"),
            None => "N/A".to_string(),
        }
    }

    pub fn duration_text(&self) -> String {
        format_mmss(self.duration_secs.unwrap_or(0) as u64)
    }
}

/// File name of `path`, or `UNKNOWN` when it has none.
pub fn display_name_for(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

/// Format whole seconds as `MM:SS`.
pub fn format_mmss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// The full catalog of analyzed tracks from one scan.
#[derive(Debug, Clone, Default)]
pub struct TrackLibrary {
    root: Option<PathBuf>,
    tracks: Vec<Track>,
}

impl TrackLibrary {
    /// Build a library, ordering tracks by display name (case-insensitive),
    /// then by path.
    pub fn new(root: Option<PathBuf>, mut tracks: Vec<Track>) -> Self {
        tracks.sort_by(|a, b| {
            a.display_name
                .to_lowercase()
                .cmp(&b.display_name.to_lowercase())
                .then_with(|| a.path.cmp(&b.path))
        });
        Self { root, tracks }
    }

    /// Folder the library was scanned from.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn find(&self, id: &TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| &t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
