//! Error types shared across the application.

use std::path::PathBuf;

use thiserror::Error;

use crate::library::TrackId;

/// Recoverable playback failures. The transport returns to idle on any of
/// these.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// No audio output device could be opened.
    #[error("audio output is not available")]
    Unavailable,

    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    /// `play` was called before anything was loaded.
    #[error("nothing is loaded")]
    NothingLoaded,
}

/// Export failures. A failure part-way leaves earlier copies in place.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("the set is empty")]
    EmptySet,

    #[error("cannot create {dir}: {source}")]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CurationError {
    #[error("{} is already in the set", .0.as_path().display())]
    Duplicate(TrackId),
}

/// The scan worker went away without handing over a library.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScanError {
    #[error("scan of {} stopped before it finished", .0.display())]
    WorkerLost(PathBuf),
}
