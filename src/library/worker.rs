//! Background scanning.
//!
//! The worker owns discovery and analysis. The interaction thread only ever
//! sees `ScanEvent`s: progress after each file and one `Finished` carrying
//! the complete library.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info, warn};

use crate::config::LibrarySettings;
use crate::error::ScanError;

use super::analyze::Analyzer;
use super::model::{Track, TrackLibrary};
use super::scan::discover;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScanProgress {
    pub processed: usize,
    pub total: usize,
}

impl ScanProgress {
    /// Completed share in `0.0..=1.0`. An empty scan counts as complete.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }
}

#[derive(Debug)]
pub enum ScanEvent {
    Progress(ScanProgress),
    /// The whole library, sent once after the last file.
    Finished(TrackLibrary),
}

/// Receiving side of a running scan. Dropping it stops the worker at the
/// next file boundary.
pub struct ScanHandle {
    dir: PathBuf,
    rx: Receiver<ScanEvent>,
    join: Option<JoinHandle<()>>,
}

impl ScanHandle {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub(crate) fn from_receiver(dir: PathBuf, rx: Receiver<ScanEvent>) -> Self {
        Self {
            dir,
            rx,
            join: None,
        }
    }

    /// Next pending event without blocking. `Ok(None)` when nothing is
    /// queued yet. Once the worker has gone away without a `Finished`, every
    /// call returns [`ScanError::WorkerLost`].
    pub fn try_next(&self) -> Result<Option<ScanEvent>, ScanError> {
        match self.rx.try_recv() {
            Ok(ev) => Ok(Some(ev)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(ScanError::WorkerLost(self.dir.clone())),
        }
    }

    /// Block until the worker finishes and return its library.
    pub fn wait(mut self) -> Option<TrackLibrary> {
        let mut library = None;
        while let Ok(ev) = self.rx.recv() {
            if let ScanEvent::Finished(lib) = ev {
                library = Some(lib);
            }
        }
        if self.join.take().is_some_and(|h| h.join().is_err()) {
            error!(dir = %self.dir.display(), "scan worker panicked");
        }
        library
    }
}

/// Run the analyzer on one file. A panic inside it costs only that file's
/// analysis: the track is kept with fallback values.
fn analyze_guarded(analyzer: &dyn Analyzer, path: &Path) -> Track {
    match catch_unwind(AssertUnwindSafe(|| analyzer.analyze(path))) {
        Ok(track) => track,
        Err(_) => {
            warn!(path = %path.display(), "analyzer panicked, keeping the file unanalyzed");
            Track::unanalyzed(path)
        }
    }
}

/// Start scanning `dir` on a worker thread.
pub fn spawn_scan(
    dir: PathBuf,
    settings: LibrarySettings,
    analyzer: Arc<dyn Analyzer>,
) -> ScanHandle {
    let (tx, rx) = mpsc::channel::<ScanEvent>();
    let root = dir.clone();

    let join = thread::spawn(move || {
        let files = discover(&root, &settings);
        let total = files.len();
        info!(dir = %root.display(), total, "scan started");

        let mut tracks = Vec::with_capacity(total);
        for (i, path) in files.iter().enumerate() {
            tracks.push(analyze_guarded(analyzer.as_ref(), path));
            let progress = ScanProgress {
                processed: i + 1,
                total,
            };
            if tx.send(ScanEvent::Progress(progress)).is_err() {
                debug!(dir = %root.display(), "scan abandoned");
                return;
            }
        }

        info!(dir = %root.display(), tracks = tracks.len(), "scan finished");
        let _ = tx.send(ScanEvent::Finished(TrackLibrary::new(Some(root), tracks)));
    });

    let mut handle = ScanHandle::from_receiver(dir, rx);
    handle.join = Some(join);
    handle
}
