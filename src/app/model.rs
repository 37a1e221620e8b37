//! The `App` model and its intent handlers.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::audio::{MediaPlayer, SeekOutcome, Transport};
use crate::config::{LibrarySettings, Settings};
use crate::curation::{DuplicatePolicy, SetCuration};
use crate::export::export_set;
use crate::library::{
    Analyzer, ScanEvent, ScanHandle, ScanProgress, Track, TrackLibrary, format_mmss,
};
use crate::suggest::{Limits, Suggestion, suggest};

use super::drag::{DragGesture, Pane, Release, RowRef};
use super::intent::{Intent, PromptKind};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// One-line message shown in the status bar until replaced or dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
}

/// The main application model.
pub struct App {
    library: TrackLibrary,
    set: SetCuration,
    suggestions: Vec<Suggestion>,
    reference: Option<Track>,

    focus: Pane,
    /// Selected row per pane, indexed by `slot`.
    cursors: [usize; 3],
    marked: BTreeSet<usize>,

    scan: Option<ScanHandle>,
    scan_progress: Option<ScanProgress>,
    analyzer: Arc<dyn Analyzer>,
    library_settings: LibrarySettings,

    limits: Limits,
    scrub_seconds: u64,
    drag_threshold: u16,
    export_default: Option<PathBuf>,

    notice: Option<Notice>,
    prompt: Option<Prompt>,
    drag: DragGesture,
    transport: Transport,
    pub metadata_window: bool,
}

fn slot(pane: Pane) -> usize {
    match pane {
        Pane::Library => 0,
        Pane::Set => 1,
        Pane::Suggestions => 2,
    }
}

impl App {
    pub fn new(
        settings: &Settings,
        player: Box<dyn MediaPlayer>,
        analyzer: Arc<dyn Analyzer>,
    ) -> Self {
        Self {
            library: TrackLibrary::default(),
            set: SetCuration::new(DuplicatePolicy::from(settings.set.duplicates)),
            suggestions: Vec::new(),
            reference: None,
            focus: Pane::Library,
            cursors: [0; 3],
            marked: BTreeSet::new(),
            scan: None,
            scan_progress: None,
            analyzer,
            library_settings: settings.library.clone(),
            limits: Limits::from(&settings.suggestions),
            scrub_seconds: settings.controls.scrub_seconds,
            drag_threshold: settings.controls.drag_threshold,
            export_default: settings.export.default_dir.clone(),
            notice: None,
            prompt: None,
            drag: DragGesture::Idle,
            transport: Transport::new(
                player,
                Duration::from_millis(settings.playback.tick_ms.max(1)),
            ),
            metadata_window: false,
        }
    }

    pub fn library(&self) -> &TrackLibrary {
        &self.library
    }

    pub fn set(&self) -> &SetCuration {
        &self.set
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    pub fn reference(&self) -> Option<&Track> {
        self.reference.as_ref()
    }

    pub fn focus(&self) -> Pane {
        self.focus
    }

    pub fn selected(&self, pane: Pane) -> usize {
        self.cursors[slot(pane)]
    }

    pub fn marked(&self) -> &BTreeSet<usize> {
        &self.marked
    }

    pub fn scan_progress(&self) -> Option<ScanProgress> {
        self.scan_progress
    }

    pub fn is_scanning(&self) -> bool {
        self.scan.is_some()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn drag(&self) -> DragGesture {
        self.drag
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn pane_len(&self, pane: Pane) -> usize {
        match pane {
            Pane::Library => self.library.len(),
            Pane::Set => self.set.len(),
            Pane::Suggestions => self.suggestions.len(),
        }
    }

    /// The track under the cursor in `pane`.
    pub fn track_at(&self, pane: Pane, index: usize) -> Option<&Track> {
        match pane {
            Pane::Library => self.library.get(index),
            Pane::Set => self.set.get(index).map(|e| &e.track),
            Pane::Suggestions => self.suggestions.get(index).map(|s| &s.track),
        }
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.track_at(self.focus, self.selected(self.focus))
    }

    /// Replace the library, keeping the set and refreshing suggestions.
    pub fn install_library(&mut self, library: TrackLibrary) {
        info!(tracks = library.len(), "library loaded");
        self.library = library;
        self.cursors[slot(Pane::Library)] = 0;
        self.refresh_suggestions();
        self.clamp_cursors();
    }

    /// Start a scan of `dir`, abandoning any scan already running.
    pub fn start_scan(&mut self, dir: PathBuf) {
        if !dir.is_dir() {
            self.error(format!("Not a folder: {}", dir.display()));
            return;
        }
        self.info(format!("Scanning {}", dir.display()));
        let handle = crate::library::spawn_scan(
            dir,
            self.library_settings.clone(),
            Arc::clone(&self.analyzer),
        );
        self.watch_scan(handle);
    }

    /// Follow a running scan, replacing any scan already being watched.
    pub fn watch_scan(&mut self, handle: ScanHandle) {
        self.scan_progress = Some(ScanProgress {
            processed: 0,
            total: 0,
        });
        self.scan = Some(handle);
    }

    /// Drain scan events and advance the playback clock. Returns true when
    /// something visible changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = self.poll_scan();
        if self.transport.tick(now) {
            changed = true;
        }
        changed
    }

    fn poll_scan(&mut self) -> bool {
        let mut changed = false;
        let mut outcome = None;
        if let Some(handle) = &self.scan {
            loop {
                match handle.try_next() {
                    Ok(None) => break,
                    Ok(Some(ScanEvent::Progress(p))) => {
                        changed = true;
                        self.scan_progress = Some(p);
                    }
                    Ok(Some(ScanEvent::Finished(lib))) => {
                        outcome = Some(Ok(lib));
                        break;
                    }
                    Err(e) => {
                        outcome = Some(Err(e));
                        break;
                    }
                }
            }
        }
        let Some(outcome) = outcome else {
            return changed;
        };

        self.scan = None;
        self.scan_progress = None;
        match outcome {
            Ok(lib) => {
                let n = lib.len();
                self.install_library(lib);
                if n == 0 {
                    self.warn("No audio files found");
                } else {
                    self.info(format!("Loaded {n} tracks"));
                }
            }
            Err(e) => {
                warn!(error = %e, "scan lost");
                self.error(format!("Scan failed: {e}"));
            }
        }
        true
    }

    /// Apply one intent.
    pub fn dispatch(&mut self, intent: Intent, now: Instant) {
        match intent {
            Intent::FocusNext => self.focus = self.focus.next(),
            Intent::Focus(pane) => self.focus = pane,
            Intent::SelectNext => self.step(1),
            Intent::SelectPrev => self.step(-1),
            Intent::SelectFirst => self.cursors[slot(self.focus)] = 0,
            Intent::SelectLast => {
                let len = self.pane_len(self.focus);
                self.cursors[slot(self.focus)] = len.saturating_sub(1);
            }
            Intent::Select(row) => {
                self.focus = row.pane;
                if row.index < self.pane_len(row.pane) {
                    self.cursors[slot(row.pane)] = row.index;
                }
            }

            Intent::AddSelected => self.add_selected(),
            Intent::AcceptSuggestion => {
                let idx = self.selected(Pane::Suggestions);
                self.add_from(RowRef {
                    pane: Pane::Suggestions,
                    index: idx,
                }, None);
            }
            Intent::RemoveSelected => self.remove_selected(),
            Intent::ToggleMark => self.toggle_mark(),
            Intent::MoveTop => self.move_selected(|set, i| set.move_to_top(i).then_some(0)),
            Intent::MoveUp => self.move_selected(|set, i| set.move_up(i).then(|| i - 1)),
            Intent::MoveDown => self.move_selected(|set, i| set.move_down(i).then_some(i + 1)),
            Intent::MoveBottom => {
                self.move_selected(|set, i| set.move_to_bottom(i).then(|| set.len() - 1))
            }
            Intent::ClearSet => self.clear_set(),
            Intent::InsertIntoSet { source, at } => self.add_from(source, Some(at)),
            Intent::ReorderSet { from, to } => self.reorder(from, to),

            Intent::Suggest => self.request_suggestions(),

            Intent::PlaySelected => self.play_selected(now),
            Intent::TogglePause => {
                if self.transport.now_playing().is_none() {
                    self.play_selected(now);
                } else {
                    self.transport.toggle_pause(now);
                }
            }
            Intent::Stop => self.transport.stop(),
            Intent::ScrubForward => self.scrub(self.scrub_seconds as i64),
            Intent::ScrubBackward => self.scrub(-(self.scrub_seconds as i64)),
            Intent::SeekTo(secs) => {
                let outcome = self.transport.seek_to(secs);
                self.report_seek(outcome);
            }

            Intent::OpenPrompt(kind) => self.open_prompt(kind),
            Intent::PromptInput(c) => {
                if let Some(p) = &mut self.prompt {
                    p.input.push(c);
                }
            }
            Intent::PromptBackspace => {
                if let Some(p) = &mut self.prompt {
                    p.input.pop();
                }
            }
            Intent::PromptCancel => self.prompt = None,
            Intent::PromptSubmit => self.submit_prompt(now),
            Intent::StartScan(dir) => self.start_scan(dir),
            Intent::Export(dest) => self.export_to(dest),

            Intent::ToggleMetadata => self.metadata_window = !self.metadata_window,
            Intent::DismissNotice => self.notice = None,
        }
    }

    /// Pointer went down over `row` at `(x, y)`.
    pub fn pointer_down(&mut self, row: Option<RowRef>, x: u16, y: u16) {
        self.drag.press(row, x, y);
    }

    pub fn pointer_drag(&mut self, x: u16, y: u16) {
        if self.drag.motion(x, y, self.drag_threshold) {
            debug!("drag started");
        }
    }

    /// Pointer went up over `target`. A click selects; a drop over the set
    /// inserts or reorders.
    pub fn pointer_up(&mut self, target: Option<RowRef>, now: Instant) {
        match self.drag.release(target) {
            Release::None => {}
            Release::Click(row) => self.dispatch(Intent::Select(row), now),
            Release::Drop {
                source,
                target: Some(target),
            } if target.pane == Pane::Set => {
                let intent = match source.pane {
                    Pane::Set => Intent::ReorderSet {
                        from: source.index,
                        to: target.index.min(self.set.len().saturating_sub(1)),
                    },
                    Pane::Library | Pane::Suggestions => Intent::InsertIntoSet {
                        source,
                        at: target.index,
                    },
                };
                self.dispatch(intent, now);
            }
            Release::Drop { .. } => {}
        }
    }

    fn step(&mut self, delta: isize) {
        let len = self.pane_len(self.focus);
        if len == 0 {
            return;
        }
        let cur = &mut self.cursors[slot(self.focus)];
        *cur = cur.saturating_add_signed(delta).min(len - 1);
    }

    fn clamp_cursors(&mut self) {
        for pane in [Pane::Library, Pane::Set, Pane::Suggestions] {
            let len = self.pane_len(pane);
            let cur = &mut self.cursors[slot(pane)];
            *cur = (*cur).min(len.saturating_sub(1));
        }
    }

    fn add_selected(&mut self) {
        match self.focus {
            Pane::Library | Pane::Suggestions => {
                let row = RowRef {
                    pane: self.focus,
                    index: self.selected(self.focus),
                };
                self.add_from(row, None);
            }
            Pane::Set => self.info("Select a library track or suggestion to add"),
        }
    }

    /// Put the track at `source` into the set, appending when `at` is `None`.
    fn add_from(&mut self, source: RowRef, at: Option<usize>) {
        if source.pane == Pane::Set {
            return;
        }
        let Some(track) = self.track_at(source.pane, source.index).cloned() else {
            self.warn("Nothing selected");
            return;
        };
        let name = track.display_name.clone();
        let added = match at {
            Some(at) => self.set.insert_at(track, at),
            None => self.set.append(track),
        };
        match added {
            Ok(position) => {
                debug!(track = %name, position, "added to set");
                self.marked.clear();
                self.cursors[slot(Pane::Set)] = position - 1;
                self.refresh_suggestions();
                self.info(format!("Added {name} at #{position}"));
            }
            Err(e) => self.warn(e.to_string()),
        }
    }

    fn remove_selected(&mut self) {
        if self.set.is_empty() {
            self.warn("The set is empty");
            return;
        }
        let removed = if self.marked.is_empty() {
            let idx = self.selected(Pane::Set);
            self.set.remove_at(idx).into_iter().collect::<Vec<_>>()
        } else {
            let marked: Vec<usize> = self.marked.iter().copied().collect();
            self.marked.clear();
            self.set.remove_many(&marked)
        };
        if removed.is_empty() {
            return;
        }
        debug!(count = removed.len(), "removed from set");
        self.clamp_cursors();
        self.refresh_suggestions();
        match removed.as_slice() {
            [one] => self.info(format!("Removed {}", one.display_name)),
            many => self.info(format!("Removed {} tracks", many.len())),
        }
    }

    fn toggle_mark(&mut self) {
        if self.focus != Pane::Set || self.set.is_empty() {
            return;
        }
        let idx = self.selected(Pane::Set);
        if !self.marked.remove(&idx) {
            self.marked.insert(idx);
        }
    }

    /// Run a move on the selected set row; `op` returns where the row ended up.
    fn move_selected(&mut self, op: impl FnOnce(&mut SetCuration, usize) -> Option<usize>) {
        if self.set.is_empty() {
            self.warn("The set is empty");
            return;
        }
        let idx = self.selected(Pane::Set);
        if let Some(new_idx) = op(&mut self.set, idx) {
            debug!(from = idx + 1, to = new_idx + 1, "moved in set");
            self.marked.clear();
            self.cursors[slot(Pane::Set)] = new_idx;
        }
    }

    fn reorder(&mut self, from: usize, to: usize) {
        if self.set.reorder(from, to) {
            debug!(from = from + 1, to = to + 1, "reordered set");
            self.marked.clear();
            self.focus = Pane::Set;
            self.cursors[slot(Pane::Set)] = to;
        }
    }

    fn clear_set(&mut self) {
        if self.set.is_empty() {
            self.warn("The set is already empty");
            return;
        }
        let n = self.set.clear();
        self.marked.clear();
        self.clamp_cursors();
        self.refresh_suggestions();
        self.info(format!("Cleared {n} tracks from the set"));
    }

    fn request_suggestions(&mut self) {
        if self.library.is_empty() {
            self.warn("The library is empty; open a folder first");
            return;
        }
        let Some(reference) = self.selected_track().cloned() else {
            self.warn("Nothing selected");
            return;
        };
        if reference.camelot().is_none() {
            self.suggestions.clear();
            self.cursors[slot(Pane::Suggestions)] = 0;
            self.info(format!(
                "{} has no known key; nothing to suggest",
                reference.display_name
            ));
            self.reference = Some(reference);
            return;
        }
        let name = reference.display_name.clone();
        self.reference = Some(reference);
        self.refresh_suggestions();
        self.cursors[slot(Pane::Suggestions)] = 0;
        if self.suggestions.is_empty() {
            self.info(format!("No compatible tracks for {name}"));
        } else {
            self.info(format!("{} suggestions for {name}", self.suggestions.len()));
        }
    }

    /// Recompute suggestions for the current reference.
    fn refresh_suggestions(&mut self) {
        self.suggestions = match &self.reference {
            Some(r) => suggest(r, &self.library, &self.set, self.limits),
            None => Vec::new(),
        };
        self.clamp_cursors();
    }

    fn play_selected(&mut self, now: Instant) {
        let Some(track) = self.selected_track().cloned() else {
            self.warn("Nothing selected");
            return;
        };
        if let Err(e) = self.transport.play_track(&track, now) {
            self.error(e.to_string());
        }
    }

    fn scrub(&mut self, delta: i64) {
        let outcome = self.transport.scrub(delta);
        self.report_seek(outcome);
    }

    fn report_seek(&mut self, outcome: Option<SeekOutcome>) {
        if let Some(SeekOutcome::DisplayOnly { position_secs }) = outcome {
            self.info(format!(
                "Seeking is not supported; position display set to {}",
                format_mmss(position_secs)
            ));
        }
    }

    fn open_prompt(&mut self, kind: PromptKind) {
        let input = match kind {
            PromptKind::OpenFolder => self.library.root().map(|p| p.display().to_string()),
            PromptKind::ExportTo => self.export_default.as_ref().map(|p| p.display().to_string()),
        };
        self.prompt = Some(Prompt {
            kind,
            input: input.unwrap_or_default(),
        });
    }

    fn submit_prompt(&mut self, now: Instant) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        let input = prompt.input.trim();
        if input.is_empty() {
            self.warn("No path given");
            return;
        }
        let path = PathBuf::from(input);
        let intent = match prompt.kind {
            PromptKind::OpenFolder => Intent::StartScan(path),
            PromptKind::ExportTo => Intent::Export(path),
        };
        self.dispatch(intent, now);
    }

    fn export_to(&mut self, dest: PathBuf) {
        if self.set.is_empty() {
            self.warn("The set is empty; nothing to export");
            return;
        }
        match export_set(&self.set, &dest) {
            Ok(report) => self.info(format!(
                "Exported {} tracks to {}",
                report.copied,
                report.dest.display()
            )),
            Err(e) => {
                warn!(error = %e, "export failed");
                self.error(e.to_string());
            }
        }
    }

    fn info(&mut self, text: impl Into<String>) {
        self.notify(NoticeLevel::Info, text.into());
    }

    fn warn(&mut self, text: impl Into<String>) {
        self.notify(NoticeLevel::Warning, text.into());
    }

    fn error(&mut self, text: impl Into<String>) {
        self.notify(NoticeLevel::Error, text.into());
    }

    fn notify(&mut self, level: NoticeLevel, text: String) {
        self.notice = Some(Notice { level, text });
    }
}
