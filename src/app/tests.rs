use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::*;
use crate::audio::{MediaPlayer, PlaybackState, UnavailablePlayer};
use crate::config::Settings;
use crate::error::PlaybackError;
use crate::library::{Analyzer, ScanEvent, ScanHandle, ScanProgress, Track, TrackLibrary};

struct FakeAnalyzer;

impl Analyzer for FakeAnalyzer {
    fn analyze(&self, path: &Path) -> Track {
        Track::unanalyzed(path)
    }
}

/// Always loads, always busy.
struct FakePlayer;

impl MediaPlayer for FakePlayer {
    fn load(&mut self, _path: &Path) -> Result<(), PlaybackError> {
        Ok(())
    }
    fn play(&mut self) -> Result<(), PlaybackError> {
        Ok(())
    }
    fn pause(&mut self) {}
    fn unpause(&mut self) {}
    fn stop(&mut self) {}
    fn is_busy(&self) -> bool {
        true
    }
}

fn t(name: &str, key: Option<&str>, bpm: u32) -> Track {
    let mut track = Track::unanalyzed(Path::new(&format!("/music/{name}.mp3")));
    track.key = key.map(str::to_string);
    track.tempo_bpm = bpm;
    track
}

fn app_with(player: Box<dyn MediaPlayer>) -> App {
    let mut app = App::new(&Settings::default(), player, Arc::new(FakeAnalyzer));
    app.install_library(TrackLibrary::new(
        None,
        vec![
            t("a_am", Some("Am"), 128),
            t("b_c", Some("C"), 128),
            t("c_em", Some("Em"), 130),
            t("d_none", None, 128),
        ],
    ));
    app
}

fn app() -> App {
    app_with(Box::new(UnavailablePlayer))
}

fn set_names(app: &App) -> Vec<&str> {
    app.set()
        .entries()
        .iter()
        .map(|e| e.track.display_name.as_str())
        .collect()
}

fn notice_level(app: &App) -> Option<NoticeLevel> {
    app.notice().map(|n| n.level)
}

fn lib(index: usize) -> RowRef {
    RowRef {
        pane: Pane::Library,
        index,
    }
}

fn set_row(index: usize) -> RowRef {
    RowRef {
        pane: Pane::Set,
        index,
    }
}

fn add_library(app: &mut App, index: usize) {
    let now = Instant::now();
    app.dispatch(Intent::Select(lib(index)), now);
    app.dispatch(Intent::AddSelected, now);
}

#[test]
fn gesture_needs_more_than_threshold_to_drag() {
    let mut g = DragGesture::Idle;
    g.press(Some(lib(0)), 5, 5);
    assert!(!g.motion(15, 5, DRAG_THRESHOLD));
    assert!(!g.motion(5, 15, DRAG_THRESHOLD));
    assert!(!g.is_dragging());
    assert!(g.motion(16, 5, DRAG_THRESHOLD));
    assert!(g.is_dragging());

    assert_eq!(
        g.release(Some(set_row(0))),
        Release::Drop {
            source: lib(0),
            target: Some(set_row(0))
        }
    );
    assert_eq!(g, DragGesture::Idle);
}

#[test]
fn gesture_release_without_drag_is_a_click() {
    let mut g = DragGesture::Idle;
    g.press(Some(lib(2)), 5, 5);
    g.motion(6, 7, DRAG_THRESHOLD);
    assert_eq!(g.release(Some(set_row(1))), Release::Click(lib(2)));

    g.press(None, 0, 0);
    assert_eq!(g.release(None), Release::None);
}

#[test]
fn click_selects_row_and_focuses_pane() {
    let mut app = app();
    app.pointer_down(Some(lib(2)), 3, 4);
    app.pointer_up(Some(lib(2)), Instant::now());
    assert_eq!(app.focus(), Pane::Library);
    assert_eq!(app.selected(Pane::Library), 2);
}

#[test]
fn dragging_library_row_onto_set_inserts_there() {
    let mut app = app();
    add_library(&mut app, 1);
    add_library(&mut app, 2);
    assert_eq!(set_names(&app), ["b_c.mp3", "c_em.mp3"]);

    app.pointer_down(Some(lib(0)), 2, 3);
    app.pointer_drag(30, 3);
    app.pointer_up(Some(set_row(1)), Instant::now());

    assert_eq!(set_names(&app), ["b_c.mp3", "a_am.mp3", "c_em.mp3"]);
    assert_eq!(app.set().positions(), vec![1, 2, 3]);
}

#[test]
fn dragging_within_set_reorders() {
    let mut app = app();
    for i in 0..3 {
        add_library(&mut app, i);
    }
    app.pointer_down(Some(set_row(0)), 40, 2);
    app.pointer_drag(40, 20);
    app.pointer_up(Some(set_row(2)), Instant::now());

    assert_eq!(set_names(&app), ["b_c.mp3", "c_em.mp3", "a_am.mp3"]);
    assert_eq!(app.selected(Pane::Set), 2);
}

#[test]
fn drop_outside_set_does_nothing() {
    let mut app = app();
    add_library(&mut app, 0);
    app.pointer_down(Some(lib(1)), 2, 3);
    app.pointer_drag(2, 30);
    app.pointer_up(Some(lib(3)), Instant::now());
    assert_eq!(set_names(&app), ["a_am.mp3"]);
}

#[test]
fn suggestions_follow_set_mutations() {
    let mut app = app();
    let now = Instant::now();
    app.dispatch(Intent::Select(lib(0)), now);
    app.dispatch(Intent::Suggest, now);

    let names: Vec<_> = app
        .suggestions()
        .iter()
        .map(|s| s.track.display_name.as_str())
        .collect();
    assert_eq!(names, ["c_em.mp3", "b_c.mp3"]);
    assert_eq!(app.reference().map(|r| r.display_name.as_str()), Some("a_am.mp3"));

    app.dispatch(Intent::AcceptSuggestion, now);
    assert_eq!(set_names(&app), ["c_em.mp3"]);
    assert_eq!(app.suggestions().len(), 1);
    assert_eq!(app.suggestions()[0].track.display_name, "b_c.mp3");

    app.dispatch(Intent::Focus(Pane::Set), now);
    app.dispatch(Intent::RemoveSelected, now);
    assert_eq!(app.suggestions().len(), 2);
}

#[test]
fn duplicate_add_is_a_warning() {
    let mut app = app();
    add_library(&mut app, 1);
    add_library(&mut app, 1);
    assert_eq!(set_names(&app), ["b_c.mp3"]);
    assert_eq!(notice_level(&app), Some(NoticeLevel::Warning));
}

#[test]
fn suggest_for_keyless_track_is_informational() {
    let mut app = app();
    let now = Instant::now();
    app.dispatch(Intent::Select(lib(3)), now);
    app.dispatch(Intent::Suggest, now);
    assert!(app.suggestions().is_empty());
    assert_eq!(notice_level(&app), Some(NoticeLevel::Info));
}

#[test]
fn suggest_on_empty_library_warns() {
    let mut app = App::new(
        &Settings::default(),
        Box::new(UnavailablePlayer),
        Arc::new(FakeAnalyzer),
    );
    app.dispatch(Intent::Suggest, Instant::now());
    assert!(app.reference().is_none());
    assert_eq!(notice_level(&app), Some(NoticeLevel::Warning));
}

#[test]
fn marked_rows_are_removed_together() {
    let mut app = app();
    let now = Instant::now();
    for i in 0..4 {
        add_library(&mut app, i);
    }
    app.dispatch(Intent::Focus(Pane::Set), now);
    app.dispatch(Intent::SelectFirst, now);
    app.dispatch(Intent::ToggleMark, now);
    app.dispatch(Intent::SelectLast, now);
    app.dispatch(Intent::ToggleMark, now);
    assert_eq!(app.marked().len(), 2);

    app.dispatch(Intent::RemoveSelected, now);
    assert_eq!(set_names(&app), ["b_c.mp3", "c_em.mp3"]);
    assert_eq!(app.set().positions(), vec![1, 2]);
    assert!(app.marked().is_empty());
    assert!(app.selected(Pane::Set) < 2);
}

#[test]
fn move_keeps_cursor_on_moved_row() {
    let mut app = app();
    let now = Instant::now();
    for i in 0..3 {
        add_library(&mut app, i);
    }
    app.dispatch(Intent::Focus(Pane::Set), now);
    app.dispatch(Intent::SelectLast, now);
    app.dispatch(Intent::MoveUp, now);
    assert_eq!(set_names(&app), ["a_am.mp3", "c_em.mp3", "b_c.mp3"]);
    assert_eq!(app.selected(Pane::Set), 1);

    app.dispatch(Intent::MoveTop, now);
    assert_eq!(set_names(&app), ["c_em.mp3", "a_am.mp3", "b_c.mp3"]);
    assert_eq!(app.selected(Pane::Set), 0);

    app.dispatch(Intent::MoveUp, now);
    assert_eq!(set_names(&app), ["c_em.mp3", "a_am.mp3", "b_c.mp3"]);

    app.dispatch(Intent::MoveBottom, now);
    assert_eq!(set_names(&app), ["a_am.mp3", "b_c.mp3", "c_em.mp3"]);
    assert_eq!(app.selected(Pane::Set), 2);
}

#[test]
fn empty_set_operations_warn_without_changes() {
    let mut app = app();
    let now = Instant::now();
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out");

    app.dispatch(Intent::ClearSet, now);
    assert_eq!(notice_level(&app), Some(NoticeLevel::Warning));

    app.dispatch(Intent::DismissNotice, now);
    app.dispatch(Intent::Export(dest.clone()), now);
    assert_eq!(notice_level(&app), Some(NoticeLevel::Warning));
    assert!(!dest.exists());
}

#[test]
fn export_intent_copies_in_set_order() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let a = src.path().join("X.mp3");
    let b = src.path().join("Y.mp3");
    fs::write(&a, b"x").unwrap();
    fs::write(&b, b"y").unwrap();

    let mut app = App::new(
        &Settings::default(),
        Box::new(UnavailablePlayer),
        Arc::new(FakeAnalyzer),
    );
    app.install_library(TrackLibrary::new(
        None,
        vec![Track::unanalyzed(&a), Track::unanalyzed(&b)],
    ));
    add_library(&mut app, 0);
    add_library(&mut app, 1);

    app.dispatch(Intent::Export(out.path().to_path_buf()), Instant::now());
    assert_eq!(notice_level(&app), Some(NoticeLevel::Info));
    assert_eq!(fs::read(out.path().join("01 - X.mp3")).unwrap(), b"x");
    assert_eq!(fs::read(out.path().join("02 - Y.mp3")).unwrap(), b"y");
    assert_eq!(app.set().len(), 2);
}

#[test]
fn prompt_collects_input_and_submits() {
    let mut app = app();
    let now = Instant::now();
    app.dispatch(Intent::OpenPrompt(PromptKind::OpenFolder), now);
    assert_eq!(app.prompt().map(|p| p.input.as_str()), Some(""));

    for c in "/nope".chars() {
        app.dispatch(Intent::PromptInput(c), now);
    }
    app.dispatch(Intent::PromptBackspace, now);
    assert_eq!(app.prompt().map(|p| p.input.as_str()), Some("/nop"));

    app.dispatch(Intent::PromptSubmit, now);
    assert!(app.prompt().is_none());
    assert!(!app.is_scanning());
    assert_eq!(notice_level(&app), Some(NoticeLevel::Error));
}

#[test]
fn scan_intent_loads_library_in_one_handoff() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("one.mp3"), b"").unwrap();
    fs::write(dir.path().join("two.WAV"), b"").unwrap();
    fs::write(dir.path().join("notes.txt"), b"").unwrap();

    let mut app = App::new(
        &Settings::default(),
        Box::new(UnavailablePlayer),
        Arc::new(FakeAnalyzer),
    );
    app.dispatch(Intent::StartScan(dir.path().to_path_buf()), Instant::now());
    assert!(app.is_scanning());

    for _ in 0..500 {
        app.tick(Instant::now());
        if !app.is_scanning() {
            break;
        }
        assert!(app.library().is_empty());
        thread::sleep(Duration::from_millis(10));
    }

    assert!(!app.is_scanning());
    assert_eq!(app.library().len(), 2);
    assert_eq!(app.library().root(), Some(dir.path()));
}

#[test]
fn dead_scan_worker_stops_scanning_with_an_error() {
    let mut app = app();
    let (tx, rx) = std::sync::mpsc::channel();
    tx.send(ScanEvent::Progress(ScanProgress {
        processed: 1,
        total: 3,
    }))
    .unwrap();
    drop(tx);

    app.watch_scan(ScanHandle::from_receiver("/music".into(), rx));
    assert!(app.is_scanning());

    assert!(app.tick(Instant::now()));
    assert!(!app.is_scanning());
    assert_eq!(app.scan_progress(), None);
    assert_eq!(notice_level(&app), Some(NoticeLevel::Error));
    // The library that was already loaded stays.
    assert_eq!(app.library().len(), 4);
}

#[test]
fn playback_failure_is_an_error_notice() {
    let mut app = app();
    app.dispatch(Intent::PlaySelected, Instant::now());
    assert_eq!(app.transport().state(), PlaybackState::Stopped);
    assert_eq!(notice_level(&app), Some(NoticeLevel::Error));
}

#[test]
fn scrub_reports_display_only_seek() {
    let mut app = app_with(Box::new(FakePlayer));
    let now = Instant::now();
    app.dispatch(Intent::PlaySelected, now);
    assert_eq!(app.transport().state(), PlaybackState::Playing);

    app.dispatch(Intent::ScrubForward, now);
    assert_eq!(app.transport().elapsed_secs(), 5);
    let notice = app.notice().unwrap();
    assert_eq!(notice.level, NoticeLevel::Info);
    assert!(notice.text.contains("00:05"));

    app.dispatch(Intent::TogglePause, now);
    assert_eq!(app.transport().state(), PlaybackState::Paused);
    app.dispatch(Intent::Stop, now);
    assert_eq!(app.transport().state(), PlaybackState::Stopped);
}

#[test]
fn seek_to_moves_display_only_and_needs_a_track() {
    let mut app = app_with(Box::new(FakePlayer));
    let now = Instant::now();
    app.dispatch(Intent::SeekTo(42), now);
    assert_eq!(app.transport().elapsed_secs(), 0);
    assert!(app.notice().is_none());

    app.dispatch(Intent::PlaySelected, now);
    app.dispatch(Intent::SeekTo(42), now);
    assert_eq!(app.transport().elapsed_secs(), 42);
    assert_eq!(app.transport().state(), PlaybackState::Playing);
    let notice = app.notice().unwrap();
    assert_eq!(notice.level, NoticeLevel::Info);
    assert!(notice.text.contains("00:42"));
}

#[test]
fn focus_cycles_through_panes() {
    let mut app = app();
    let now = Instant::now();
    app.dispatch(Intent::FocusNext, now);
    assert_eq!(app.focus(), Pane::Set);
    app.dispatch(Intent::FocusNext, now);
    assert_eq!(app.focus(), Pane::Suggestions);
    app.dispatch(Intent::FocusNext, now);
    assert_eq!(app.focus(), Pane::Library);

    app.dispatch(Intent::SelectLast, now);
    assert_eq!(app.selected(Pane::Library), 3);
    app.dispatch(Intent::SelectNext, now);
    assert_eq!(app.selected(Pane::Library), 3);
    app.dispatch(Intent::SelectFirst, now);
    app.dispatch(Intent::SelectPrev, now);
    assert_eq!(app.selected(Pane::Library), 0);
}
