//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`, plus the
//! layout and hit-testing helpers the runtime uses to map pointer positions
//! back to rows.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{App, NoticeLevel, Pane, PromptKind, RowRef};
use crate::audio::PlaybackState;
use crate::config::{ControlsSettings, UiSettings};
use crate::library::{Track, format_mmss};

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("tab", "pane");
    map.insert("j/k", "up/down");
    map.insert("gg/G", "top/bottom");
    map.insert("a", "add");
    map.insert("d", "remove");
    map.insert("v", "mark");
    map.insert("K/J", "move up/down");
    map.insert("T/B", "top/bottom of set");
    map.insert("c", "clear set");
    map.insert("s", "suggest");
    map.insert("enter", "play");
    map.insert("space/p", "play/pause");
    map.insert("S", "stop");
    // H/L is filled dynamically from config.
    map.insert("o", "open folder");
    map.insert("x", "export");
    map.insert("i", "metadata");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    let order = [
        "tab", "j/k", "gg/G", "a", "d", "v", "K/J", "T/B", "c", "s", "enter", "space/p", "S",
        "H/L", "o", "x", "i", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Screen regions of the three track lists and the playback row.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Areas {
    pub library: Rect,
    pub set: Rect,
    pub suggestions: Rect,
    pub playback: Rect,
}

impl Areas {
    pub fn pane(&self, pane: Pane) -> Rect {
        match pane {
            Pane::Library => self.library,
            Pane::Set => self.set,
            Pane::Suggestions => self.suggestions,
        }
    }
}

fn vertical_chunks(area: Rect) -> [Rect; 4] {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .areas(area)
}

fn status_block() -> Block<'static> {
    Block::bordered()
        .padding(Padding {
            left: 1,
            right: 1,
            top: 0,
            bottom: 0,
        })
        .title(" status ")
}

/// Info, playback and notice rows inside the status box.
fn status_rows(status_area: Rect) -> [Rect; 3] {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(status_block().inner(status_area))
}

/// Split the full terminal `area` the same way `draw` does.
pub fn layout(area: Rect) -> Areas {
    let [_, status, main, _] = vertical_chunks(area);
    let [_, playback, _] = status_rows(status);
    let [library, right] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .areas(main);
    let [set, suggestions] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .areas(right);
    Areas {
        library,
        set,
        suggestions,
        playback,
    }
}

/// Whether `(x, y)` is on the playback row.
pub fn on_playback_row(areas: &Areas, x: u16, y: u16) -> bool {
    let r = areas.playback;
    x >= r.x && x < r.x + r.width && y >= r.y && y < r.y + r.height
}

/// Position (seconds) the playback row maps column `x` to, for a track of
/// `duration_secs`: the left edge is the start, the right edge the end.
/// Columns outside the row clamp to the nearest edge.
pub fn seek_position(areas: &Areas, x: u16, duration_secs: u64) -> u64 {
    let row = areas.playback;
    let span = row.width.saturating_sub(1).max(1) as u64;
    let offset = (x.saturating_sub(row.x) as u64).min(span);
    offset * duration_secs / span
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(3);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn track_columns(track: &Track) -> String {
    format!(
        "{:>3} {:>3} {:>3} {:>4} {}",
        track.tempo_bpm,
        track.key_text(),
        track.camelot_text(),
        track.loudness_text(),
        track.duration_text(),
    )
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if focused {
        block.border_style(Style::default().fg(Color::Cyan))
    } else {
        block
    }
}

fn render_list(
    frame: &mut Frame,
    area: Rect,
    rows: Vec<String>,
    selected: usize,
    block: Block<'static>,
) {
    // Only build ListItems for the visible window.
    let total = rows.len();
    let height = inner(area).height as usize;
    let (start, end) = visible_window(total, height, selected);
    let items: Vec<ListItem> = rows
        .into_iter()
        .skip(start)
        .take(end - start)
        .map(ListItem::new)
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(selected.min(total - 1) - start));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn status_lines(app: &App) -> (String, String) {
    let mut parts: Vec<String> = Vec::new();
    match app.library().root() {
        Some(dir) => parts.push(format!("Dir: {}", dir.display())),
        None => parts.push("Dir: none".to_string()),
    }
    parts.push(format!("{} tracks", app.library().len()));
    parts.push(format!("Set: {}", app.set().len()));
    if let Some(r) = app.reference() {
        parts.push(format!("Ref: {} ({})", r.display_name, r.camelot_text()));
    }
    if let crate::app::DragGesture::Dragging { source } = app.drag() {
        if let Some(t) = app.track_at(source.pane, source.index) {
            parts.push(format!("Dragging: {}", t.display_name));
        }
    }
    let info = parts.join(" • ");

    let transport = app.transport();
    let playback = match (transport.state(), transport.now_playing()) {
        (PlaybackState::Stopped, _) | (_, None) => "Stopped".to_string(),
        (state, Some(track)) => {
            let label = if state == PlaybackState::Playing {
                "Playing"
            } else {
                "Paused"
            };
            format!(
                "{label}: {} [{}/{}]",
                track.display_name,
                format_mmss(transport.elapsed_secs()),
                track.duration_text()
            )
        }
    };
    (info, playback)
}

/// Elapsed share of the now-playing track, when its duration is known.
fn playback_ratio(app: &App) -> Option<f64> {
    let transport = app.transport();
    if transport.state() == PlaybackState::Stopped {
        return None;
    }
    let duration = transport.now_playing()?.duration_secs?;
    if duration == 0 {
        return None;
    }
    Some((transport.elapsed_secs() as f64 / duration as f64).clamp(0.0, 1.0))
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let [header_area, status_area, _, footer_area] = vertical_chunks(frame.area());
    let areas = layout(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" setwheel ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, header_area);

    // Status box: info, playback, then either the scan gauge or the notice.
    frame.render_widget(status_block(), status_area);
    let [info_row, playback_row, notice_row] = status_rows(status_area);

    let (info, playback) = status_lines(app);
    frame.render_widget(Paragraph::new(info), info_row);
    // A known duration turns the playback row into a clickable position bar.
    match playback_ratio(app) {
        Some(ratio) => {
            let bar = Gauge::default()
                .gauge_style(Style::default().fg(Color::Blue))
                .ratio(ratio)
                .label(playback);
            frame.render_widget(bar, playback_row);
        }
        None => frame.render_widget(Paragraph::new(playback), playback_row),
    }

    if let Some(progress) = app.scan_progress() {
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Green))
            .ratio(progress.fraction().clamp(0.0, 1.0))
            .label(format!("Scanning {}/{}", progress.processed, progress.total));
        frame.render_widget(gauge, notice_row);
    } else if let Some(notice) = app.notice() {
        let style = match notice.level {
            NoticeLevel::Info => Style::default(),
            NoticeLevel::Warning => Style::default().fg(Color::Yellow),
            NoticeLevel::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        };
        frame.render_widget(Paragraph::new(notice.text.as_str()).style(style), notice_row);
    }

    // Library
    let library_rows: Vec<String> = app
        .library()
        .tracks()
        .iter()
        .map(|t| format!("{}  {}", t.display_name, track_columns(t)))
        .collect();
    render_list(
        frame,
        areas.library,
        library_rows,
        app.selected(Pane::Library),
        pane_block(
            " library (bpm key cam loud len) ".to_string(),
            app.focus() == Pane::Library,
        ),
    );

    // Set
    let set_rows: Vec<String> = app
        .set()
        .entries()
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mark = if app.marked().contains(&i) { '*' } else { ' ' };
            format!(
                "{mark}{:02} {}  {}",
                e.position,
                e.track.display_name,
                track_columns(&e.track)
            )
        })
        .collect();
    render_list(
        frame,
        areas.set,
        set_rows,
        app.selected(Pane::Set),
        pane_block(
            format!(" set ({}) ", app.set().len()),
            app.focus() == Pane::Set,
        ),
    );

    // Suggestions
    let suggestion_rows: Vec<String> = app
        .suggestions()
        .iter()
        .map(|s| {
            format!(
                "{:>3}  {}  {} {} {:+}bpm",
                s.score.total,
                s.track.display_name,
                s.track.tempo_bpm,
                s.track.camelot_text(),
                s.track.tempo_bpm as i64
                    - app.reference().map(|r| r.tempo_bpm as i64).unwrap_or(0),
            )
        })
        .collect();
    let suggestions_title = match app.reference() {
        Some(r) => format!(" suggestions for {} ", r.display_name),
        None => " suggestions ".to_string(),
    };
    render_list(
        frame,
        areas.suggestions,
        suggestion_rows,
        app.selected(Pane::Suggestions),
        pane_block(suggestions_title, app.focus() == Pane::Suggestions),
    );

    // Overlay metadata popup (keeps lists visible under it)
    if app.metadata_window {
        let popup_area = centered_rect_sized(72, 10, areas.library.union(areas.set));
        frame.render_widget(Clear, popup_area);

        let meta = match app.selected_track() {
            Some(track) => format!(
                "Name: {}\nBPM: {}\nKey: {} ({})\nLoudness: {}\nDuration: {}\nPath: {}",
                track.display_name,
                track.tempo_bpm,
                track.key_text(),
                track.camelot_text(),
                track.loudness_text(),
                track.duration_text(),
                track.path.display()
            ),
            None => "No track selected".to_string(),
        };
        let meta_paragraph = Paragraph::new(meta)
            .block(
                Block::default()
                    .padding(Padding {
                        left: 1,
                        right: 0,
                        top: 0,
                        bottom: 0,
                    })
                    .borders(Borders::ALL)
                    .title(" metadata (i closes) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(meta_paragraph, popup_area);
    }

    if let Some(prompt) = app.prompt() {
        let popup_area = centered_rect_sized(64, 3, frame.area());
        frame.render_widget(Clear, popup_area);
        let title = match prompt.kind {
            PromptKind::OpenFolder => " open folder (enter/esc) ",
            PromptKind::ExportTo => " export set to (enter/esc) ",
        };
        let input = Paragraph::new(format!("{}_", prompt.input))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(input, popup_area);
    }

    let footer_text = controls_text(controls_settings.scrub_seconds);
    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, footer_area);
}
