use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Intent, Pane, PromptKind};
use crate::config;
use crate::ui;

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// Frame area of the last draw, used to hit-test pointer events.
    pub last_area: Rect,
    /// Left button went down on the playback row and is still held.
    pub scrubbing: bool,
}

/// What a key press asks the loop to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Dispatch(Intent),
    Nothing,
}

/// Main terminal event loop: drains the scan worker, advances the playback
/// clock, draws, and turns input into intents. Returns `Ok(())` when
/// shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.tick(Instant::now());

        let mut area = state.last_area;
        terminal.draw(|f| {
            area = f.area();
            ui::draw(f, app, &settings.ui, &settings.controls);
        })?;
        state.last_area = area;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match key_action(key, app.prompt().is_some(), state) {
                        KeyAction::Quit => {
                            app.dispatch(Intent::Stop, Instant::now());
                            break;
                        }
                        KeyAction::Dispatch(intent) => app.dispatch(intent, Instant::now()),
                        KeyAction::Nothing => {}
                    }
                }
                Event::Mouse(mouse) => {
                    if let Some(intent) = mouse_intent(mouse, app, state) {
                        app.dispatch(intent, Instant::now());
                    }
                }
                _ => {}
            }
        }
    }

    Ok(())
}

/// Route a pointer event. Presses and drags on the playback row move the
/// displayed position and come back as an intent; everything else goes to
/// the app's drag gesture or selection.
fn mouse_intent(mouse: MouseEvent, app: &mut App, state: &mut EventLoopState) -> Option<Intent> {
    if app.prompt().is_some() {
        state.scrubbing = false;
        return None;
    }
    let areas = ui::layout(state.last_area);
    let (x, y) = (mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if ui::on_playback_row(&areas, x, y) => {
            state.scrubbing = true;
            seek_intent(app, &areas, x)
        }
        MouseEventKind::Drag(MouseButton::Left) if state.scrubbing => seek_intent(app, &areas, x),
        MouseEventKind::Up(MouseButton::Left) if state.scrubbing => {
            state.scrubbing = false;
            None
        }
        MouseEventKind::Down(MouseButton::Left) => {
            let row = ui::hit_test(app, &areas, x, y);
            app.pointer_down(row, x, y);
            None
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.pointer_drag(x, y);
            None
        }
        MouseEventKind::Up(MouseButton::Left) => {
            let row = ui::hit_test(app, &areas, x, y);
            app.pointer_up(row, Instant::now());
            None
        }
        MouseEventKind::ScrollDown => Some(Intent::SelectNext),
        MouseEventKind::ScrollUp => Some(Intent::SelectPrev),
        _ => None,
    }
}

fn seek_intent(app: &App, areas: &ui::Areas, x: u16) -> Option<Intent> {
    let duration = app.transport().now_playing()?.duration_secs?;
    Some(Intent::SeekTo(ui::seek_position(areas, x, duration as u64)))
}

/// Translate a key press. While a prompt is open every printable key is
/// text input.
pub fn key_action(key: KeyEvent, prompt_open: bool, state: &mut EventLoopState) -> KeyAction {
    if prompt_open {
        state.pending_gg = false;
        return match key.code {
            KeyCode::Esc => KeyAction::Dispatch(Intent::PromptCancel),
            KeyCode::Enter => KeyAction::Dispatch(Intent::PromptSubmit),
            KeyCode::Backspace => KeyAction::Dispatch(Intent::PromptBackspace),
            KeyCode::Char(c) if !c.is_control() => KeyAction::Dispatch(Intent::PromptInput(c)),
            _ => KeyAction::Nothing,
        };
    }

    if key.code == KeyCode::Char('g') {
        if state.pending_gg {
            state.pending_gg = false;
            return KeyAction::Dispatch(Intent::SelectFirst);
        }
        state.pending_gg = true;
        return KeyAction::Nothing;
    }
    // g pending should clear on any other key
    state.pending_gg = false;

    let intent = match key.code {
        KeyCode::Char('q') => return KeyAction::Quit,
        KeyCode::Tab => Intent::FocusNext,
        KeyCode::Char('1') => Intent::Focus(Pane::Library),
        KeyCode::Char('2') => Intent::Focus(Pane::Set),
        KeyCode::Char('3') => Intent::Focus(Pane::Suggestions),
        KeyCode::Char('j') | KeyCode::Down => Intent::SelectNext,
        KeyCode::Char('k') | KeyCode::Up => Intent::SelectPrev,
        KeyCode::Char('G') | KeyCode::End => Intent::SelectLast,
        KeyCode::Home => Intent::SelectFirst,
        KeyCode::Char('a') => Intent::AddSelected,
        KeyCode::Char('d') | KeyCode::Delete => Intent::RemoveSelected,
        KeyCode::Char('v') => Intent::ToggleMark,
        KeyCode::Char('K') => Intent::MoveUp,
        KeyCode::Char('J') => Intent::MoveDown,
        KeyCode::Char('T') => Intent::MoveTop,
        KeyCode::Char('B') => Intent::MoveBottom,
        KeyCode::Char('c') => Intent::ClearSet,
        KeyCode::Char('s') => Intent::Suggest,
        KeyCode::Enter => Intent::PlaySelected,
        KeyCode::Char('p') | KeyCode::Char(' ') => Intent::TogglePause,
        KeyCode::Char('S') => Intent::Stop,
        KeyCode::Char('L') => Intent::ScrubForward,
        KeyCode::Char('H') => Intent::ScrubBackward,
        KeyCode::Char('o') => Intent::OpenPrompt(PromptKind::OpenFolder),
        KeyCode::Char('x') => Intent::OpenPrompt(PromptKind::ExportTo),
        KeyCode::Char('i') => Intent::ToggleMetadata,
        KeyCode::Esc => Intent::DismissNotice,
        _ => return KeyAction::Nothing,
    };
    KeyAction::Dispatch(intent)
}
