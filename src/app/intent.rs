use std::path::PathBuf;

use super::drag::{Pane, RowRef};

/// Which text prompt is open.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PromptKind {
    OpenFolder,
    ExportTo,
}

/// Everything the user can ask the app to do. Keys and pointer gestures are
/// translated into these by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    FocusNext,
    Focus(Pane),
    SelectNext,
    SelectPrev,
    SelectFirst,
    SelectLast,
    Select(RowRef),

    /// Add the selected library track or accept the selected suggestion.
    AddSelected,
    /// Accept the selected suggestion regardless of focus.
    AcceptSuggestion,
    /// Remove the marked set rows, or the selected one when none are marked.
    RemoveSelected,
    ToggleMark,
    MoveTop,
    MoveUp,
    MoveDown,
    MoveBottom,
    ClearSet,
    /// Drop `source` into the set so it lands at `at`.
    InsertIntoSet { source: RowRef, at: usize },
    ReorderSet { from: usize, to: usize },

    /// Use the selected track as the reference and rank follow-ups.
    Suggest,

    PlaySelected,
    TogglePause,
    Stop,
    ScrubForward,
    ScrubBackward,
    /// Move the displayed position to an absolute second, e.g. from a click
    /// on the playback row.
    SeekTo(u64),

    OpenPrompt(PromptKind),
    PromptInput(char),
    PromptBackspace,
    PromptCancel,
    PromptSubmit,
    StartScan(PathBuf),
    Export(PathBuf),

    ToggleMetadata,
    DismissNotice,
}
