use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/setwheel/config.toml` or `~/.config/setwheel/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `SETWHEEL__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub analysis: AnalysisSettings,
    pub set: SetSettings,
    pub suggestions: SuggestionSettings,
    pub playback: PlaybackSettings,
    pub controls: ControlsSettings,
    pub ui: UiSettings,
    pub export: ExportSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "wav".into()],
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Decode the start of each file to estimate loudness.
    pub measure_loudness: bool,
    /// Estimate tempo and key from the audio when the tags lack them.
    pub detect_missing: bool,
    /// How much audio (seconds) is decoded for loudness and detection.
    pub window_secs: u64,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            measure_loudness: true,
            detect_missing: true,
            window_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SetSettings {
    pub duplicates: DuplicateSetting,
}

#[derive(Debug, Copy, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicateSetting {
    /// Refuse to add a track that is already in the set.
    #[default]
    #[serde(alias = "deny", alias = "no")]
    Reject,
    #[serde(alias = "yes")]
    Allow,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SuggestionSettings {
    /// Maximum number of suggestions shown (1..=10).
    pub limit: usize,
    /// Minimum total score (0..=100) a candidate needs.
    pub min_score: u8,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            limit: 10,
            min_score: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Interval between position ticks (milliseconds). Each tick counts as
    /// one second of playback.
    pub tick_ms: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self { tick_ms: 1000 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
    /// How far (terminal cells) the pointer must travel before a press
    /// becomes a drag.
    pub drag_threshold: u16,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            scrub_seconds: 5,
            drag_threshold: crate::app::DRAG_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ build the set, keep the wheel turning ~ ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Pre-filled destination for the export prompt.
    pub default_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset, e.g. `info` or `setwheel=debug`.
    pub level: String,
    /// Log file. Defaults to `$XDG_STATE_HOME/setwheel/setwheel.log`.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
