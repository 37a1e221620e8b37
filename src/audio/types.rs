//! Small playback types shared by the transport and the UI.

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// What a seek request actually did.
///
/// The player cannot reposition audio, so only the tracked position moves.
/// Callers should tell the user the audio itself did not jump.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SeekOutcome {
    DisplayOnly { position_secs: u64 },
}
