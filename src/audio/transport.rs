use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::error::PlaybackError;
use crate::library::Track;

use super::clock::{PlaybackClock, Tick};
use super::player::MediaPlayer;
use super::types::{PlaybackState, SeekOutcome};

/// Drives a [`MediaPlayer`] and keeps the approximate position for the
/// now-playing track.
///
/// Every path that leaves `Playing` (pause, stop, switching tracks, a failed
/// load, reaching the end) cancels the pending clock tick.
pub struct Transport {
    player: Box<dyn MediaPlayer>,
    clock: PlaybackClock,
    state: PlaybackState,
    now_playing: Option<Track>,
}

impl Transport {
    pub fn new(player: Box<dyn MediaPlayer>, tick: Duration) -> Self {
        Self {
            player,
            clock: PlaybackClock::new(tick),
            state: PlaybackState::Stopped,
            now_playing: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn now_playing(&self) -> Option<&Track> {
        self.now_playing.as_ref()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.clock.elapsed_secs()
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// The player contract has no seek.
    pub fn supports_seek(&self) -> bool {
        false
    }

    /// Load and start `track` from the beginning.
    pub fn play_track(&mut self, track: &Track, now: Instant) -> Result<(), PlaybackError> {
        self.clock.cancel();
        let started = self
            .player
            .load(&track.path)
            .and_then(|_| self.player.play());

        match started {
            Ok(()) => {
                info!(track = %track.display_name, "playing");
                self.state = PlaybackState::Playing;
                self.now_playing = Some(track.clone());
                self.clock
                    .start(now, track.duration_secs.map(|d| d as u64));
                Ok(())
            }
            Err(e) => {
                warn!(track = %track.display_name, error = %e, "playback failed");
                self.stop();
                Err(e)
            }
        }
    }

    /// Pause when playing, resume when paused. Does nothing when stopped.
    pub fn toggle_pause(&mut self, now: Instant) -> PlaybackState {
        match self.state {
            PlaybackState::Playing => {
                self.player.pause();
                self.clock.cancel();
                self.state = PlaybackState::Paused;
            }
            PlaybackState::Paused => {
                self.player.unpause();
                self.clock.resume(now);
                self.state = PlaybackState::Playing;
            }
            PlaybackState::Stopped => {}
        }
        self.state
    }

    pub fn stop(&mut self) {
        self.player.stop();
        self.clock.reset();
        self.state = PlaybackState::Stopped;
        self.now_playing = None;
    }

    /// Advance the clock. Returns true when anything visible changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }
        match self.clock.poll(now, self.player.is_busy()) {
            Tick::Idle => false,
            Tick::Advanced(_) => true,
            Tick::Finished => {
                info!("playback finished");
                self.stop();
                true
            }
        }
    }

    /// Move the tracked position by `delta` seconds. Only the displayed
    /// position changes; `None` when nothing is loaded.
    pub fn scrub(&mut self, delta: i64) -> Option<SeekOutcome> {
        let target = self.clock.elapsed_secs().saturating_add_signed(delta);
        self.seek_to(target)
    }

    /// Set the tracked position to `secs`, clamped to the known duration.
    /// Display-only like [`Transport::scrub`].
    pub fn seek_to(&mut self, secs: u64) -> Option<SeekOutcome> {
        if self.state == PlaybackState::Stopped {
            return None;
        }
        let position_secs = self.clock.set_position(secs);
        Some(SeekOutcome::DisplayOnly { position_secs })
    }
}
