use std::time::{Duration, Instant};

/// The one scheduled tick, if any. Replacing or dropping it cancels it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct PendingTick {
    due: Instant,
}

/// Result of polling the clock.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tick {
    /// Nothing was due.
    Idle,
    /// A tick fired; the tracked position is now this many seconds.
    Advanced(u64),
    /// The sequence ended: the known duration was reached or the player
    /// went quiet. Nothing is scheduled any more.
    Finished,
}

/// Cooperative, single-threaded position counter.
///
/// Each due tick adds one second while the player is busy. The event loop
/// polls it; nothing here sleeps or spawns.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    cadence: Duration,
    pending: Option<PendingTick>,
    elapsed_secs: u64,
    duration_secs: Option<u64>,
}

impl PlaybackClock {
    pub fn new(cadence: Duration) -> Self {
        Self {
            cadence: cadence.max(Duration::from_millis(1)),
            pending: None,
            elapsed_secs: 0,
            duration_secs: None,
        }
    }

    /// Begin counting a new track from zero. Any pending tick is dropped first.
    pub fn start(&mut self, now: Instant, duration_secs: Option<u64>) {
        self.cancel();
        self.elapsed_secs = 0;
        self.duration_secs = duration_secs.filter(|&d| d > 0);
        self.schedule(now);
    }

    /// Continue counting from the current position.
    pub fn resume(&mut self, now: Instant) {
        self.cancel();
        self.schedule(now);
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Cancel and forget the position and duration.
    pub fn reset(&mut self) {
        self.cancel();
        self.elapsed_secs = 0;
        self.duration_secs = None;
    }

    pub fn is_scheduled(&self) -> bool {
        self.pending.is_some()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn duration_secs(&self) -> Option<u64> {
        self.duration_secs
    }

    /// Move the tracked position, clamped to the known duration.
    pub fn set_position(&mut self, secs: u64) -> u64 {
        self.elapsed_secs = match self.duration_secs {
            Some(d) => secs.min(d),
            None => secs,
        };
        self.elapsed_secs
    }

    /// Fire the pending tick if it is due.
    pub fn poll(&mut self, now: Instant, player_busy: bool) -> Tick {
        let Some(tick) = self.pending else {
            return Tick::Idle;
        };
        if now < tick.due {
            return Tick::Idle;
        }
        self.pending = None;

        if !player_busy {
            return Tick::Finished;
        }

        self.elapsed_secs += 1;
        if let Some(d) = self.duration_secs {
            if self.elapsed_secs >= d {
                return Tick::Finished;
            }
        }

        // Keep cadence relative to the schedule, but never queue a burst
        // after a stall.
        let next = tick.due + self.cadence;
        self.pending = Some(PendingTick {
            due: if next > now { next } else { now + self.cadence },
        });
        Tick::Advanced(self.elapsed_secs)
    }

    fn schedule(&mut self, now: Instant) {
        self.pending = Some(PendingTick {
            due: now + self.cadence,
        });
    }
}
