//! Playback: the media player seam, a coarse position clock and the
//! transport that ties them to the now-playing track.
//!
//! The player has no seek and reports no position. The clock approximates
//! elapsed time by counting one second per tick, so displayed positions are
//! accurate to about one tick.

mod clock;
mod player;
mod transport;
mod types;

pub use clock::*;
pub use player::*;
pub use transport::*;
pub use types::*;
