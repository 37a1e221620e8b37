//! The curated set: an ordered list of tracks with dense 1-based positions.

mod set;

pub use set::*;
