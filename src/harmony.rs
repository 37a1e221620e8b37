//! Harmonic and tempo compatibility.
//!
//! `wheel` maps key labels onto the Camelot wheel and `score` rates how well
//! two tracks mix based on their wheel codes and tempos.

mod score;
mod wheel;

pub use score::*;
pub use wheel::*;
