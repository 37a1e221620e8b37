//! Application state and the intents that change it.
//!
//! `App` (in `app::model`) owns the library, the set, the current
//! suggestions and the transport. The runtime turns input into `Intent`s and
//! pointer gestures; nothing else mutates the state.

mod drag;
mod intent;
mod model;

pub use drag::*;
pub use intent::*;
pub use model::*;

/// Cells the pointer must travel on either axis before a press becomes a drag.
pub const DRAG_THRESHOLD: u16 = 10;

#[cfg(test)]
mod tests;
