//! Track library: discovering audio files, analyzing them and holding the
//! resulting catalog.
//!
//! The catalog is built on a worker thread (`worker`) and handed over in one
//! piece once every discovered file has been analyzed.

mod analyze;
mod detect;
mod model;
mod scan;
mod worker;

pub use analyze::*;
pub use model::*;
pub use scan::*;
pub use worker::*;
