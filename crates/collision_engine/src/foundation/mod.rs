//! Foundation module
//!
//! Vector aliases and scalar helpers used by the volume math, plus the
//! logger setup shared by the engine and its host applications.

pub mod logging;
pub mod math;
