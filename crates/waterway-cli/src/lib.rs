//! Waterway CLI library.
//!
//! Output rendering, terminal styling and logging setup shared by the
//! `waterway-cli` binary and its tests.

pub mod logging;
pub mod output;
pub mod terminal;
