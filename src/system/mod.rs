//! Process-level plumbing: logging setup and shutdown signals

pub mod logging;
pub mod signal;
