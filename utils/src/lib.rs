//! Shared utilities for the campus voting portal.

pub mod logging;
pub mod time;

pub use logging::init_tracing;
pub use time::format_countdown;
