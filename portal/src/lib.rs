//! The student voting portal core.
//!
//! Ties the engines together: a [`PortalConfig`] loaded from TOML, structured
//! logging, and the [`StudentDashboard`], which only lets a signed-in,
//! face-verified student touch the ballot.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;

pub use config::PortalConfig;
pub use dashboard::StudentDashboard;
pub use error::PortalError;
pub use logging::{init_logging, LogFormat};
