//! Nullable infrastructure for deterministic testing.
//!
//! Every external collaborator of the portal (clock, camera, face/challenge
//! detection, identity service) has a test-friendly implementation here that:
//! - Returns deterministic values
//! - Can be controlled programmatically
//! - Never touches a device or the network
//!
//! Usage: swap real implementations for nullables in tests and dry runs.

pub mod camera;
pub mod clock;
pub mod detector;
pub mod identity;

pub use camera::{NullCamera, NullStream};
pub use clock::NullClock;
pub use detector::ScriptedDetector;
pub use identity::NullIdentity;
