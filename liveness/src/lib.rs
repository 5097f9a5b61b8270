//! Liveness detection for the student portal.
//!
//! A session draws a random subset of motion/expression challenges (blink, turn
//! left, turn right, smile, nod), runs a countdown for each against the live
//! camera feed, and reports a single verified/failed verdict once every
//! challenge has been completed.
//!
//! The engine owns the *protocol* only: sequencing, countdowns, retries,
//! progress, and the camera stream's lifetime. Whether a face is in frame and
//! whether a challenge was performed is decided by a pluggable
//! [`ChallengeDetector`]; frames come from a [`CameraCapture`] collaborator.
//!
//! The engine is single-threaded and timer driven: callers feed it the current
//! time through [`LivenessEngine::advance`], and every pending timer is tracked
//! so teardown leaves nothing behind.

pub mod camera;
pub mod challenge;
pub mod detector;
pub mod engine;
pub mod error;
pub mod state;
pub mod timer;

pub use camera::{CameraCapture, Frame};
pub use challenge::{select_challenges, Challenge, ChallengeKind};
pub use detector::ChallengeDetector;
pub use engine::LivenessEngine;
pub use error::{CameraAccessError, LivenessError};
pub use state::{LivenessEvent, LivenessStatus};
pub use timer::{TimerId, TimerQueue};
