//! Liveness session status and the events the engine emits.

use crate::challenge::ChallengeKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a liveness session is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LivenessStatus {
    /// No camera, no timers.
    Idle,
    /// Camera open, waiting for a face to appear.
    Capturing,
    /// Running the countdown for the current challenge.
    ChallengeActive,
    /// All challenges done; camera released; verdict pending.
    Processing,
    /// Terminal: every challenge was completed.
    Verified,
    /// Camera failure, retry cap reached, or explicit abort.
    Failed,
}

impl LivenessStatus {
    /// Whether the session currently owns the camera or pending timers.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Capturing | Self::ChallengeActive | Self::Processing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Verified | Self::Failed)
    }
}

impl fmt::Display for LivenessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Capturing => "capturing",
            Self::ChallengeActive => "challenge-active",
            Self::Processing => "processing",
            Self::Verified => "verified",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Observable changes, drained by the caller to drive its view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum LivenessEvent {
    CameraStarted,
    /// Camera could not be opened; carries the user-facing message.
    CameraFailed(String),
    /// Face entered (`true`) or left (`false`) the frame.
    FaceDetected(bool),
    ChallengeStarted { index: usize, kind: ChallengeKind },
    CountdownTick { remaining: u32 },
    /// The detector did not confirm the challenge; it will be retried.
    ChallengeFailed { index: usize, attempt: u32 },
    ChallengeCompleted { index: usize },
    /// Completion percentage after a challenge completed.
    Progress(f64),
    Processing,
    /// Final verdict. Emitted at most once per session.
    Verified(bool),
    /// The caller skipped liveness; no verdict follows.
    Skipped,
}
