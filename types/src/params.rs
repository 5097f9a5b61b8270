//! Portal parameters: the tunable constants of the liveness engine and the
//! face verifier.

use crate::error::ParamsError;
use serde::{Deserialize, Serialize};

/// Tunable parameters shared by the portal engines.
///
/// Loaded from the `[params]` table of the portal config; any field left out
/// falls back to [`PortalParams::college_defaults`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalParams {
    // ── Liveness ─────────────────────────────────────────────────────────
    /// Number of challenges drawn per liveness session (1..=5).
    pub challenge_count: u32,

    /// Countdown ticks shown before each challenge is checked.
    pub countdown_ticks: u32,

    /// Length of one countdown tick in milliseconds.
    pub tick_ms: u64,

    /// Delay between the camera starting and the first face check.
    pub face_detection_delay_ms: u64,

    /// Interval of the background "is the face still in frame" poll.
    pub face_poll_interval_ms: u64,

    /// Pause between a completed challenge and the next one.
    pub challenge_pause_ms: u64,

    /// Delay spent in the processing state before the verdict is reported.
    pub processing_delay_ms: u64,

    /// Consecutive failures on one challenge before the session fails.
    /// `None` retries forever. TOML has no null, so `None` is omitted when
    /// serialized and reads back as the default `Some(5)`; unbounded retry
    /// can only be set in code.
    pub max_challenge_attempts: Option<u32>,

    /// Whether the caller may skip liveness entirely. Off by default since it
    /// bypasses the verification guarantee.
    pub allow_skip: bool,

    // ── Face verification ────────────────────────────────────────────────
    /// Minimum similarity (percent) the identity service must report.
    pub min_face_similarity: f64,

    /// Whether a passed liveness session is required before face matching.
    pub require_liveness: bool,
}

impl PortalParams {
    /// Size of the fixed challenge set.
    pub const MAX_CHALLENGES: u32 = 5;

    /// Defaults matching the behaviour of the student portal.
    pub fn college_defaults() -> Self {
        Self {
            challenge_count: 3,
            countdown_ticks: 5,
            tick_ms: 1000,
            face_detection_delay_ms: 1500,
            face_poll_interval_ms: 1000,
            challenge_pause_ms: 1000,
            processing_delay_ms: 1500,
            max_challenge_attempts: Some(5),
            allow_skip: false,

            min_face_similarity: 80.0,
            require_liveness: true,
        }
    }

    /// Reject parameter combinations the engines cannot run with.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.challenge_count == 0 || self.challenge_count > Self::MAX_CHALLENGES {
            return Err(ParamsError::ChallengeCount {
                count: self.challenge_count,
                max: Self::MAX_CHALLENGES,
            });
        }
        if self.countdown_ticks == 0 {
            return Err(ParamsError::ZeroCountdown);
        }
        if self.tick_ms == 0 {
            return Err(ParamsError::ZeroInterval("tick_ms"));
        }
        if self.face_poll_interval_ms == 0 {
            return Err(ParamsError::ZeroInterval("face_poll_interval_ms"));
        }
        if self.max_challenge_attempts == Some(0) {
            return Err(ParamsError::ZeroAttemptCap);
        }
        if !(0.0..=100.0).contains(&self.min_face_similarity) {
            return Err(ParamsError::Similarity(self.min_face_similarity));
        }
        Ok(())
    }
}

impl Default for PortalParams {
    fn default() -> Self {
        Self::college_defaults()
    }
}
