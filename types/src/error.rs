//! Parameter validation errors shared across crates.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Error)]
pub enum ParamsError {
    #[error("challenge_count must be in 1..={max}, got {count}")]
    ChallengeCount { count: u32, max: u32 },

    #[error("countdown_ticks must be at least 1")]
    ZeroCountdown,

    #[error("{0} must be non-zero")]
    ZeroInterval(&'static str),

    #[error("max_challenge_attempts must be at least 1 when set")]
    ZeroAttemptCap,

    #[error("min_face_similarity must be a percentage, got {0}")]
    Similarity(f64),
}
