use campus_liveness::CameraAccessError;
use campus_types::SubjectId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum IdentityError {
    #[error("liveness verification must pass before face matching")]
    LivenessRequired,

    #[error("camera is not active")]
    CameraInactive,

    #[error("camera produced no frame")]
    NoFrame,

    #[error("failed to access camera: {0}")]
    Camera(#[from] CameraAccessError),

    #[error("face verification failed (similarity {similarity:.2}%), please try again")]
    NoMatch { similarity: f64 },

    #[error("no face registered for {0}")]
    NotRegistered(SubjectId),

    #[error("identity service error: {0}")]
    Service(String),

    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("a session is already active for {0}")]
    AlreadyLoggedIn(String),

    #[error("no active session")]
    NotLoggedIn,
}
