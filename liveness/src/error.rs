use crate::state::LivenessStatus;
use campus_types::ParamsError;
use thiserror::Error;

/// Why the camera could not be opened.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CameraAccessError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no camera device available")]
    NoDevice,

    #[error("camera unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum LivenessError {
    #[error("could not access camera: {0}")]
    CameraAccess(#[from] CameraAccessError),

    #[error("skipping liveness detection is disabled")]
    SkipDisabled,

    #[error("liveness session is {0}, not capturing or running challenges")]
    NotActive(LivenessStatus),

    #[error("invalid liveness parameters: {0}")]
    InvalidParams(#[from] ParamsError),
}
