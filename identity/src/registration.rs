//! Face registration flow: idle → camera active → registering → success | error.

use crate::error::IdentityError;
use crate::service::{FaceReference, IdentityService};
use campus_liveness::{CameraCapture, Frame};
use campus_types::{PortalParams, SubjectId};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistrationStatus {
    Idle,
    CameraActive,
    /// A frame has been captured and handed to the identity service.
    Registering,
    Success,
    Error,
}

impl RegistrationStatus {
    fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CameraActive => "camera active",
            Self::Registering => "registering",
            Self::Success => "registered",
            Self::Error => "in error",
        }
    }
}

/// Registers a subject's reference face.
///
/// Registration is split into [`begin`](Self::begin), which captures the frame,
/// and [`finish`](Self::finish), which records the service's answer, so a
/// caller talking to a remote service can keep the UI in `Registering` while
/// the request is in flight. [`register`](Self::register) does both.
pub struct FaceRegistration<C: CameraCapture> {
    camera: C,
    subject: SubjectId,
    stream: Option<C::Stream>,
    status: RegistrationStatus,
    require_liveness: bool,
    liveness_passed: bool,
    reference: Option<FaceReference>,
    error: Option<IdentityError>,
}

impl<C: CameraCapture> FaceRegistration<C> {
    pub fn new(camera: C, subject: SubjectId, params: &PortalParams) -> Self {
        Self {
            camera,
            subject,
            stream: None,
            status: RegistrationStatus::Idle,
            require_liveness: params.require_liveness,
            liveness_passed: !params.require_liveness,
            reference: None,
            error: None,
        }
    }

    pub fn start_camera(&mut self) -> Result<(), IdentityError> {
        match self.status {
            RegistrationStatus::Idle | RegistrationStatus::Error => {}
            other => {
                return Err(IdentityError::InvalidTransition {
                    action: "start the camera",
                    state: other.label(),
                })
            }
        }
        match self.camera.acquire_stream() {
            Ok(stream) => {
                self.stream = Some(stream);
                self.status = RegistrationStatus::CameraActive;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                let err = IdentityError::Camera(e);
                self.status = RegistrationStatus::Error;
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub fn stop_camera(&mut self) {
        if let Some(stream) = self.stream.take() {
            self.camera.release_stream(stream);
        }
        if self.status == RegistrationStatus::CameraActive {
            self.status = RegistrationStatus::Idle;
        }
    }

    pub fn record_liveness(&mut self, passed: bool) {
        if self.require_liveness {
            self.liveness_passed = passed;
        }
    }

    /// Capture the frame to register and move to `Registering`.
    pub fn begin(&mut self) -> Result<Frame, IdentityError> {
        if self.status != RegistrationStatus::CameraActive {
            return Err(IdentityError::InvalidTransition {
                action: "register",
                state: self.status.label(),
            });
        }
        if !self.liveness_passed {
            return Err(IdentityError::LivenessRequired);
        }
        let stream = self.stream.as_ref().ok_or(IdentityError::CameraInactive)?;
        let frame = self
            .camera
            .capture_frame(stream)
            .ok_or(IdentityError::NoFrame)?;
        self.status = RegistrationStatus::Registering;
        Ok(frame)
    }

    /// Record the service's answer to the request started by [`begin`](Self::begin).
    pub fn finish(
        &mut self,
        result: Result<FaceReference, IdentityError>,
    ) -> Result<FaceReference, IdentityError> {
        if self.status != RegistrationStatus::Registering {
            return Err(IdentityError::InvalidTransition {
                action: "finish registration",
                state: self.status.label(),
            });
        }
        match result {
            Ok(reference) => {
                info!(subject = %self.subject, reference = %reference.reference_id, "face registered");
                self.status = RegistrationStatus::Success;
                self.reference = Some(reference.clone());
                self.error = None;
                if let Some(stream) = self.stream.take() {
                    self.camera.release_stream(stream);
                }
                Ok(reference)
            }
            Err(e) => {
                warn!(subject = %self.subject, error = %e, "face registration failed");
                self.status = RegistrationStatus::CameraActive;
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Capture and register in one step.
    pub fn register<S: IdentityService + ?Sized>(
        &mut self,
        service: &S,
    ) -> Result<FaceReference, IdentityError> {
        let frame = self.begin()?;
        let result = service.register_face(&self.subject, &frame);
        self.finish(result)
    }

    pub fn status(&self) -> RegistrationStatus {
        self.status
    }

    pub fn reference(&self) -> Option<&FaceReference> {
        self.reference.as_ref()
    }

    /// The most recent failure, for display.
    pub fn error(&self) -> Option<&IdentityError> {
        self.error.as_ref()
    }
}

impl<C: CameraCapture> Drop for FaceRegistration<C> {
    fn drop(&mut self) {
        if let Some(stream) = self.stream.take() {
            self.camera.release_stream(stream);
        }
    }
}
