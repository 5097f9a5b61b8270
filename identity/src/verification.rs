//! Face verification flow: camera on, liveness passed, capture, match.

use crate::error::IdentityError;
use crate::service::{FaceMatch, IdentityService};
use campus_liveness::CameraCapture;
use campus_types::{PortalParams, SubjectId};
use tracing::{info, warn};

/// Verifies that the person at the camera is `subject`.
///
/// When liveness is required, matching is refused until a passed liveness
/// verdict has been recorded with [`FaceVerifier::record_liveness`]. The
/// camera is released after a successful match, on `stop_camera`, and on drop.
pub struct FaceVerifier<C: CameraCapture, S: IdentityService> {
    camera: C,
    service: S,
    subject: SubjectId,
    stream: Option<C::Stream>,
    require_liveness: bool,
    min_similarity: f64,
    liveness_passed: bool,
    similarity: Option<f64>,
    verified: bool,
}

impl<C: CameraCapture, S: IdentityService> FaceVerifier<C, S> {
    pub fn new(camera: C, service: S, subject: SubjectId, params: &PortalParams) -> Self {
        Self {
            camera,
            service,
            subject,
            stream: None,
            require_liveness: params.require_liveness,
            min_similarity: params.min_face_similarity,
            liveness_passed: !params.require_liveness,
            similarity: None,
            verified: false,
        }
    }

    pub fn start_camera(&mut self) -> Result<(), IdentityError> {
        if self.stream.is_some() {
            return Ok(());
        }
        let stream = self.camera.acquire_stream().map_err(|e| {
            warn!(subject = %self.subject, error = %e, "failed to access camera");
            IdentityError::Camera(e)
        })?;
        self.stream = Some(stream);
        Ok(())
    }

    pub fn stop_camera(&mut self) {
        if let Some(stream) = self.stream.take() {
            self.camera.release_stream(stream);
        }
    }

    /// Record the verdict of the liveness session run for this subject.
    pub fn record_liveness(&mut self, passed: bool) {
        if self.require_liveness {
            self.liveness_passed = passed;
        }
    }

    /// Capture a frame and match it against the subject's registered face.
    pub fn verify(&mut self) -> Result<FaceMatch, IdentityError> {
        if !self.liveness_passed {
            return Err(IdentityError::LivenessRequired);
        }
        let stream = self.stream.as_ref().ok_or(IdentityError::CameraInactive)?;
        let frame = self
            .camera
            .capture_frame(stream)
            .ok_or(IdentityError::NoFrame)?;

        self.similarity = None;
        let result = self.service.verify_face(&self.subject, &frame)?;

        if result.verified && result.similarity >= self.min_similarity {
            info!(subject = %self.subject, similarity = result.similarity, "face verified");
            self.similarity = Some(result.similarity);
            self.verified = true;
            self.stop_camera();
            Ok(result)
        } else {
            warn!(subject = %self.subject, similarity = result.similarity, "face did not match");
            Err(IdentityError::NoMatch {
                similarity: result.similarity,
            })
        }
    }

    pub fn is_camera_active(&self) -> bool {
        self.stream.is_some()
    }

    pub fn liveness_passed(&self) -> bool {
        self.liveness_passed
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// Similarity of the last successful match.
    pub fn similarity(&self) -> Option<f64> {
        self.similarity
    }

    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }
}

impl<C: CameraCapture, S: IdentityService> Drop for FaceVerifier<C, S> {
    fn drop(&mut self) {
        self.stop_camera();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::FaceReference;
    use campus_liveness::{CameraAccessError, Frame};
    use std::cell::Cell;
    use std::rc::Rc;

    struct TestCamera {
        released: Rc<Cell<u32>>,
        deny: bool,
    }

    impl CameraCapture for TestCamera {
        type Stream = ();

        fn acquire_stream(&mut self) -> Result<(), CameraAccessError> {
            if self.deny {
                Err(CameraAccessError::NoDevice)
            } else {
                Ok(())
            }
        }

        fn release_stream(&mut self, _stream: ()) {
            self.released.set(self.released.get() + 1);
        }

        fn capture_frame(&mut self, _stream: &()) -> Option<Frame> {
            Some(Frame::new(640, 480, vec![1, 2, 3]))
        }
    }

    struct FixedService(FaceMatch);

    impl IdentityService for FixedService {
        fn verify_face(&self, _: &SubjectId, _: &Frame) -> Result<FaceMatch, IdentityError> {
            Ok(self.0)
        }

        fn register_face(&self, _: &SubjectId, _: &Frame) -> Result<FaceReference, IdentityError> {
            Ok(FaceReference {
                reference_id: "ref".into(),
            })
        }
    }

    fn verifier(
        m: FaceMatch,
        params: &PortalParams,
    ) -> (Rc<Cell<u32>>, FaceVerifier<TestCamera, FixedService>) {
        let released = Rc::new(Cell::new(0));
        let camera = TestCamera {
            released: released.clone(),
            deny: false,
        };
        let v = FaceVerifier::new(camera, FixedService(m), SubjectId::new("S100"), params);
        (released, v)
    }

    const GOOD: FaceMatch = FaceMatch {
        verified: true,
        similarity: 97.5,
    };

    #[test]
    fn liveness_gate() {
        let (_, mut v) = verifier(GOOD, &PortalParams::default());
        v.start_camera().unwrap();
        assert_eq!(v.verify(), Err(IdentityError::LivenessRequired));
        v.record_liveness(true);
        assert_eq!(v.verify(), Ok(GOOD));
        assert!(v.is_verified());
        assert_eq!(v.similarity(), Some(97.5));
    }

    #[test]
    fn liveness_not_required() {
        let params = PortalParams {
            require_liveness: false,
            ..PortalParams::default()
        };
        let (_, mut v) = verifier(GOOD, &params);
        v.start_camera().unwrap();
        assert!(v.verify().is_ok());
    }

    #[test]
    fn camera_must_be_on() {
        let (_, mut v) = verifier(GOOD, &PortalParams::default());
        v.record_liveness(true);
        assert_eq!(v.verify(), Err(IdentityError::CameraInactive));
    }

    #[test]
    fn success_releases_camera() {
        let (released, mut v) = verifier(GOOD, &PortalParams::default());
        v.start_camera().unwrap();
        v.record_liveness(true);
        v.verify().unwrap();
        assert!(!v.is_camera_active());
        drop(v);
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn low_similarity_rejected() {
        let weak = FaceMatch {
            verified: true,
            similarity: 42.0,
        };
        let (_, mut v) = verifier(weak, &PortalParams::default());
        v.start_camera().unwrap();
        v.record_liveness(true);
        assert_eq!(v.verify(), Err(IdentityError::NoMatch { similarity: 42.0 }));
        assert!(!v.is_verified());
        assert!(v.is_camera_active());
    }

    #[test]
    fn camera_denied() {
        let camera = TestCamera {
            released: Rc::new(Cell::new(0)),
            deny: true,
        };
        let mut v = FaceVerifier::new(
            camera,
            FixedService(GOOD),
            SubjectId::new("S100"),
            &PortalParams::default(),
        );
        assert_eq!(
            v.start_camera(),
            Err(IdentityError::Camera(CameraAccessError::NoDevice))
        );
    }
}
