//! Pluggable face and challenge detection.
//!
//! The portal needs *some* computer-vision capability to decide whether a
//! face is in frame and whether the requested motion happened. This trait is
//! that seam: a face-landmark model, a managed recognition service, or a
//! scripted double in tests.

use crate::camera::Frame;
use crate::challenge::ChallengeKind;

pub trait ChallengeDetector {
    /// Whether a live face is currently in frame.
    ///
    /// `frame` is `None` when the camera had no frame ready.
    fn face_present(&mut self, frame: Option<&Frame>) -> bool;

    /// Whether the subject performed `kind` during the countdown that just ended.
    fn challenge_passed(&mut self, kind: ChallengeKind, frame: Option<&Frame>) -> bool;
}

impl<D: ChallengeDetector + ?Sized> ChallengeDetector for Box<D> {
    fn face_present(&mut self, frame: Option<&Frame>) -> bool {
        (**self).face_present(frame)
    }

    fn challenge_passed(&mut self, kind: ChallengeKind, frame: Option<&Frame>) -> bool {
        (**self).challenge_passed(kind, frame)
    }
}
