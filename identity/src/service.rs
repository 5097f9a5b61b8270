//! The identity service seam.

use crate::error::IdentityError;
use campus_liveness::Frame;
use campus_types::SubjectId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result of matching a captured face against a subject's registered face.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceMatch {
    pub verified: bool,
    /// Similarity in percent, as reported by the service.
    pub similarity: f64,
}

/// Handle to a registered reference face.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceReference {
    pub reference_id: String,
}

/// Face registration and matching.
///
/// The portal only needs this capability surface, not any particular backend.
pub trait IdentityService: Send + Sync {
    fn verify_face(&self, subject: &SubjectId, image: &Frame) -> Result<FaceMatch, IdentityError>;

    fn register_face(
        &self,
        subject: &SubjectId,
        image: &Frame,
    ) -> Result<FaceReference, IdentityError>;
}

impl<S: IdentityService + ?Sized> IdentityService for &S {
    fn verify_face(&self, subject: &SubjectId, image: &Frame) -> Result<FaceMatch, IdentityError> {
        (**self).verify_face(subject, image)
    }

    fn register_face(
        &self,
        subject: &SubjectId,
        image: &Frame,
    ) -> Result<FaceReference, IdentityError> {
        (**self).register_face(subject, image)
    }
}

impl<S: IdentityService + ?Sized> IdentityService for Arc<S> {
    fn verify_face(&self, subject: &SubjectId, image: &Frame) -> Result<FaceMatch, IdentityError> {
        (**self).verify_face(subject, image)
    }

    fn register_face(
        &self,
        subject: &SubjectId,
        image: &Frame,
    ) -> Result<FaceReference, IdentityError> {
        (**self).register_face(subject, image)
    }
}
