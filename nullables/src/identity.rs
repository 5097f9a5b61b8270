//! Nullable identity service: in-memory face registry with fixed similarity.

use campus_identity::{FaceMatch, FaceReference, IdentityError, IdentityService};
use campus_liveness::Frame;
use campus_types::SubjectId;
use std::collections::HashMap;
use std::sync::Mutex;

/// Matches any frame against a registered subject with a configured similarity.
///
/// Thread-safe so it can sit behind `Arc` like a real service client.
pub struct NullIdentity {
    registered: Mutex<HashMap<SubjectId, f64>>,
    default_similarity: f64,
    unavailable: Mutex<bool>,
}

impl NullIdentity {
    pub fn new(default_similarity: f64) -> Self {
        Self {
            registered: Mutex::new(HashMap::new()),
            default_similarity,
            unavailable: Mutex::new(false),
        }
    }

    /// Pre-register `subject`; later matches report `similarity`.
    pub fn with_subject(self, subject: SubjectId, similarity: f64) -> Self {
        self.registered.lock().unwrap().insert(subject, similarity);
        self
    }

    /// Make every call fail as if the service were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        *self.unavailable.lock().unwrap() = unavailable;
    }

    pub fn is_registered(&self, subject: &SubjectId) -> bool {
        self.registered.lock().unwrap().contains_key(subject)
    }

    fn check_available(&self) -> Result<(), IdentityError> {
        if *self.unavailable.lock().unwrap() {
            return Err(IdentityError::Service("identity service unavailable".into()));
        }
        Ok(())
    }
}

impl Default for NullIdentity {
    fn default() -> Self {
        Self::new(99.0)
    }
}

impl IdentityService for NullIdentity {
    fn verify_face(&self, subject: &SubjectId, image: &Frame) -> Result<FaceMatch, IdentityError> {
        self.check_available()?;
        if image.is_empty() {
            return Ok(FaceMatch {
                verified: false,
                similarity: 0.0,
            });
        }
        let registered = self.registered.lock().unwrap();
        let similarity = *registered
            .get(subject)
            .ok_or_else(|| IdentityError::NotRegistered(subject.clone()))?;
        Ok(FaceMatch {
            verified: similarity > 0.0,
            similarity,
        })
    }

    fn register_face(
        &self,
        subject: &SubjectId,
        _image: &Frame,
    ) -> Result<FaceReference, IdentityError> {
        self.check_available()?;
        self.registered
            .lock()
            .unwrap()
            .insert(subject.clone(), self.default_similarity);
        Ok(FaceReference {
            reference_id: format!("null-face-{subject}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::new(1, 1, vec![1])
    }

    #[test]
    fn register_then_verify() {
        let service = NullIdentity::new(91.0);
        let subject = SubjectId::new("S1");
        assert_eq!(
            service.verify_face(&subject, &frame()),
            Err(IdentityError::NotRegistered(subject.clone()))
        );
        service.register_face(&subject, &frame()).unwrap();
        assert_eq!(
            service.verify_face(&subject, &frame()),
            Ok(FaceMatch {
                verified: true,
                similarity: 91.0
            })
        );
    }

    #[test]
    fn unavailable_service() {
        let service = NullIdentity::default();
        service.set_unavailable(true);
        assert!(matches!(
            service.register_face(&SubjectId::new("S1"), &frame()),
            Err(IdentityError::Service(_))
        ));
    }
}
