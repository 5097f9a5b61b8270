//! Explicit voter sessions.
//!
//! A session is created at login, carries who the voter is and whether their
//! face has been verified, and is destroyed at logout. Everything that acts on
//! behalf of a voter receives the session rather than looking identity up
//! from ambient storage.

use crate::error::IdentityError;
use campus_types::{SubjectId, Timestamp, VoterEmail};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Student,
    Admin,
}

/// The signed-in voter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub voter: VoterEmail,
    pub subject: SubjectId,
    pub role: Role,
    pub face_verified: bool,
    pub started_at: Timestamp,
}

impl SessionContext {
    /// A student who has passed face verification may vote.
    pub fn can_vote(&self) -> bool {
        self.role == Role::Student && self.face_verified
    }
}

/// Holds at most one active session.
#[derive(Debug, Default)]
pub struct SessionManager {
    current: Option<SessionContext>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(
        &mut self,
        voter: VoterEmail,
        subject: SubjectId,
        role: Role,
        now: Timestamp,
    ) -> Result<&SessionContext, IdentityError> {
        if !voter.is_valid() {
            return Err(IdentityError::InvalidEmail(voter.to_string()));
        }
        if let Some(active) = &self.current {
            return Err(IdentityError::AlreadyLoggedIn(active.voter.to_string()));
        }
        info!(%voter, ?role, "session started");
        Ok(self.current.insert(SessionContext {
            voter,
            subject,
            role,
            face_verified: false,
            started_at: now,
        }))
    }

    /// End the session, returning it. No-op when nobody is signed in.
    pub fn logout(&mut self) -> Option<SessionContext> {
        let ended = self.current.take();
        if let Some(session) = &ended {
            info!(voter = %session.voter, "session ended");
        }
        ended
    }

    pub fn current(&self) -> Option<&SessionContext> {
        self.current.as_ref()
    }

    pub fn mark_face_verified(&mut self) -> Result<(), IdentityError> {
        let session = self.current.as_mut().ok_or(IdentityError::NotLoggedIn)?;
        session.face_verified = true;
        Ok(())
    }
}
