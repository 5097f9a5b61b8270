//! The student dashboard: elections, ballots and results for the signed-in voter.

use crate::error::PortalError;
use campus_ballot::{standings, Election, PositionStanding, Roster, Vote, VoteGuard};
use campus_identity::{FaceVerifier, IdentityService, Role, SessionContext, SessionManager};
use campus_liveness::CameraCapture;
use campus_types::{CandidateId, ElectionId, SubjectId, Timestamp, VoteId, VoterEmail};
use tracing::{info, warn};

/// Every ballot action goes through the current session. Votes are bound to
/// the session's voter, and only a student whose face has been verified in
/// this session may cast or revoke them.
#[derive(Debug, Default)]
pub struct StudentDashboard {
    roster: Roster,
    votes: VoteGuard,
    sessions: SessionManager,
}

impl StudentDashboard {
    pub fn new(roster: Roster) -> Self {
        Self {
            roster,
            votes: VoteGuard::new(),
            sessions: SessionManager::new(),
        }
    }

    // ── Session ─────────────────────────────────────────────────────────

    pub fn login(
        &mut self,
        voter: VoterEmail,
        subject: SubjectId,
        role: Role,
        now: Timestamp,
    ) -> Result<SessionContext, PortalError> {
        Ok(self.sessions.login(voter, subject, role, now)?.clone())
    }

    pub fn logout(&mut self) -> Option<SessionContext> {
        self.sessions.logout()
    }

    pub fn session(&self) -> Option<&SessionContext> {
        self.sessions.current()
    }

    /// Mark the session face-verified once `verifier` has matched the
    /// signed-in subject.
    pub fn record_face_verification<C, S>(
        &mut self,
        verifier: &FaceVerifier<C, S>,
    ) -> Result<(), PortalError>
    where
        C: CameraCapture,
        S: IdentityService,
    {
        let session = self.sessions.current().ok_or(PortalError::NoSession)?;
        if !verifier.is_verified() || verifier.subject() != &session.subject {
            warn!(voter = %session.voter, subject = %verifier.subject(), "face verification not accepted");
            return Err(PortalError::FaceNotVerified(session.voter.to_string()));
        }
        info!(voter = %session.voter, "face verified for session");
        self.sessions.mark_face_verified()?;
        Ok(())
    }

    // ── Ballot ──────────────────────────────────────────────────────────

    /// Elections currently accepting votes.
    pub fn open_elections(&self, now: Timestamp) -> Vec<&Election> {
        self.roster
            .elections()
            .filter(|e| e.accepts_votes(now))
            .collect()
    }

    pub fn cast_vote(
        &mut self,
        election: ElectionId,
        candidate: CandidateId,
        now: Timestamp,
    ) -> Result<Vote, PortalError> {
        let voter = self.eligible_voter()?;
        Ok(self
            .votes
            .cast_vote(&self.roster, &voter, election, candidate, now)?)
    }

    /// Revoke one of the signed-in voter's own votes while its election is
    /// still open. Unknown ids are a no-op.
    pub fn revoke_vote(
        &mut self,
        vote: VoteId,
        now: Timestamp,
    ) -> Result<Option<Vote>, PortalError> {
        let voter = self.eligible_voter()?;
        Ok(self.votes.revoke_own_vote(&self.roster, &voter, vote, now)?)
    }

    /// The signed-in voter's votes in `election`.
    pub fn my_votes(&self, election: ElectionId) -> Result<Vec<&Vote>, PortalError> {
        let session = self.sessions.current().ok_or(PortalError::NoSession)?;
        Ok(self.votes.votes_by(&session.voter, election))
    }

    /// The signed-in voter's current vote for `position`, if any.
    pub fn my_choice(
        &self,
        election: ElectionId,
        position: &str,
    ) -> Result<Option<&Vote>, PortalError> {
        let session = self.sessions.current().ok_or(PortalError::NoSession)?;
        Ok(self
            .votes
            .voter_choice(&self.roster, &session.voter, election, position))
    }

    // ── Results ─────────────────────────────────────────────────────────

    pub fn standings(&self, election: ElectionId) -> Result<Vec<PositionStanding>, PortalError> {
        Ok(standings(&self.roster, self.votes.votes(), election)?)
    }

    pub fn vote_count(&self, election: ElectionId, candidate: CandidateId) -> u32 {
        self.votes.tally(election, candidate)
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Administrative access to elections and candidates.
    pub fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }

    pub fn votes(&self) -> &VoteGuard {
        &self.votes
    }

    fn eligible_voter(&self) -> Result<VoterEmail, PortalError> {
        let session = self.sessions.current().ok_or(PortalError::NoSession)?;
        if session.role != Role::Student {
            return Err(PortalError::NotStudent);
        }
        if !session.can_vote() {
            return Err(PortalError::FaceNotVerified(session.voter.to_string()));
        }
        Ok(session.voter.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_ballot::{BallotError, Candidate, CandidateStatus, ElectionStatus};

    const E1: ElectionId = ElectionId::new(1);
    const A: CandidateId = CandidateId::new(100);
    const B: CandidateId = CandidateId::new(101);

    fn now() -> Timestamp {
        Timestamp::new(5_000)
    }

    fn dashboard() -> StudentDashboard {
        let mut roster = Roster::new();
        roster
            .add_election(Election {
                id: E1,
                title: "Student Guild Elections 2025".into(),
                description: String::new(),
                status: ElectionStatus::Ongoing,
                positions: vec!["President".into()],
                starts_at: Timestamp::EPOCH,
                ends_at: Timestamp::new(1_000_000),
            })
            .unwrap();
        for id in [A, B] {
            roster
                .add_candidate(Candidate {
                    id,
                    name: format!("Candidate {id}"),
                    position: "President".into(),
                    election_id: E1,
                    status: CandidateStatus::Approved,
                })
                .unwrap();
        }
        StudentDashboard::new(roster)
    }

    fn login(dash: &mut StudentDashboard, role: Role) {
        dash.login(
            VoterEmail::new("student@college.edu"),
            SubjectId::new("S1"),
            role,
            now(),
        )
        .unwrap();
    }

    #[test]
    fn voting_requires_a_session() {
        let mut dash = dashboard();
        assert!(matches!(
            dash.cast_vote(E1, A, now()),
            Err(PortalError::NoSession)
        ));
        assert!(matches!(dash.my_votes(E1), Err(PortalError::NoSession)));
    }

    #[test]
    fn voting_requires_face_verification() {
        let mut dash = dashboard();
        login(&mut dash, Role::Student);
        assert!(matches!(
            dash.cast_vote(E1, A, now()),
            Err(PortalError::FaceNotVerified(_))
        ));
        assert!(dash.votes().is_empty());
    }

    #[test]
    fn admins_cannot_vote() {
        let mut dash = dashboard();
        login(&mut dash, Role::Admin);
        dash.sessions.mark_face_verified().unwrap();
        assert!(matches!(
            dash.cast_vote(E1, A, now()),
            Err(PortalError::NotStudent)
        ));
    }

    #[test]
    fn verified_student_votes_once_per_position() {
        let mut dash = dashboard();
        login(&mut dash, Role::Student);
        dash.sessions.mark_face_verified().unwrap();

        let vote = dash.cast_vote(E1, A, now()).unwrap();
        assert_eq!(vote.voter.as_str(), "student@college.edu");
        assert!(matches!(
            dash.cast_vote(E1, B, now()),
            Err(PortalError::Ballot(BallotError::DuplicateVote { .. }))
        ));
        assert_eq!(
            dash.my_choice(E1, "President").unwrap().map(|v| v.candidate_id),
            Some(A)
        );

        assert_eq!(dash.revoke_vote(vote.id, now()).unwrap(), Some(vote));
        dash.cast_vote(E1, B, now()).unwrap();
        assert_eq!(dash.vote_count(E1, B), 1);
        assert_eq!(dash.vote_count(E1, A), 0);
    }

    #[test]
    fn unvote_rejected_after_election_closes() {
        let mut dash = dashboard();
        login(&mut dash, Role::Student);
        dash.sessions.mark_face_verified().unwrap();
        let vote = dash.cast_vote(E1, A, now()).unwrap();

        dash.roster_mut()
            .set_election_status(E1, ElectionStatus::Completed)
            .unwrap();
        assert!(matches!(
            dash.revoke_vote(vote.id, now()),
            Err(PortalError::Ballot(BallotError::ElectionClosed(E1)))
        ));
        assert_eq!(dash.vote_count(E1, A), 1);
    }

    #[test]
    fn unvote_rejected_after_voting_window_ends() {
        let mut dash = dashboard();
        login(&mut dash, Role::Student);
        dash.sessions.mark_face_verified().unwrap();
        let vote = dash.cast_vote(E1, A, now()).unwrap();

        assert!(matches!(
            dash.revoke_vote(vote.id, Timestamp::new(1_000_000)),
            Err(PortalError::Ballot(BallotError::ElectionClosed(E1)))
        ));
        assert_eq!(dash.votes().len(), 1);
    }

    #[test]
    fn logout_keeps_votes_and_requires_new_verification() {
        let mut dash = dashboard();
        login(&mut dash, Role::Student);
        dash.sessions.mark_face_verified().unwrap();
        dash.cast_vote(E1, A, now()).unwrap();

        let ended = dash.logout().unwrap();
        assert!(ended.face_verified);
        assert_eq!(dash.votes().len(), 1);

        login(&mut dash, Role::Student);
        assert!(matches!(
            dash.revoke_vote(VoteId::new(5_000), now()),
            Err(PortalError::FaceNotVerified(_))
        ));
    }

    #[test]
    fn open_elections_filters_by_window_and_status() {
        let mut dash = dashboard();
        assert_eq!(dash.open_elections(now()).len(), 1);
        assert!(dash.open_elections(Timestamp::new(2_000_000)).is_empty());
        dash.roster_mut()
            .set_election_status(E1, ElectionStatus::Completed)
            .unwrap();
        assert!(dash.open_elections(now()).is_empty());
    }
}
