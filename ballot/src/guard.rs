//! Vote integrity guard: the single-active-vote-per-position rule.

use crate::error::BallotError;
use crate::reference::{CandidateStatus, ReferenceData};
use crate::tally;
use crate::vote::Vote;
use campus_types::{CandidateId, ElectionId, Timestamp, VoteId, VoterEmail};
use tracing::{info, warn};

/// The vote log for one dashboard session.
///
/// Invariant: for any `(election, voter, position)` at most one vote exists,
/// where `position` is the position of the vote's candidate.
#[derive(Clone, Debug, Default)]
pub struct VoteGuard {
    votes: Vec<Vote>,
    /// Last id handed out; ids are creation milliseconds bumped to stay unique.
    last_id: u64,
}

impl VoteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cast `voter`'s vote for `candidate_id` in `election_id`.
    ///
    /// Either the vote is appended or an error is returned; the log is never
    /// partially updated. Voting again for a position already voted on fails
    /// with [`BallotError::DuplicateVote`] until the existing vote is revoked.
    pub fn cast_vote<R: ReferenceData + ?Sized>(
        &mut self,
        refs: &R,
        voter: &VoterEmail,
        election_id: ElectionId,
        candidate_id: CandidateId,
        now: Timestamp,
    ) -> Result<Vote, BallotError> {
        let candidate = refs
            .candidate(candidate_id)
            .ok_or(BallotError::UnknownCandidate(candidate_id))?;
        if candidate.election_id != election_id {
            return Err(BallotError::CandidateNotInElection {
                candidate: candidate_id,
                election: election_id,
            });
        }
        let election = refs
            .election(election_id)
            .ok_or(BallotError::UnknownElection(election_id))?;
        if !election.accepts_votes(now) {
            return Err(BallotError::ElectionClosed(election_id));
        }
        if candidate.status != CandidateStatus::Approved {
            return Err(BallotError::CandidateNotApproved(candidate_id));
        }

        if let Some(existing) = self.voter_choice(refs, voter, election_id, &candidate.position) {
            warn!(
                %voter,
                election = %election_id,
                position = %candidate.position,
                "duplicate vote rejected"
            );
            return Err(BallotError::DuplicateVote {
                position: candidate.position.clone(),
                existing: existing.id,
            });
        }

        let vote = Vote {
            id: self.next_id(now),
            election_id,
            candidate_id,
            voter: voter.clone(),
            timestamp: now,
        };
        info!(
            vote = %vote.id,
            election = %election_id,
            candidate = %candidate_id,
            position = %candidate.position,
            "vote cast"
        );
        self.votes.push(vote.clone());
        Ok(vote)
    }

    /// Delete a vote by id. Absent ids are a no-op.
    ///
    /// Holding the id is the only authorization checked here; callers acting
    /// for a signed-in voter should use [`VoteGuard::revoke_own_vote`].
    pub fn revoke_vote(&mut self, vote_id: VoteId) -> Option<Vote> {
        let index = self.votes.iter().position(|v| v.id == vote_id)?;
        let vote = self.votes.remove(index);
        info!(vote = %vote_id, election = %vote.election_id, "vote revoked");
        Some(vote)
    }

    /// Delete a vote only if it was cast by `voter` and its election still
    /// accepts votes at `now`. Absent ids are a no-op.
    pub fn revoke_own_vote<R: ReferenceData + ?Sized>(
        &mut self,
        refs: &R,
        voter: &VoterEmail,
        vote_id: VoteId,
        now: Timestamp,
    ) -> Result<Option<Vote>, BallotError> {
        let Some(vote) = self.get(vote_id) else {
            return Ok(None);
        };
        if vote.voter != *voter {
            return Err(BallotError::NotVoteOwner(vote_id));
        }
        let election_id = vote.election_id;
        if !refs
            .election(election_id)
            .is_some_and(|e| e.accepts_votes(now))
        {
            warn!(vote = %vote_id, election = %election_id, "revoke rejected, election closed");
            return Err(BallotError::ElectionClosed(election_id));
        }
        Ok(self.revoke_vote(vote_id))
    }

    /// The vote `voter` holds for `position` in `election_id`, if any.
    pub fn voter_choice<R: ReferenceData + ?Sized>(
        &self,
        refs: &R,
        voter: &VoterEmail,
        election_id: ElectionId,
        position: &str,
    ) -> Option<&Vote> {
        self.votes.iter().find(|v| {
            v.election_id == election_id
                && v.voter == *voter
                && refs
                    .candidate(v.candidate_id)
                    .is_some_and(|c| c.position == position)
        })
    }

    /// Votes cast by `voter` in `election_id`.
    pub fn votes_by(&self, voter: &VoterEmail, election_id: ElectionId) -> Vec<&Vote> {
        self.votes
            .iter()
            .filter(|v| v.election_id == election_id && v.voter == *voter)
            .collect()
    }

    /// Number of votes for `candidate_id` in `election_id`.
    pub fn tally(&self, election_id: ElectionId, candidate_id: CandidateId) -> u32 {
        tally::count_votes(&self.votes, election_id, candidate_id)
    }

    /// Votes cast in `election_id` for any candidate standing for `position`.
    pub fn position_total<R: ReferenceData + ?Sized>(
        &self,
        refs: &R,
        election_id: ElectionId,
        position: &str,
    ) -> u32 {
        self.votes
            .iter()
            .filter(|v| {
                v.election_id == election_id
                    && refs
                        .candidate(v.candidate_id)
                        .is_some_and(|c| c.position == position)
            })
            .count() as u32
    }

    /// The candidate's share of `position_total` votes, in percent.
    ///
    /// Returns 0 when `position_total` is 0.
    pub fn percentage(&self, candidate_id: CandidateId, position_total: u32) -> f64 {
        let count = self
            .votes
            .iter()
            .filter(|v| v.candidate_id == candidate_id)
            .count() as u32;
        tally::percentage(count, position_total)
    }

    pub fn get(&self, vote_id: VoteId) -> Option<&Vote> {
        self.votes.iter().find(|v| v.id == vote_id)
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }

    fn next_id(&mut self, now: Timestamp) -> VoteId {
        let id = now.as_millis().max(self.last_id + 1);
        self.last_id = id;
        VoteId::new(id)
    }
}
