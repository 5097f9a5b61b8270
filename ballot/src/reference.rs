//! Election and candidate reference data.
//!
//! The guard never mutates these records. [`Roster`] is an in-memory
//! implementation for the dashboard and tests; a real deployment would back
//! [`ReferenceData`] with its data service.

use crate::error::BallotError;
use campus_types::{CandidateId, ElectionId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionStatus {
    Draft,
    Published,
    Ongoing,
    Completed,
}

/// An election with the positions contested in it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Election {
    pub id: ElectionId,
    pub title: String,
    pub description: String,
    pub status: ElectionStatus,
    /// Contested positions, in display order.
    pub positions: Vec<String>,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
}

impl Election {
    /// Whether ballots may be cast or withdrawn at `now`.
    pub fn accepts_votes(&self, now: Timestamp) -> bool {
        self.status == ElectionStatus::Ongoing && self.starts_at <= now && now < self.ends_at
    }

    pub fn has_position(&self, position: &str) -> bool {
        self.positions.iter().any(|p| p == position)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateStatus {
    Pending,
    Approved,
    Rejected,
    Disabled,
}

/// A candidate standing for one position in one election.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub position: String,
    pub election_id: ElectionId,
    pub status: CandidateStatus,
}

/// Read-only lookup of elections and candidates.
pub trait ReferenceData {
    fn election(&self, id: ElectionId) -> Option<&Election>;

    fn candidate(&self, id: CandidateId) -> Option<&Candidate>;

    /// Candidates standing in `election`, ordered by id.
    fn candidates_in(&self, election: ElectionId) -> Vec<&Candidate>;
}

/// In-memory elections and candidates.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    elections: BTreeMap<ElectionId, Election>,
    candidates: BTreeMap<CandidateId, Candidate>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_election(&mut self, election: Election) -> Result<(), BallotError> {
        if self.elections.contains_key(&election.id) {
            return Err(BallotError::DuplicateRecord(format!("election {}", election.id)));
        }
        self.elections.insert(election.id, election);
        Ok(())
    }

    /// Register a candidate. Their election must exist and list their position.
    pub fn add_candidate(&mut self, candidate: Candidate) -> Result<(), BallotError> {
        if self.candidates.contains_key(&candidate.id) {
            return Err(BallotError::DuplicateRecord(format!("candidate {}", candidate.id)));
        }
        let election = self
            .elections
            .get(&candidate.election_id)
            .ok_or(BallotError::UnknownElection(candidate.election_id))?;
        if !election.has_position(&candidate.position) {
            return Err(BallotError::UnknownPosition {
                election: election.id,
                position: candidate.position.clone(),
            });
        }
        self.candidates.insert(candidate.id, candidate);
        Ok(())
    }

    /// Update an election's status (e.g. when an administrator closes it).
    pub fn set_election_status(
        &mut self,
        id: ElectionId,
        status: ElectionStatus,
    ) -> Result<(), BallotError> {
        let election = self
            .elections
            .get_mut(&id)
            .ok_or(BallotError::UnknownElection(id))?;
        election.status = status;
        Ok(())
    }

    /// Approve, reject or disable a candidate.
    pub fn set_candidate_status(
        &mut self,
        id: CandidateId,
        status: CandidateStatus,
    ) -> Result<(), BallotError> {
        let candidate = self
            .candidates
            .get_mut(&id)
            .ok_or(BallotError::UnknownCandidate(id))?;
        candidate.status = status;
        Ok(())
    }

    pub fn elections(&self) -> impl Iterator<Item = &Election> {
        self.elections.values()
    }
}

impl ReferenceData for Roster {
    fn election(&self, id: ElectionId) -> Option<&Election> {
        self.elections.get(&id)
    }

    fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.get(&id)
    }

    fn candidates_in(&self, election: ElectionId) -> Vec<&Candidate> {
        self.candidates
            .values()
            .filter(|c| c.election_id == election)
            .collect()
    }
}
