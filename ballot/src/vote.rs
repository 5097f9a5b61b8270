//! A cast vote.

use campus_types::{CandidateId, ElectionId, Timestamp, VoteId, VoterEmail};
use serde::{Deserialize, Serialize};

/// One voter's choice of one candidate. Never mutated; revoking deletes it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub election_id: ElectionId,
    pub candidate_id: CandidateId,
    pub voter: VoterEmail,
    pub timestamp: Timestamp,
}
