use campus_types::{CandidateId, ElectionId, VoteId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BallotError {
    #[error("you have already voted for a {position}; unvote before casting a new vote")]
    DuplicateVote { position: String, existing: VoteId },

    #[error("candidate {0} not found")]
    UnknownCandidate(CandidateId),

    #[error("election {0} not found")]
    UnknownElection(ElectionId),

    #[error("candidate {candidate} is not standing in election {election}")]
    CandidateNotInElection {
        candidate: CandidateId,
        election: ElectionId,
    },

    #[error("election {0} is not accepting votes")]
    ElectionClosed(ElectionId),

    #[error("candidate {0} is not approved")]
    CandidateNotApproved(CandidateId),

    #[error("vote {0} belongs to another voter")]
    NotVoteOwner(VoteId),

    #[error("position {position} is not contested in election {election}")]
    UnknownPosition { election: ElectionId, position: String },

    #[error("duplicate reference record: {0}")]
    DuplicateRecord(String),
}
