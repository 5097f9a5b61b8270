//! Ballot handling for student elections.
//!
//! Key rule: a voter holds at most one active vote per position per election.
//! Changing a choice means revoking the old vote first; revocation deletes
//! the vote outright.
//!
//! Elections and candidates are reference data owned by the surrounding
//! application and reached through [`ReferenceData`]; the guard only reads
//! them to resolve a candidate's position and to compute tallies.

pub mod error;
pub mod guard;
pub mod reference;
pub mod tally;
pub mod vote;

pub use error::BallotError;
pub use guard::VoteGuard;
pub use reference::{Candidate, CandidateStatus, Election, ElectionStatus, ReferenceData, Roster};
pub use tally::{percentage, standings, CandidateTally, PositionStanding};
pub use vote::Vote;
