//! Vote tallies and per-position standings for display.

use crate::error::BallotError;
use crate::reference::ReferenceData;
use crate::vote::Vote;
use campus_types::{CandidateId, ElectionId};
use serde::{Deserialize, Serialize};

/// Count the votes for `candidate` in `election`.
pub fn count_votes(votes: &[Vote], election: ElectionId, candidate: CandidateId) -> u32 {
    votes
        .iter()
        .filter(|v| v.election_id == election && v.candidate_id == candidate)
        .count() as u32
}

/// `count / position_total * 100`, or 0 when no votes were cast for the position.
pub fn percentage(count: u32, position_total: u32) -> f64 {
    if position_total == 0 {
        return 0.0;
    }
    count as f64 / position_total as f64 * 100.0
}

/// One candidate's line in a position's results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateTally {
    pub candidate: CandidateId,
    pub name: String,
    pub votes: u32,
    pub percentage: f64,
}

/// Results for one position, most votes first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionStanding {
    pub position: String,
    pub total_votes: u32,
    pub candidates: Vec<CandidateTally>,
    /// The single candidate holding the most votes. `None` on a tie for
    /// first place or when nobody has voted.
    pub leader: Option<CandidateId>,
}

/// Standings for every position of `election`, in the election's position order.
pub fn standings<R: ReferenceData + ?Sized>(
    refs: &R,
    votes: &[Vote],
    election: ElectionId,
) -> Result<Vec<PositionStanding>, BallotError> {
    let record = refs
        .election(election)
        .ok_or(BallotError::UnknownElection(election))?;
    let candidates = refs.candidates_in(election);

    let standings = record
        .positions
        .iter()
        .map(|position| {
            let mut rows: Vec<(CandidateId, String, u32)> = candidates
                .iter()
                .filter(|c| &c.position == position)
                .map(|c| (c.id, c.name.clone(), count_votes(votes, election, c.id)))
                .collect();
            let total_votes: u32 = rows.iter().map(|(_, _, n)| n).sum();
            rows.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));

            let leader = match rows.as_slice() {
                [(id, _, top), rest @ ..] if *top > 0 && rest.first().map_or(true, |r| r.2 < *top) => {
                    Some(*id)
                }
                _ => None,
            };

            PositionStanding {
                position: position.clone(),
                total_votes,
                candidates: rows
                    .into_iter()
                    .map(|(candidate, name, n)| CandidateTally {
                        candidate,
                        name,
                        votes: n,
                        percentage: percentage(n, total_votes),
                    })
                    .collect(),
                leader,
            }
        })
        .collect();

    Ok(standings)
}
