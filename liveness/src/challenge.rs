//! Liveness challenges and their random selection.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the fixed motion/expression tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChallengeKind {
    Blink,
    TurnLeft,
    TurnRight,
    Smile,
    Nod,
}

impl ChallengeKind {
    /// The full challenge set, in canonical order.
    pub const ALL: [ChallengeKind; 5] = [
        ChallengeKind::Blink,
        ChallengeKind::TurnLeft,
        ChallengeKind::TurnRight,
        ChallengeKind::Smile,
        ChallengeKind::Nod,
    ];

    /// Text shown to the subject while the challenge runs.
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::Blink => "Blink your eyes slowly",
            Self::TurnLeft => "Turn your head slightly to the left",
            Self::TurnRight => "Turn your head slightly to the right",
            Self::Smile => "Smile naturally",
            Self::Nod => "Nod your head up and down",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Blink => "blink",
            Self::TurnLeft => "turn-left",
            Self::TurnRight => "turn-right",
            Self::Smile => "smile",
            Self::Nod => "nod",
        }
    }
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A challenge within one session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub kind: ChallengeKind,
    /// Set by the engine once the detector confirms the challenge.
    pub completed: bool,
}

impl Challenge {
    pub fn new(kind: ChallengeKind) -> Self {
        Self {
            kind,
            completed: false,
        }
    }

    pub fn instruction(&self) -> &'static str {
        self.kind.instruction()
    }
}

/// Draw `count` distinct challenges in a uniformly random order.
///
/// `count` larger than the fixed set yields the whole set.
pub fn select_challenges<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Challenge> {
    let mut kinds = ChallengeKind::ALL.to_vec();
    kinds.shuffle(rng);
    kinds.truncate(count);
    kinds.into_iter().map(Challenge::new).collect()
}
