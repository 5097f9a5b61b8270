//! Nullable detector: scripted face and challenge answers.

use campus_liveness::{ChallengeDetector, ChallengeKind, Frame};
use std::collections::VecDeque;

/// Answers detection queries from queues, falling back to fixed defaults.
///
/// Face and challenge answers are scripted separately since the engine polls
/// for a face on its own schedule.
#[derive(Clone, Debug)]
pub struct ScriptedDetector {
    faces: VecDeque<bool>,
    challenges: VecDeque<bool>,
    default_face: bool,
    default_challenge: bool,
    checked: Vec<ChallengeKind>,
}

impl ScriptedDetector {
    /// Face always present, every challenge passes.
    pub fn passing() -> Self {
        Self {
            faces: VecDeque::new(),
            challenges: VecDeque::new(),
            default_face: true,
            default_challenge: true,
            checked: Vec::new(),
        }
    }

    /// Face always present, no challenge ever passes.
    pub fn failing() -> Self {
        Self {
            default_challenge: false,
            ..Self::passing()
        }
    }

    /// Queue challenge answers, consumed in order before the default applies.
    pub fn with_challenges(mut self, answers: impl IntoIterator<Item = bool>) -> Self {
        self.challenges.extend(answers);
        self
    }

    /// Queue face-presence answers, consumed in order before the default applies.
    pub fn with_faces(mut self, answers: impl IntoIterator<Item = bool>) -> Self {
        self.faces.extend(answers);
        self
    }

    /// Challenge kinds checked so far, in order.
    pub fn checked(&self) -> &[ChallengeKind] {
        &self.checked
    }
}

impl ChallengeDetector for ScriptedDetector {
    fn face_present(&mut self, _frame: Option<&Frame>) -> bool {
        self.faces.pop_front().unwrap_or(self.default_face)
    }

    fn challenge_passed(&mut self, kind: ChallengeKind, _frame: Option<&Frame>) -> bool {
        self.checked.push(kind);
        self.challenges.pop_front().unwrap_or(self.default_challenge)
    }
}
