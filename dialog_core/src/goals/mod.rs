//! Goals - standing objectives that request moves and decide when a
//! conversation is over.
//!
//! A conversation ends once every goal reports [`Goal::is_satisfied`]. While
//! unsatisfied, a goal may propose a [`GoalMove`] each turn; the engine only
//! considers proposals whose [`GoalPursuer`] agrees with the current speaker.

mod repeat;
mod sequence;

pub use repeat::*;
pub use sequence::*;

use serde::{Deserialize, Serialize};

use crate::conversation::{HistoricalMove, Speaker};
use crate::moves::MoveTag;

/// Who may carry out a goal move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalPursuer {
    Speaker(Speaker),
    Any,
}

impl GoalPursuer {
    pub fn agrees_with(self, speaker: Speaker) -> bool {
        match self {
            GoalPursuer::Speaker(pursuer) => pursuer == speaker,
            GoalPursuer::Any => true,
        }
    }
}

impl From<Speaker> for GoalPursuer {
    fn from(speaker: Speaker) -> Self {
        GoalPursuer::Speaker(speaker)
    }
}

/// A move a goal wants performed, and by whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalMove {
    pub pursuer: GoalPursuer,
    pub dialog_move: MoveTag,
}

impl GoalMove {
    pub fn new(pursuer: impl Into<GoalPursuer>, dialog_move: impl Into<MoveTag>) -> Self {
        Self {
            pursuer: pursuer.into(),
            dialog_move: dialog_move.into(),
        }
    }

    /// A move either participant may perform.
    pub fn anyone(dialog_move: impl Into<MoveTag>) -> Self {
        Self::new(GoalPursuer::Any, dialog_move)
    }

    /// True if `history` performed this move by an agreeing speaker.
    pub fn completed_by(&self, history: &HistoricalMove) -> bool {
        self.pursuer.agrees_with(history.speaker) && history.was_move_satisfied(&self.dialog_move)
    }
}

/// A standing objective for one conversation.
pub trait Goal: std::fmt::Debug + Send + Sync {
    /// The move this goal wants next, if any.
    fn next_step(&self) -> Option<GoalMove>;

    /// Observe a committed move. Called once per turn.
    fn made_move(&mut self, history: &HistoricalMove);

    fn is_satisfied(&self) -> bool;
}

impl<G: Goal + ?Sized> Goal for Box<G> {
    fn next_step(&self) -> Option<GoalMove> {
        (**self).next_step()
    }

    fn made_move(&mut self, history: &HistoricalMove) {
        (**self).made_move(history)
    }

    fn is_satisfied(&self) -> bool {
        (**self).is_satisfied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pursuer_agreement() {
        assert!(GoalPursuer::Any.agrees_with(Speaker::Person0));
        assert!(GoalPursuer::Any.agrees_with(Speaker::Person1));

        let pursuer = GoalPursuer::from(Speaker::Person1);
        assert!(pursuer.agrees_with(Speaker::Person1));
        assert!(!pursuer.agrees_with(Speaker::Person0));
    }

    #[test]
    fn test_completed_by() {
        let goal_move = GoalMove::new(Speaker::Person0, "greet");
        let mut history = HistoricalMove::pending(0, Speaker::Person0, "hello node".into(), "Hi.".into());
        assert!(!goal_move.completed_by(&history));

        history.my_obligations_mut().address(MoveTag::new("greet"));
        assert!(goal_move.completed_by(&history));

        history.speaker = Speaker::Person1;
        assert!(!goal_move.completed_by(&history));
        assert!(GoalMove::anyone("greet").completed_by(&history));
    }
}
