//! Goals made of several moves or other goals.

use super::{Goal, GoalMove};
use crate::conversation::HistoricalMove;

/// Perform every move of a list. Always requests the first remaining one,
/// but a move counts whenever it is completed.
#[derive(Debug, Clone, Default)]
pub struct GoalSequence {
    pub sequence: Vec<GoalMove>,
}

impl GoalSequence {
    pub fn new(sequence: impl IntoIterator<Item = GoalMove>) -> Self {
        Self {
            sequence: sequence.into_iter().collect(),
        }
    }
}

impl Goal for GoalSequence {
    fn next_step(&self) -> Option<GoalMove> {
        self.sequence.first().cloned()
    }

    fn made_move(&mut self, history: &HistoricalMove) {
        self.sequence.retain(|goal_move| !goal_move.completed_by(history));
    }

    fn is_satisfied(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Like [`GoalSequence`], but completing the last move satisfies the whole
/// sequence at once.
#[derive(Debug, Clone, Default)]
pub struct GoalEagerSequence {
    pub sequence: Vec<GoalMove>,
}

impl GoalEagerSequence {
    pub fn new(sequence: impl IntoIterator<Item = GoalMove>) -> Self {
        Self {
            sequence: sequence.into_iter().collect(),
        }
    }
}

impl Goal for GoalEagerSequence {
    fn next_step(&self) -> Option<GoalMove> {
        self.sequence.first().cloned()
    }

    fn made_move(&mut self, history: &HistoricalMove) {
        if self
            .sequence
            .last()
            .is_some_and(|last| last.completed_by(history))
        {
            self.sequence.clear();
            return;
        }
        self.sequence.retain(|goal_move| !goal_move.completed_by(history));
    }

    fn is_satisfied(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Pursue `first`, then `second`. Both observe every move.
#[derive(Debug, Clone)]
pub struct ConcatGoals<G1, G2> {
    pub first: G1,
    pub second: G2,
}

impl<G1: Goal, G2: Goal> ConcatGoals<G1, G2> {
    pub fn new(first: G1, second: G2) -> Self {
        Self { first, second }
    }
}

impl<G1: Goal, G2: Goal> Goal for ConcatGoals<G1, G2> {
    fn next_step(&self) -> Option<GoalMove> {
        self.first.next_step().or_else(|| self.second.next_step())
    }

    fn made_move(&mut self, history: &HistoricalMove) {
        self.first.made_move(history);
        self.second.made_move(history);
    }

    fn is_satisfied(&self) -> bool {
        self.first.is_satisfied() && self.second.is_satisfied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Speaker;
    use crate::goals::{PerformGoalMove, RepeatGoalMove};
    use crate::moves::MoveTag;

    fn made(tag: &str) -> HistoricalMove {
        let mut history = HistoricalMove::pending(0, Speaker::Person0, "node".into(), String::new());
        history.my_obligations_mut().address(MoveTag::new(tag));
        history
    }

    fn steps(tags: &[&str]) -> Vec<GoalMove> {
        tags.iter().map(|tag| GoalMove::anyone(*tag)).collect()
    }

    #[test]
    fn test_sequence() {
        let mut goal = GoalSequence::new(steps(&["greet", "ask", "farewell"]));
        assert_eq!(goal.next_step().unwrap().dialog_move.as_str(), "greet");

        goal.made_move(&made("ask"));
        assert_eq!(goal.next_step().unwrap().dialog_move.as_str(), "greet");
        assert_eq!(goal.sequence.len(), 2);

        goal.made_move(&made("greet"));
        goal.made_move(&made("farewell"));
        assert!(goal.is_satisfied());
        assert!(goal.next_step().is_none());
    }

    #[test]
    fn test_eager_sequence_clears_on_last() {
        let mut goal = GoalEagerSequence::new(steps(&["greet", "ask", "farewell"]));
        goal.made_move(&made("ask"));
        assert_eq!(goal.sequence.len(), 2);

        goal.made_move(&made("farewell"));
        assert!(goal.is_satisfied());
    }

    #[test]
    fn test_concat() {
        let mut goal = ConcatGoals::new(
            PerformGoalMove::new(GoalMove::anyone("greet")),
            RepeatGoalMove::new(GoalMove::anyone("small talk"), 0),
        );
        assert_eq!(goal.next_step().unwrap().dialog_move.as_str(), "greet");

        goal.made_move(&made("small talk"));
        assert!(!goal.is_satisfied());
        assert_eq!(goal.next_step().unwrap().dialog_move.as_str(), "greet");

        goal.made_move(&made("greet"));
        assert!(goal.is_satisfied());
        assert!(goal.next_step().is_none());
    }
}
