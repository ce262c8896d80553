//! Goals built around a single move.

use super::{Goal, GoalMove};
use crate::conversation::HistoricalMove;

/// Perform a move once.
#[derive(Debug, Clone)]
pub struct PerformGoalMove {
    pub goal_move: GoalMove,
    satisfied: bool,
}

impl PerformGoalMove {
    pub fn new(goal_move: GoalMove) -> Self {
        Self {
            goal_move,
            satisfied: false,
        }
    }
}

impl From<GoalMove> for PerformGoalMove {
    fn from(goal_move: GoalMove) -> Self {
        Self::new(goal_move)
    }
}

impl Goal for PerformGoalMove {
    fn next_step(&self) -> Option<GoalMove> {
        (!self.satisfied).then(|| self.goal_move.clone())
    }

    fn made_move(&mut self, history: &HistoricalMove) {
        self.satisfied |= self.goal_move.completed_by(history);
    }

    fn is_satisfied(&self) -> bool {
        self.satisfied
    }
}

/// Keep requesting a move until it was completed more than `max_reps` times.
///
/// With `max_reps = 2` the goal needs three completions.
#[derive(Debug, Clone)]
pub struct RepeatGoalMove {
    pub goal_move: GoalMove,
    pub reps: usize,
    pub max_reps: usize,
}

impl RepeatGoalMove {
    pub fn new(goal_move: GoalMove, max_reps: usize) -> Self {
        Self {
            goal_move,
            reps: 0,
            max_reps,
        }
    }
}

impl Goal for RepeatGoalMove {
    fn next_step(&self) -> Option<GoalMove> {
        (self.reps <= self.max_reps).then(|| self.goal_move.clone())
    }

    fn made_move(&mut self, history: &HistoricalMove) {
        if self.goal_move.completed_by(history) {
            self.reps += 1;
        }
    }

    fn is_satisfied(&self) -> bool {
        self.reps > self.max_reps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Speaker;
    use crate::goals::GoalPursuer;
    use crate::moves::MoveTag;

    fn made(speaker: Speaker, tag: &str) -> HistoricalMove {
        let mut history = HistoricalMove::pending(0, speaker, "node".into(), String::new());
        history.my_obligations_mut().address(MoveTag::new(tag));
        history
    }

    #[test]
    fn test_repeat_needs_more_than_max_reps() {
        let mut goal = RepeatGoalMove::new(GoalMove::anyone("small talk"), 2);

        for completed in 0..3 {
            assert!(!goal.is_satisfied());
            assert_eq!(goal.next_step().unwrap().dialog_move.as_str(), "small talk");
            goal.made_move(&made(Speaker::Person0, "greet"));
            assert_eq!(goal.reps, completed);
            goal.made_move(&made(Speaker::Person1, "small talk"));
        }

        assert_eq!(goal.reps, 3);
        assert!(goal.is_satisfied());
        assert!(goal.next_step().is_none());
    }

    #[test]
    fn test_repeat_respects_pursuer() {
        let goal_move = GoalMove::new(GoalPursuer::Speaker(Speaker::Person1), "small talk");
        let mut goal = RepeatGoalMove::new(goal_move, 0);

        goal.made_move(&made(Speaker::Person0, "small talk"));
        assert!(!goal.is_satisfied());
        goal.made_move(&made(Speaker::Person1, "small talk"));
        assert!(goal.is_satisfied());
    }

    #[test]
    fn test_perform_once() {
        let mut goal = PerformGoalMove::from(GoalMove::anyone("farewell"));
        assert!(goal.next_step().is_some());

        goal.made_move(&made(Speaker::Person0, "greet"));
        assert!(!goal.is_satisfied());

        goal.made_move(&made(Speaker::Person1, "farewell"));
        assert!(goal.is_satisfied());
        assert!(goal.next_step().is_none());

        goal.made_move(&made(Speaker::Person0, "greet"));
        assert!(goal.is_satisfied());
    }
}
