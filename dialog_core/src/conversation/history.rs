//! Historical moves - what was said on one turn and what it changed.

use serde::{Deserialize, Serialize};

use super::Speaker;
use crate::moves::{MoveTag, NodeId};
use crate::obligations::HistoricalObligations;
use crate::topics::TopicState;

/// One committed (or about to be committed) turn of a conversation.
///
/// While a move is pending, its effects write their obligation and topic
/// changes here. The engine merges them into the conversation on commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalMove {
    /// Zero-based index of this move in the conversation history.
    pub turn: usize,
    pub speaker: Speaker,
    /// The top-level move that was realized.
    pub node: NodeId,
    pub utterance: String,
    pub person0_obligations: HistoricalObligations,
    pub person1_obligations: HistoricalObligations,
    /// Topics this move introduced and addressed.
    pub topic_state: TopicState,
}

impl HistoricalMove {
    /// A move with no recorded changes yet.
    pub fn pending(turn: usize, speaker: Speaker, node: NodeId, utterance: String) -> Self {
        Self {
            turn,
            speaker,
            node,
            utterance,
            person0_obligations: HistoricalObligations::default(),
            person1_obligations: HistoricalObligations::default(),
            topic_state: TopicState::default(),
        }
    }

    pub fn obligations(&self, speaker: Speaker) -> &HistoricalObligations {
        match speaker {
            Speaker::Person0 => &self.person0_obligations,
            Speaker::Person1 => &self.person1_obligations,
        }
    }

    pub fn obligations_mut(&mut self, speaker: Speaker) -> &mut HistoricalObligations {
        match speaker {
            Speaker::Person0 => &mut self.person0_obligations,
            Speaker::Person1 => &mut self.person1_obligations,
        }
    }

    /// Obligation changes for the participant who made this move.
    pub fn my_obligations_mut(&mut self) -> &mut HistoricalObligations {
        self.obligations_mut(self.speaker)
    }

    /// Obligation changes for the participant listening to this move.
    pub fn others_obligations_mut(&mut self) -> &mut HistoricalObligations {
        self.obligations_mut(!self.speaker)
    }

    /// True if either participant discharged `dialog_move` with this move.
    pub fn was_move_satisfied(&self, dialog_move: &MoveTag) -> bool {
        self.person0_obligations.addressed.contains(dialog_move)
            || self.person1_obligations.addressed.contains(dialog_move)
    }

    /// Every move tag discharged by this move, without duplicates.
    pub fn addressed_moves(&self) -> impl Iterator<Item = &MoveTag> {
        self.person0_obligations
            .addressed
            .union(&self.person1_obligations.addressed)
    }
}

impl std::fmt::Display for HistoricalMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.utterance)
    }
}
