//! Error types for the dialogue engine.

use identity_model::EntityId;
use thiserror::Error;

use crate::conversation::ConversationId;
use crate::moves::NodeId;

/// Errors raised by move registration, conversation setup and stepping.
///
/// Registration errors mean the move vocabulary is broken and are reported
/// before any conversation runs. Nothing here is transient.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DialogError {
    #[error("move '{0}' is registered twice")]
    DuplicateMove(NodeId),

    #[error("move '{node}' uses unknown move '{missing}' as a part")]
    MissingMoveReference { node: NodeId, missing: NodeId },

    /// `parts` must form a DAG.
    #[error("move '{0}' is part of itself")]
    CyclicMoveReference(NodeId),

    #[error("part {part} of move '{node}' has no alternatives")]
    EmptyAlternatives { node: NodeId, part: usize },

    #[error("threshold {0} is not a probability")]
    InvalidThreshold(f64),

    #[error("entity {0} cannot talk to itself")]
    SameParticipant(EntityId),

    #[error("participant {0} is not in the cast")]
    UnknownParticipant(EntityId),

    /// Stepping a finished conversation is a caller bug.
    #[error("conversation {0} is already finished")]
    ConversationFinished(ConversationId),

    #[error("conversation did not finish within {limit} turns")]
    TurnLimit { limit: usize },

    #[error("invalid engine config: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DialogError>;
