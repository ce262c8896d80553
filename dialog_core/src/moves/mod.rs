//! Dialog moves - the vocabulary a conversation is built from.
//!
//! A *move tag* names an intention ("greet", "make small talk"). A *move
//! definition* is one way to realize intentions as words: it answers a set of
//! tags and topics, may be gated by a precondition, may edit the pending
//! history entry, and renders text from its parts. Each part is a set of
//! alternative definitions, one of which is picked and rendered recursively.

mod expansion;
mod graph;

pub use graph::*;

pub(crate) use expansion::ExpansionTree;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::conversation::{EditContext, HistoricalMove, TurnContext};
use crate::topics::Topic;

/// Name of a dialog move intention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MoveTag(pub String);

impl MoveTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MoveTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl std::fmt::Display for MoveTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a move definition in a [`DialogMoveGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decides whether a move may be used this turn.
pub type Precondition = Box<dyn Fn(&TurnContext<'_>) -> bool + Send + Sync>;

/// Side effect of a realized move.
pub type MoveEdit =
    Box<dyn Fn(&mut EditContext<'_>, &mut dyn RngCore, &mut HistoricalMove) + Send + Sync>;

/// Turns the rendered parts into the move's text.
pub type MoveFormatter =
    Box<dyn Fn(&TurnContext<'_>, &mut dyn RngCore, Vec<String>) -> String + Send + Sync>;

/// One way to realize dialog moves as words.
pub struct MoveDefinition {
    /// Tags this definition can be selected under and discharges when realized.
    pub dialog_moves: BTreeSet<MoveTag>,
    /// Topics this definition addresses when realized.
    pub addressed_topics: BTreeSet<Topic>,
    /// Each part is a set of alternatives; exactly one is rendered per part.
    pub parts: Vec<Vec<NodeId>>,
    precondition: Option<Precondition>,
    edit: Option<MoveEdit>,
    formatter: MoveFormatter,
}

impl MoveDefinition {
    /// Create a definition rendered by `formatter`.
    pub fn new<F>(formatter: F) -> Self
    where
        F: Fn(&TurnContext<'_>, &mut dyn RngCore, Vec<String>) -> String + Send + Sync + 'static,
    {
        Self {
            dialog_moves: BTreeSet::new(),
            addressed_topics: BTreeSet::new(),
            parts: Vec::new(),
            precondition: None,
            edit: None,
            formatter: Box::new(formatter),
        }
    }

    /// A definition that always renders `text`.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_, _, _| text.clone())
    }

    /// A definition that renders its parts back to back, then `suffix`.
    pub fn joined(suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        Self::new(move |_, _, parts| parts.concat() + &suffix)
    }

    pub fn with_dialog_move(mut self, tag: impl Into<MoveTag>) -> Self {
        self.dialog_moves.insert(tag.into());
        self
    }

    pub fn with_topic(mut self, topic: Topic) -> Self {
        self.addressed_topics.insert(topic);
        self
    }

    /// Append a part made of the given alternatives.
    pub fn with_part<I, N>(mut self, alternatives: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<NodeId>,
    {
        self.parts
            .push(alternatives.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_precondition<F>(mut self, precondition: F) -> Self
    where
        F: Fn(&TurnContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.precondition = Some(Box::new(precondition));
        self
    }

    pub fn with_edit<F>(mut self, edit: F) -> Self
    where
        F: Fn(&mut EditContext<'_>, &mut dyn RngCore, &mut HistoricalMove) + Send + Sync + 'static,
    {
        self.edit = Some(Box::new(edit));
        self
    }

    /// Evaluate the precondition. A definition without one is always admissible.
    pub fn admits(&self, ctx: &TurnContext<'_>) -> bool {
        self.precondition
            .as_ref()
            .map_or(true, |precondition| precondition(ctx))
    }

    pub fn format(&self, ctx: &TurnContext<'_>, rng: &mut dyn RngCore, parts: Vec<String>) -> String {
        (self.formatter)(ctx, rng, parts)
    }

    pub(crate) fn edit(&self, ctx: &mut EditContext<'_>, rng: &mut dyn RngCore, history: &mut HistoricalMove) {
        if let Some(edit) = &self.edit {
            edit(ctx, rng, history);
        }
    }

    /// True if the definition has no parts.
    pub fn is_leaf(&self) -> bool {
        self.parts.is_empty()
    }
}

impl std::fmt::Debug for MoveDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MoveDefinition")
            .field("dialog_moves", &self.dialog_moves)
            .field("addressed_topics", &self.addressed_topics)
            .field("parts", &self.parts)
            .field("precondition", &self.precondition.is_some())
            .field("edit", &self.edit.is_some())
            .finish_non_exhaustive()
    }
}
