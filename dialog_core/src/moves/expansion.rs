//! Turning a requested tag or topic into a concrete utterance plan.
//!
//! Expansion works in two directions. Forward chaining picks one admissible
//! alternative for every part of a definition, recursively. Backward chaining
//! takes a definition that only ever appears as a part of others and wraps it
//! into an admissible parent, until a top-level definition is reached.

use rand::seq::SliceRandom;
use rand::RngCore;

use super::{DialogMoveGraph, MoveDefinition, MoveTag, NodeId};
use crate::conversation::{EditContext, HistoricalMove, TurnContext};
use crate::topics::Topic;

/// A fully expanded move: a definition with one chosen subtree per part.
#[derive(Debug, Clone)]
pub(crate) struct ExpansionTree<'g> {
    id: &'g NodeId,
    definition: &'g MoveDefinition,
    parts: Vec<ExpansionTree<'g>>,
}

impl<'g> ExpansionTree<'g> {
    pub fn id(&self) -> &'g NodeId {
        self.id
    }

    /// Render parts depth first, then format this node.
    pub fn render(&self, ctx: &TurnContext<'_>, rng: &mut dyn RngCore) -> String {
        let parts = self
            .parts
            .iter()
            .map(|part| part.render(ctx, rng))
            .collect();
        self.definition.format(ctx, rng, parts)
    }

    /// Record what realizing this tree discharges, and run its effects.
    ///
    /// Parts go first. Every node discharges its dialog moves for the speaker
    /// and addresses its topics.
    pub fn realize(&self, ctx: &mut EditContext<'_>, rng: &mut dyn RngCore, history: &mut HistoricalMove) {
        for part in &self.parts {
            part.realize(ctx, rng, history);
        }
        for tag in &self.definition.dialog_moves {
            history.my_obligations_mut().address(tag.clone());
        }
        for topic in &self.definition.addressed_topics {
            history.topic_state.address(topic.clone());
        }
        self.definition.edit(ctx, rng, history);
    }
}

impl DialogMoveGraph {
    /// Expand some definition answering `tag`, or `None` if none is admissible.
    pub(crate) fn expand_move<'g>(
        &'g self,
        ctx: &TurnContext<'_>,
        rng: &mut dyn RngCore,
        tag: &MoveTag,
    ) -> Option<ExpansionTree<'g>> {
        let candidates = self.nodes_for_move(tag);
        if candidates.is_empty() {
            tracing::warn!(dialog_move = %tag, "no move definition answers this dialog move");
            return None;
        }
        self.expand_candidates(ctx, rng, candidates)
    }

    /// Expand some definition addressing `topic`, or `None` if none is admissible.
    pub(crate) fn expand_topic<'g>(
        &'g self,
        ctx: &TurnContext<'_>,
        rng: &mut dyn RngCore,
        topic: &Topic,
    ) -> Option<ExpansionTree<'g>> {
        let candidates = self.nodes_for_topic(topic);
        if candidates.is_empty() {
            tracing::warn!(topic = %topic, "no move definition addresses this topic");
            return None;
        }
        self.expand_candidates(ctx, rng, candidates)
    }

    fn expand_candidates<'g>(
        &'g self,
        ctx: &TurnContext<'_>,
        rng: &mut dyn RngCore,
        candidates: &'g [NodeId],
    ) -> Option<ExpansionTree<'g>> {
        let mut order: Vec<&'g NodeId> = candidates.iter().collect();
        order.shuffle(rng);

        for id in order {
            let Some(tree) = self.expand_node(ctx, rng, id) else {
                continue;
            };
            if let Some(tree) = self.wrap_in_parents(ctx, rng, tree) {
                return Some(tree);
            }
        }
        None
    }

    fn expand_node<'g>(
        &'g self,
        ctx: &TurnContext<'_>,
        rng: &mut dyn RngCore,
        id: &'g NodeId,
    ) -> Option<ExpansionTree<'g>> {
        let definition = self.get(id)?;
        if !definition.admits(ctx) {
            return None;
        }
        let parts = self.expand_parts(ctx, rng, definition, None)?;
        Some(ExpansionTree {
            id,
            definition,
            parts,
        })
    }

    /// Forward chaining. Alternatives are tried in random order; the first
    /// admissible one wins. The `skip` part is left out of the result.
    fn expand_parts<'g>(
        &'g self,
        ctx: &TurnContext<'_>,
        rng: &mut dyn RngCore,
        definition: &'g MoveDefinition,
        skip: Option<usize>,
    ) -> Option<Vec<ExpansionTree<'g>>> {
        let mut parts = Vec::with_capacity(definition.parts.len());
        for (index, alternatives) in definition.parts.iter().enumerate() {
            if skip == Some(index) {
                continue;
            }
            let mut order: Vec<&'g NodeId> = alternatives.iter().collect();
            order.shuffle(rng);
            let part = order
                .into_iter()
                .find_map(|alternative| self.expand_node(ctx, rng, alternative))?;
            parts.push(part);
        }
        Some(parts)
    }

    /// Backward chaining, up to a top-level definition.
    fn wrap_in_parents<'g>(
        &'g self,
        ctx: &TurnContext<'_>,
        rng: &mut dyn RngCore,
        tree: ExpansionTree<'g>,
    ) -> Option<ExpansionTree<'g>> {
        if self.is_top_level(tree.id) {
            return Some(tree);
        }

        for parent_id in self.parents_of(tree.id) {
            let Some(parent) = self.get(parent_id) else {
                continue;
            };
            if !parent.admits(ctx) {
                continue;
            }
            let Some(slot) = parent
                .parts
                .iter()
                .position(|alternatives| alternatives.contains(tree.id))
            else {
                continue;
            };
            let Some(mut parts) = self.expand_parts(ctx, rng, parent, Some(slot)) else {
                continue;
            };

            parts.insert(slot, tree.clone());
            let wrapped = ExpansionTree {
                id: parent_id,
                definition: parent,
                parts,
            };
            if let Some(complete) = self.wrap_in_parents(ctx, rng, wrapped) {
                return Some(complete);
            }
        }

        tracing::trace!(node = %tree.id, "no admissible parent for sub-move");
        None
    }
}
