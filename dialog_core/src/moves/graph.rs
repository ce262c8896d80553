//! The move registry, validated at construction.

use std::collections::{BTreeMap, BTreeSet};

use super::{MoveDefinition, MoveTag, NodeId};
use crate::error::{DialogError, Result};
use crate::topics::Topic;

/// All move definitions of a dialogue vocabulary, indexed by what they answer.
///
/// Construction rejects duplicate identifiers, parts naming unknown
/// definitions, empty alternative sets and cycles through `parts`, so
/// rendering never has to deal with them.
#[derive(Debug, Default)]
pub struct DialogMoveGraph {
    nodes: BTreeMap<NodeId, MoveDefinition>,
    by_move: BTreeMap<MoveTag, Vec<NodeId>>,
    by_topic: BTreeMap<Topic, Vec<NodeId>>,
    /// Definition -> definitions using it as a part.
    part_of: BTreeMap<NodeId, Vec<NodeId>>,
}

impl DialogMoveGraph {
    pub fn new<I>(definitions: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NodeId, MoveDefinition)>,
    {
        let mut nodes = BTreeMap::new();
        for (id, definition) in definitions {
            if nodes.contains_key(&id) {
                return Err(DialogError::DuplicateMove(id));
            }
            nodes.insert(id, definition);
        }

        let mut graph = Self {
            nodes,
            ..Self::default()
        };
        graph.validate()?;
        graph.build_indexes();
        tracing::debug!(moves = graph.nodes.len(), "dialog move graph built");
        Ok(graph)
    }

    fn validate(&self) -> Result<()> {
        for (id, definition) in &self.nodes {
            for (part, alternatives) in definition.parts.iter().enumerate() {
                if alternatives.is_empty() {
                    return Err(DialogError::EmptyAlternatives {
                        node: id.clone(),
                        part,
                    });
                }
                if let Some(missing) = alternatives.iter().find(|alt| !self.nodes.contains_key(*alt)) {
                    return Err(DialogError::MissingMoveReference {
                        node: id.clone(),
                        missing: missing.clone(),
                    });
                }
            }
        }

        let mut finished = BTreeSet::new();
        for id in self.nodes.keys() {
            let mut path = Vec::new();
            self.check_acyclic(id, &mut path, &mut finished)?;
        }
        Ok(())
    }

    /// Depth-first search over parts; `path` holds the definitions being visited.
    fn check_acyclic<'a>(
        &'a self,
        id: &'a NodeId,
        path: &mut Vec<&'a NodeId>,
        finished: &mut BTreeSet<&'a NodeId>,
    ) -> Result<()> {
        if finished.contains(id) {
            return Ok(());
        }
        if path.contains(&id) {
            return Err(DialogError::CyclicMoveReference(id.clone()));
        }
        let Some(definition) = self.nodes.get(id) else {
            return Ok(());
        };

        path.push(id);
        for child in definition.parts.iter().flatten() {
            self.check_acyclic(child, path, finished)?;
        }
        path.pop();
        finished.insert(id);
        Ok(())
    }

    fn build_indexes(&mut self) {
        for (id, definition) in &self.nodes {
            for tag in &definition.dialog_moves {
                self.by_move.entry(tag.clone()).or_default().push(id.clone());
            }
            for topic in &definition.addressed_topics {
                self.by_topic.entry(topic.clone()).or_default().push(id.clone());
            }
            let children: BTreeSet<&NodeId> = definition.parts.iter().flatten().collect();
            for child in children {
                self.part_of.entry(child.clone()).or_default().push(id.clone());
            }
        }
    }

    pub fn get(&self, id: &NodeId) -> Option<&MoveDefinition> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Definitions answering a move tag, in identifier order.
    pub fn nodes_for_move(&self, tag: &MoveTag) -> &[NodeId] {
        self.by_move.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Definitions addressing a topic, in identifier order.
    pub fn nodes_for_topic(&self, topic: &Topic) -> &[NodeId] {
        self.by_topic.get(topic).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Definitions using `id` as a part.
    pub fn parents_of(&self, id: &NodeId) -> &[NodeId] {
        self.part_of.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True if no definition uses `id` as a part.
    pub fn is_top_level(&self, id: &NodeId) -> bool {
        self.parents_of(id).is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &MoveDefinition)> {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, definition: MoveDefinition) -> (NodeId, MoveDefinition) {
        (NodeId::new(id), definition)
    }

    fn greetings() -> Vec<(NodeId, MoveDefinition)> {
        vec![
            node("hello", MoveDefinition::text("Hello")),
            node("hi", MoveDefinition::text("Hi")),
            node(
                "greet",
                MoveDefinition::joined(".")
                    .with_dialog_move("greet")
                    .with_part(["hello", "hi"]),
            ),
            node(
                "state fav",
                MoveDefinition::text("Jazz.")
                    .with_dialog_move("state fav")
                    .with_dialog_move("small talk")
                    .with_topic(Topic::new("fav music genre")),
            ),
        ]
    }

    #[test]
    fn test_indexes() {
        let graph = DialogMoveGraph::new(greetings()).unwrap();

        assert_eq!(graph.len(), 4);
        assert_eq!(graph.nodes_for_move(&MoveTag::new("greet")), &[NodeId::new("greet")]);
        assert_eq!(
            graph.nodes_for_topic(&Topic::new("fav music genre")),
            &[NodeId::new("state fav")]
        );
        assert!(graph.nodes_for_move(&MoveTag::new("farewell")).is_empty());
        assert_eq!(graph.parents_of(&NodeId::new("hi")), &[NodeId::new("greet")]);
        assert!(graph.is_top_level(&NodeId::new("greet")));
        assert!(!graph.is_top_level(&NodeId::new("hello")));
    }

    #[test]
    fn test_duplicate_move() {
        let mut definitions = greetings();
        definitions.push(node("hi", MoveDefinition::text("Hey")));

        assert_eq!(
            DialogMoveGraph::new(definitions).unwrap_err(),
            DialogError::DuplicateMove(NodeId::new("hi"))
        );
    }

    #[test]
    fn test_missing_reference() {
        let definitions = vec![node("greet", MoveDefinition::joined(".").with_part(["hello", "howdy"]))];

        assert_eq!(
            DialogMoveGraph::new(definitions).unwrap_err(),
            DialogError::MissingMoveReference {
                node: NodeId::new("greet"),
                missing: NodeId::new("hello"),
            }
        );
    }

    #[test]
    fn test_empty_alternatives() {
        let definitions = vec![node(
            "greet",
            MoveDefinition::joined(".").with_part(Vec::<NodeId>::new()),
        )];

        assert_eq!(
            DialogMoveGraph::new(definitions).unwrap_err(),
            DialogError::EmptyAlternatives {
                node: NodeId::new("greet"),
                part: 0,
            }
        );
    }

    #[test]
    fn test_cycles_rejected() {
        let definitions = vec![
            node("a", MoveDefinition::joined("").with_part(["b"])),
            node("b", MoveDefinition::joined("").with_part(["c", "leaf"])),
            node("c", MoveDefinition::joined("").with_part(["a"])),
            node("leaf", MoveDefinition::text("x")),
        ];
        assert!(matches!(
            DialogMoveGraph::new(definitions),
            Err(DialogError::CyclicMoveReference(_))
        ));

        let selfish = vec![node("a", MoveDefinition::joined("").with_part(["a"]))];
        assert_eq!(
            DialogMoveGraph::new(selfish).unwrap_err(),
            DialogError::CyclicMoveReference(NodeId::new("a"))
        );
    }

    #[test]
    fn test_shared_parts_are_not_cycles() {
        let definitions = vec![
            node("leaf", MoveDefinition::text("x")),
            node("a", MoveDefinition::joined("").with_part(["leaf"]).with_part(["leaf"])),
            node("b", MoveDefinition::joined("").with_part(["a", "leaf"])),
        ];
        let graph = DialogMoveGraph::new(definitions).unwrap();
        assert_eq!(
            graph.parents_of(&NodeId::new("leaf")),
            &[NodeId::new("a"), NodeId::new("b")]
        );
    }
}
