//! Evidence definitions - sourced, weighted assertions about a facet value.

use serde::{Deserialize, Serialize};

use crate::entities::EntityId;
use crate::facets::{FacetId, ValueId};

/// How a piece of evidence reached its holder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EvidenceKind {
    /// Something said *to the holder*. It may well be a lie.
    Statement {
        source: EntityId,
        /// Where the holder was when the statement was made.
        location: EntityId,
    },

    /// Gained by directly observing the regarded entity.
    Observation { location: EntityId },

    /// A statement the holder overheard while it was made to someone else.
    Overheard {
        source: EntityId,
        recipient: EntityId,
        location: EntityId,
    },

    /// Something the holder said itself and believes to be true.
    Declaration {
        recipient: EntityId,
        location: EntityId,
    },

    /// Knowledge implanted at setup, e.g. an entity's knowledge of its own truths.
    Implantation,

    /// Misremembered evidence. Keeps the kind the evidence originally had.
    Mutation { previous: Box<EvidenceKind> },
}

impl EvidenceKind {
    /// Short tag for this kind, ignoring any mutation wrapper.
    pub fn tag(&self) -> &'static str {
        match self {
            EvidenceKind::Statement { .. } => "statement",
            EvidenceKind::Observation { .. } => "observation",
            EvidenceKind::Overheard { .. } => "overheard",
            EvidenceKind::Declaration { .. } => "declaration",
            EvidenceKind::Implantation => "implantation",
            EvidenceKind::Mutation { previous } => previous.tag(),
        }
    }

    /// The original kind beneath any number of mutations.
    pub fn principal(&self) -> &EvidenceKind {
        let mut kind = self;
        while let EvidenceKind::Mutation { previous } = kind {
            kind = &**previous;
        }
        kind
    }
}

/// A single piece of evidence asserting that a facet has `value`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceItem {
    /// The value this evidence supports.
    pub value: ValueId,

    pub kind: EvidenceKind,

    /// Additive weight. Unbounded; chosen by whoever creates the evidence.
    pub strength: f32,

    /// Opaque payload for the embedding host.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl EvidenceItem {
    /// Create a new piece of evidence of the given kind.
    pub fn new(value: ValueId, kind: EvidenceKind, strength: f32) -> Self {
        Self {
            value,
            kind,
            strength,
            data: serde_json::Value::Null,
        }
    }

    /// Evidence from something `source` said to the holder at `location`.
    pub fn statement(value: ValueId, source: EntityId, location: EntityId, strength: f32) -> Self {
        Self::new(value, EvidenceKind::Statement { source, location }, strength)
    }

    /// Evidence from observing the regarded entity at `location`.
    pub fn observation(value: ValueId, location: EntityId, strength: f32) -> Self {
        Self::new(value, EvidenceKind::Observation { location }, strength)
    }

    /// Evidence implanted at setup.
    pub fn implantation(value: ValueId, strength: f32) -> Self {
        Self::new(value, EvidenceKind::Implantation, strength)
    }

    /// Attach host data.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// The facet this evidence is about.
    pub fn facet(&self) -> &FacetId {
        &self.value.facet
    }

    /// The kind this evidence had before any mutation.
    pub fn principal_kind(&self) -> &EvidenceKind {
        self.kind.principal()
    }

    pub fn is_mutated(&self) -> bool {
        matches!(self.kind, EvidenceKind::Mutation { .. })
    }

    /// The entity that asserted this evidence, if it was said by someone.
    pub fn source(&self) -> Option<EntityId> {
        match self.principal_kind() {
            EvidenceKind::Statement { source, .. } | EvidenceKind::Overheard { source, .. } => {
                Some(*source)
            }
            _ => None,
        }
    }

    /// Re-point this evidence at another value, recording the mutation.
    pub(crate) fn mutate_into(&mut self, value: ValueId) {
        let previous = std::mem::replace(&mut self.kind, EvidenceKind::Implantation);
        self.kind = EvidenceKind::Mutation {
            previous: Box::new(previous),
        };
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_creation() {
        let source = EntityId::new();
        let item = EvidenceItem::statement(
            ValueId::new("favorite music genre", "jazz"),
            source,
            EntityId::nil(),
            100.0,
        );

        assert_eq!(item.strength, 100.0);
        assert_eq!(item.facet(), &FacetId::new("favorite music genre"));
        assert_eq!(item.source(), Some(source));
        assert_eq!(item.kind.tag(), "statement");
        assert!(item.data.is_null());
    }

    #[test]
    fn test_mutation_keeps_principal_kind() {
        let mut item = EvidenceItem::observation(
            ValueId::new("hair color", "red"),
            EntityId::nil(),
            2.0,
        );
        item.mutate_into(ValueId::new("hair color", "brown"));
        item.mutate_into(ValueId::new("hair color", "black"));

        assert!(item.is_mutated());
        assert_eq!(item.value.label, "black");
        assert_eq!(item.kind.tag(), "observation");
        assert!(matches!(
            item.principal_kind(),
            EvidenceKind::Observation { .. }
        ));
        assert_eq!(item.source(), None);
    }

    #[test]
    fn test_with_data() {
        let item = EvidenceItem::implantation(ValueId::new("hair color", "red"), 1.0)
            .with_data(serde_json::json!({ "turn": 3 }));
        assert_eq!(item.data["turn"], 3);
        assert_eq!(item.kind.tag(), "implantation");
    }
}
