//! Facets, their values, and how values drift when misremembered.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entities::EntityId;
use crate::error::{CatalogError, Result};

/// A named axis of identity, e.g. "hair color" or "favorite music genre".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FacetId(pub String);

impl FacetId {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FacetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a single facet value: `facet × label`.
///
/// Values are referenced by entities and belief models through this key; the
/// definition (including the mutation rule) lives in the [`FacetCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValueId {
    pub facet: FacetId,
    pub label: String,
}

impl ValueId {
    pub fn new(facet: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            facet: FacetId::new(facet),
            label: label.into(),
        }
    }

    /// The facet this value belongs to.
    pub fn facet(&self) -> &FacetId {
        &self.facet
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl std::fmt::Display for ValueId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

/// How a value picks its replacement when a piece of evidence mutates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum MutationRule {
    /// Any other value of the facet, uniformly.
    #[default]
    Uniform,
    /// Sibling labels with relative weights. Entries with a non-positive weight never win.
    Weighted(Vec<(String, f32)>),
}

/// Definition of one value inside a facet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueDef {
    pub id: ValueId,
    pub mutation: MutationRule,
}

/// Definition of a facet: its identity and its ordered set of values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetDef {
    pub id: FacetId,
    values: Vec<ValueDef>,
}

impl FacetDef {
    /// All value identities of this facet, in definition order.
    pub fn values(&self) -> impl Iterator<Item = &ValueId> {
        self.values.iter().map(|v| &v.id)
    }

    /// Look up a value definition by label.
    pub fn value(&self, label: &str) -> Option<&ValueDef> {
        self.values.iter().find(|v| v.id.label == label)
    }

    fn value_mut(&mut self, label: &str) -> Option<&mut ValueDef> {
        self.values.iter_mut().find(|v| v.id.label == label)
    }

    /// Number of values in the facet.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The registry of every facet and value known to a simulation.
///
/// Facets are defined with their whole value set first; mutation rules are
/// attached afterwards by label, so a value may name siblings defined after it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacetCatalog {
    facets: BTreeMap<FacetId, FacetDef>,
}

impl FacetCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a facet and all of its values, each with a [`MutationRule::Uniform`] rule.
    pub fn define_facet<I, S>(&mut self, label: impl Into<String>, values: I) -> Result<FacetId>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = FacetId::new(label);
        if self.facets.contains_key(&id) {
            return Err(CatalogError::DuplicateFacet(id));
        }

        let mut defs: Vec<ValueDef> = Vec::new();
        for value in values {
            let value_id = ValueId {
                facet: id.clone(),
                label: value.into(),
            };
            if defs.iter().any(|d| d.id == value_id) {
                return Err(CatalogError::DuplicateValue(value_id));
            }
            defs.push(ValueDef {
                id: value_id,
                mutation: MutationRule::Uniform,
            });
        }

        self.facets.insert(
            id.clone(),
            FacetDef {
                id: id.clone(),
                values: defs,
            },
        );
        Ok(id)
    }

    /// Attach a mutation rule to an already defined value.
    ///
    /// Weighted targets must be siblings in the same facet and must not be the value itself.
    pub fn set_mutation_rule(&mut self, value: &ValueId, rule: MutationRule) -> Result<()> {
        let facet = self
            .facets
            .get_mut(&value.facet)
            .ok_or_else(|| CatalogError::UnknownFacet(value.facet.clone()))?;

        if let MutationRule::Weighted(targets) = &rule {
            for (target, _) in targets {
                if *target == value.label || facet.value(target).is_none() {
                    return Err(CatalogError::InvalidMutationTarget {
                        value: value.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        let def = facet
            .value_mut(&value.label)
            .ok_or_else(|| CatalogError::UnknownValue(value.clone()))?;
        def.mutation = rule;
        Ok(())
    }

    /// Get a facet definition.
    pub fn facet(&self, id: &FacetId) -> Option<&FacetDef> {
        self.facets.get(id)
    }

    /// Get a value definition.
    pub fn value(&self, id: &ValueId) -> Option<&ValueDef> {
        self.facets.get(&id.facet)?.value(&id.label)
    }

    /// Check whether a value is defined.
    pub fn contains_value(&self, id: &ValueId) -> bool {
        self.value(id).is_some()
    }

    /// Iterate over all facets in identifier order.
    pub fn facets(&self) -> impl Iterator<Item = &FacetDef> {
        self.facets.values()
    }

    /// Draw the value a piece of evidence drifts to when misremembered.
    ///
    /// The result is always a different value of the same facet. `holder` and
    /// `evidence_index` identify the piece of evidence being mutated.
    pub fn try_mutate<R: Rng + ?Sized>(
        &self,
        value: &ValueId,
        holder: EntityId,
        evidence_index: usize,
        rng: &mut R,
    ) -> Result<ValueId> {
        let facet = self
            .facets
            .get(&value.facet)
            .ok_or_else(|| CatalogError::UnknownFacet(value.facet.clone()))?;
        let def = facet
            .value(&value.label)
            .ok_or_else(|| CatalogError::UnknownValue(value.clone()))?;
        let exhausted = || CatalogError::NoMutationTarget {
            value: value.clone(),
        };

        let target = match &def.mutation {
            MutationRule::Uniform => {
                let others: Vec<&ValueDef> =
                    facet.values.iter().filter(|v| v.id != *value).collect();
                others.choose(rng).map(|v| v.id.clone()).ok_or_else(exhausted)?
            }
            MutationRule::Weighted(targets) => {
                let (label, _) = targets
                    .choose_weighted(rng, |(_, weight)| weight.max(0.0))
                    .map_err(|_| exhausted())?;
                ValueId {
                    facet: value.facet.clone(),
                    label: label.clone(),
                }
            }
        };

        tracing::trace!(
            holder = %holder,
            evidence = evidence_index,
            from = %value,
            to = %target,
            "evidence mutated"
        );
        Ok(target)
    }
}
