//! Belief models - per-facet evidence and the best-supported value derived from it.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::EvidenceItem;
use crate::entities::{Entity, EntityId};
use crate::error::Result;
use crate::facets::{FacetCatalog, FacetId, ValueId};

/// All evidence about one facet, in insertion order, plus cached aggregates.
///
/// The caches are not touched by inserts. Call
/// [`recompute_total_strength`](EvidenceSet::recompute_total_strength) and then
/// [`recompute_strongest`](EvidenceSet::recompute_strongest) after mutating.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvidenceSet {
    items: Vec<EvidenceItem>,
    total_strength: HashMap<ValueId, f32>,
    strongest: Option<ValueId>,
}

impl EvidenceSet {
    pub fn items(&self) -> &[EvidenceItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Cached strength per value, as of the last recomputation.
    pub fn total_strength(&self) -> &HashMap<ValueId, f32> {
        &self.total_strength
    }

    /// Cached strength of a single value (0.0 if it has none).
    pub fn strength_of(&self, value: &ValueId) -> f32 {
        self.total_strength.get(value).copied().unwrap_or(0.0)
    }

    /// Cached best-supported value, as of the last recomputation.
    pub fn strongest(&self) -> Option<&ValueId> {
        self.strongest.as_ref()
    }

    fn push(&mut self, item: EvidenceItem) {
        self.items.push(item);
    }

    /// Sum evidence strength grouped by asserted value.
    pub fn recompute_total_strength(&mut self) {
        self.total_strength.clear();
        for item in &self.items {
            *self.total_strength.entry(item.value.clone()).or_insert(0.0) += item.strength;
        }
    }

    /// Pick the value with the greatest positive total strength.
    ///
    /// Ties go to the value whose first supporting evidence was inserted earliest.
    pub fn recompute_strongest(&mut self) {
        let mut best: Option<(&ValueId, f32)> = None;
        let mut seen: Vec<&ValueId> = Vec::new();

        for item in &self.items {
            if seen.contains(&&item.value) {
                continue;
            }
            seen.push(&item.value);

            let total = self.strength_of(&item.value);
            if total <= 0.0 {
                continue;
            }
            match best {
                Some((_, best_total)) if best_total >= total => {}
                _ => best = Some((&item.value, total)),
            }
        }

        self.strongest = best.map(|(value, _)| value.clone());
    }

    /// Move all evidence for `from` over to `into` and recompute total strengths.
    ///
    /// Leaves `from` with no evidence. The strongest value is **not**
    /// recomputed. Returns how many items moved.
    pub fn merge_values(&mut self, into: &ValueId, from: &ValueId) -> usize {
        if into == from {
            return 0;
        }
        if into.facet != from.facet {
            tracing::debug!(into = %into, from = %from, "cannot merge values of different facets");
            return 0;
        }

        let mut moved = 0;
        for item in self.items.iter_mut().filter(|item| item.value == *from) {
            item.value = into.clone();
            moved += 1;
        }
        self.recompute_total_strength();
        moved
    }

    /// Remove the item at `index`, keeping the order of the rest.
    ///
    /// Caches are **not** recomputed.
    pub fn remove(&mut self, index: usize) -> Option<EvidenceItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }
}

/// A read-only view of one facet's derived belief.
#[derive(Debug, Clone, Copy)]
pub struct FacetBelief<'a> {
    /// `None` means the holder doesn't know.
    pub strongest: Option<&'a ValueId>,
    pub total_strength: &'a HashMap<ValueId, f32>,
}

/// Whether a model is about its holder or about someone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    Reflexive,
    Evidentiary,
}

/// What `holder` believes about `regarding`, one evidence set per relevant facet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeliefModel {
    pub holder: EntityId,
    pub regarding: EntityId,
    regarding_name: String,

    /// Facet order for iteration; every entry has an evidence set.
    facets: Vec<FacetId>,
    evidence: HashMap<FacetId, EvidenceSet>,
}

impl BeliefModel {
    /// Create a model an entity holds about itself. Starts empty; see
    /// [`seed_with_truths`](BeliefModel::seed_with_truths).
    pub fn reflexive(entity: &Entity) -> Self {
        Self::over(entity.id, entity)
    }

    /// Create an evidence-based model `holder` holds about `regarding`.
    pub fn evidentiary(holder: &Entity, regarding: &Entity) -> Self {
        Self::over(holder.id, regarding)
    }

    fn over(holder: EntityId, regarding: &Entity) -> Self {
        let facets = regarding.relevant_facets().to_vec();
        let evidence = facets
            .iter()
            .map(|facet| (facet.clone(), EvidenceSet::default()))
            .collect();
        Self {
            holder,
            regarding: regarding.id,
            regarding_name: regarding.name.clone(),
            facets,
            evidence,
        }
    }

    pub fn kind(&self) -> ModelKind {
        if self.holder == self.regarding {
            ModelKind::Reflexive
        } else {
            ModelKind::Evidentiary
        }
    }

    /// Name of the entity this model is about.
    pub fn regarding_name(&self) -> &str {
        &self.regarding_name
    }

    /// Append evidence to the set for its facet.
    ///
    /// Does **not** recompute total strengths nor the strongest beliefs.
    pub fn insert(&mut self, item: EvidenceItem) {
        let facet = item.facet().clone();
        if !self.evidence.contains_key(&facet) {
            tracing::debug!(
                holder = %self.holder,
                regarding = %self.regarding_name,
                facet = %facet,
                "evidence for a facet outside the regarded entity's facets"
            );
            self.facets.push(facet.clone());
        }
        self.evidence.entry(facet).or_default().push(item);
    }

    pub fn recompute_total_strengths(&mut self) {
        for set in self.evidence.values_mut() {
            set.recompute_total_strength();
        }
    }

    pub fn recompute_strongest(&mut self) {
        for set in self.evidence.values_mut() {
            set.recompute_strongest();
        }
    }

    /// Recompute totals and then the strongest value for every facet.
    pub fn recompute(&mut self) {
        self.recompute_total_strengths();
        self.recompute_strongest();
    }

    /// Iterate over (facet, derived belief) for every facet, in facet order.
    pub fn iter_facets(&self) -> impl Iterator<Item = (&FacetId, FacetBelief<'_>)> + '_ {
        self.facets.iter().filter_map(move |facet| {
            let set = self.evidence.get(facet)?;
            Some((
                facet,
                FacetBelief {
                    strongest: set.strongest(),
                    total_strength: set.total_strength(),
                },
            ))
        })
    }

    /// The evidence set for a facet.
    pub fn evidence_for(&self, facet: &FacetId) -> Option<&EvidenceSet> {
        self.evidence.get(facet)
    }

    /// The cached best-supported value for a facet.
    pub fn strongest_belief(&self, facet: &FacetId) -> Option<&ValueId> {
        self.evidence.get(facet)?.strongest()
    }

    /// Total number of evidence items across all facets.
    pub fn evidence_count(&self) -> usize {
        self.evidence.values().map(EvidenceSet::len).sum()
    }

    /// Implant one piece of evidence per truth of `entity` and recompute.
    ///
    /// Used to give a reflexive model its holder's own truths.
    pub fn seed_with_truths(&mut self, entity: &Entity, strength: f32) {
        for facet in entity.relevant_facets() {
            if let Some(truth) = entity.facet_truth(facet) {
                self.insert(EvidenceItem::implantation(truth.clone(), strength));
            }
        }
        self.recompute();
    }

    /// Let evidence drift: each item mutates with probability `chance`.
    ///
    /// Every replacement is drawn before any item changes, so an error leaves
    /// the model untouched. Returns how many items mutated. Caches are **not**
    /// recomputed.
    pub fn mutate<R: Rng + ?Sized>(
        &mut self,
        catalog: &FacetCatalog,
        chance: f64,
        rng: &mut R,
    ) -> Result<usize> {
        let chance = chance.clamp(0.0, 1.0);
        let mut drawn: Vec<(FacetId, usize, ValueId)> = Vec::new();

        for facet in &self.facets {
            let Some(set) = self.evidence.get(facet) else {
                continue;
            };
            for (index, item) in set.items.iter().enumerate() {
                if rng.gen_bool(chance) {
                    let value = catalog.try_mutate(&item.value, self.holder, index, rng)?;
                    drawn.push((facet.clone(), index, value));
                }
            }
        }

        let mutated = drawn.len();
        for (facet, index, value) in drawn {
            if let Some(item) = self
                .evidence
                .get_mut(&facet)
                .and_then(|set| set.items.get_mut(index))
            {
                item.mutate_into(value);
            }
        }
        Ok(mutated)
    }

    /// Move all evidence for `from` over to `into` and recompute that facet's totals.
    ///
    /// Returns how many items moved. See [`EvidenceSet::merge_values`].
    pub fn merge_values(&mut self, into: &ValueId, from: &ValueId) -> usize {
        self.evidence
            .get_mut(&into.facet)
            .map_or(0, |set| set.merge_values(into, from))
    }

    /// Remove one piece of evidence for `facet`. Caches are **not** recomputed.
    pub fn remove_evidence(&mut self, facet: &FacetId, index: usize) -> Option<EvidenceItem> {
        self.evidence.get_mut(facet)?.remove(index)
    }
}
