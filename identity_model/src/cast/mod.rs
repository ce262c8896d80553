//! The cast - the catalog plus every entity taking part in a simulation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::beliefs::BeliefModel;
use crate::entities::{Entity, EntityId};
use crate::error::{CatalogError, Result};
use crate::facets::FacetCatalog;

/// Owns all entities of a simulation along with the facet catalog they draw from.
///
/// Other layers refer to entities by [`EntityId`] and reach them through the cast.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cast {
    pub catalog: FacetCatalog,

    entities: HashMap<EntityId, Entity>,

    /// Names are unique; belief models are keyed by them.
    names: HashMap<String, EntityId>,
}

impl Cast {
    /// Create an empty cast over a catalog.
    pub fn new(catalog: FacetCatalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    /// Add an entity. Its name must be unique and its truths must be catalog values.
    pub fn add_entity(&mut self, entity: Entity) -> Result<EntityId> {
        if self.names.contains_key(&entity.name) {
            return Err(CatalogError::DuplicateEntity(entity.name));
        }
        for facet in entity.relevant_facets() {
            if let Some(truth) = entity.facet_truth(facet) {
                if !self.catalog.contains_value(truth) {
                    return Err(CatalogError::UnknownValue(truth.clone()));
                }
            }
        }

        let id = entity.id;
        tracing::debug!(entity = %id, name = %entity.name, "entity joined the cast");
        self.names.insert(entity.name.clone(), id);
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Get entity by ID.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Get mutable entity by ID.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Entity> {
        self.get(self.id_of(name)?)
    }

    pub fn id_of(&self, name: &str) -> Option<EntityId> {
        self.names.get(name).copied()
    }

    /// Iterate over every entity, in no particular order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn entity(&self, id: EntityId) -> Result<&Entity> {
        self.get(id).ok_or(CatalogError::UnknownEntity(id))
    }

    fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity> {
        self.entities
            .get_mut(&id)
            .ok_or(CatalogError::UnknownEntity(id))
    }

    /// Give an entity a model of itself, optionally seeded with its own truths.
    ///
    /// Replaces any self-model it already held.
    pub fn form_reflexive_model(&mut self, id: EntityId, seed_strength: Option<f32>) -> Result<()> {
        let entity = self.entity(id)?;
        let mut model = BeliefModel::reflexive(entity);
        if let Some(strength) = seed_strength {
            model.seed_with_truths(entity, strength);
        }
        self.entity_mut(id)?.hold_model(model);
        Ok(())
    }

    /// Give `holder` an empty evidence-based model of `regarding`.
    ///
    /// Replaces any model `holder` already held about `regarding`.
    pub fn form_evidence_model(&mut self, holder: EntityId, regarding: EntityId) -> Result<()> {
        let model = BeliefModel::evidentiary(self.entity(holder)?, self.entity(regarding)?);
        self.entity_mut(holder)?.hold_model(model);
        Ok(())
    }

    /// The model `holder` has of `regarding`.
    pub fn beliefs_of(&self, holder: EntityId, regarding: EntityId) -> Option<&BeliefModel> {
        let name = &self.get(regarding)?.name;
        self.get(holder)?.model_of(name)
    }

    pub fn beliefs_of_mut(
        &mut self,
        holder: EntityId,
        regarding: EntityId,
    ) -> Option<&mut BeliefModel> {
        let name = self.get(regarding)?.name.clone();
        self.get_mut(holder)?.model_of_mut(&name)
    }
}
