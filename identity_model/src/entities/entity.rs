//! A simulated agent: ground truths plus the belief models it holds.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::EntityId;
use crate::beliefs::BeliefModel;
use crate::facets::{FacetId, ValueId};

/// An agent with a fixed set of relevant facets and one truth per facet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,

    /// Relevant facets, in the order they were given truths.
    facets: Vec<FacetId>,
    truths: HashMap<FacetId, ValueId>,

    /// Belief models held by this entity, keyed by the name of their subject.
    #[serde(default)]
    models: HashMap<String, BeliefModel>,
}

impl Entity {
    /// Create a new entity with the given name and no facets.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            facets: Vec::new(),
            truths: HashMap::new(),
            models: HashMap::new(),
        }
    }

    /// Give the entity a truth, making the value's facet relevant to it.
    pub fn with_truth(mut self, value: ValueId) -> Self {
        if !self.truths.contains_key(&value.facet) {
            self.facets.push(value.facet.clone());
        }
        self.truths.insert(value.facet.clone(), value);
        self
    }

    /// All facets relevant to this entity. Never changes after setup.
    pub fn relevant_facets(&self) -> &[FacetId] {
        &self.facets
    }

    pub fn is_facet_relevant(&self, facet: &FacetId) -> bool {
        self.truths.contains_key(facet)
    }

    /// The true value of a facet, or `None` if the facet is not relevant.
    pub fn facet_truth(&self, facet: &FacetId) -> Option<&ValueId> {
        self.truths.get(facet)
    }

    /// Replace the truth of a relevant facet, returning the previous value.
    ///
    /// Returns `None` and changes nothing when the facet is not relevant.
    pub fn set_truth(&mut self, value: ValueId) -> Option<ValueId> {
        let truth = self.truths.get_mut(&value.facet)?;
        Some(std::mem::replace(truth, value))
    }

    /// The belief model this entity holds about `subject`.
    pub fn model_of(&self, subject: &str) -> Option<&BeliefModel> {
        self.models.get(subject)
    }

    pub fn model_of_mut(&mut self, subject: &str) -> Option<&mut BeliefModel> {
        self.models.get_mut(subject)
    }

    /// The reflexive model this entity holds about itself.
    pub fn self_model(&self) -> Option<&BeliefModel> {
        self.models.get(&self.name)
    }

    /// Take ownership of a belief model, replacing any model about the same subject.
    pub fn hold_model(&mut self, model: BeliefModel) -> Option<BeliefModel> {
        self.models.insert(model.regarding_name().to_string(), model)
    }

    /// Iterate over every belief model held, as (subject name, model).
    pub fn models(&self) -> impl Iterator<Item = (&str, &BeliefModel)> {
        self.models.iter().map(|(name, model)| (name.as_str(), model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entity() {
        let entity = Entity::new("Ada");
        assert_eq!(entity.name, "Ada");
        assert!(entity.relevant_facets().is_empty());
        assert!(entity.self_model().is_none());
    }

    #[test]
    fn test_truths_define_relevance() {
        let entity = Entity::new("Ada")
            .with_truth(ValueId::new("favorite music genre", "jazz"))
            .with_truth(ValueId::new("hair color", "red"));

        let genre = FacetId::new("favorite music genre");
        assert_eq!(entity.relevant_facets().len(), 2);
        assert_eq!(entity.relevant_facets()[0], genre);
        assert!(entity.is_facet_relevant(&genre));
        assert!(!entity.is_facet_relevant(&FacetId::new("height")));
        assert_eq!(entity.facet_truth(&genre).unwrap().label, "jazz");
        assert!(entity.facet_truth(&FacetId::new("height")).is_none());
    }

    #[test]
    fn test_set_truth() {
        let mut entity = Entity::new("Ada").with_truth(ValueId::new("hair color", "red"));

        let previous = entity.set_truth(ValueId::new("hair color", "grey"));
        assert_eq!(previous.unwrap().label, "red");
        assert_eq!(
            entity.facet_truth(&FacetId::new("hair color")).unwrap().label,
            "grey"
        );

        assert!(entity.set_truth(ValueId::new("height", "tall")).is_none());
        assert!(!entity.is_facet_relevant(&FacetId::new("height")));
    }

    #[test]
    fn test_hold_model() {
        let ada = Entity::new("Ada").with_truth(ValueId::new("hair color", "red"));
        let mut bo = Entity::new("Bo").with_truth(ValueId::new("hair color", "black"));

        assert!(bo.hold_model(BeliefModel::evidentiary(&bo, &ada)).is_none());
        assert!(bo.model_of("Ada").is_some());
        assert!(bo.model_of("Cy").is_none());
        assert_eq!(bo.models().count(), 1);
    }
}
