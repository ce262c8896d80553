//! Error types for the identity model.

use thiserror::Error;

use crate::entities::EntityId;
use crate::facets::{FacetId, ValueId};

/// Errors raised while building catalogs and casts, or while drawing mutations.
///
/// All of these are configuration errors: they are detected when data is
/// registered and indicate a broken setup rather than a transient condition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("facet '{0}' is already defined")]
    DuplicateFacet(FacetId),

    #[error("value '{}' is defined twice for facet '{}'", .0.label, .0.facet)]
    DuplicateValue(ValueId),

    #[error("facet '{0}' is not in the catalog")]
    UnknownFacet(FacetId),

    #[error("value '{}' of facet '{}' is not in the catalog", .0.label, .0.facet)]
    UnknownValue(ValueId),

    /// The facet has no sibling value to mutate into.
    #[error("value '{}' has no other value to mutate into", .value.label)]
    NoMutationTarget { value: ValueId },

    #[error("mutation target '{target}' is not a sibling of '{}'", .value.label)]
    InvalidMutationTarget { value: ValueId, target: String },

    #[error("an entity named '{0}' already exists")]
    DuplicateEntity(String),

    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
