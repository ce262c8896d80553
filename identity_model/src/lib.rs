//! # Identity Model
//!
//! The ground truth and belief layer of the simulation. This crate defines which
//! facets of identity exist, which values each facet can take, what every entity
//! actually is, and what each entity believes about itself and the others.
//!
//! ## Core Components
//!
//! - **facets**: The facet catalog, value identities and stochastic mutation rules
//! - **entities**: Entities with their ground truths and the belief models they hold
//! - **cast**: The registry of all entities taking part in a simulation
//! - **beliefs**: Evidence items, evidence sets and belief models
//!
//! Beliefs only ever change through evidence. Derived state (total strengths and
//! the strongest value per facet) is cached and recomputed on request, so callers
//! can batch several inserts before paying for one recomputation.

pub mod beliefs;
pub mod cast;
pub mod entities;
pub mod error;
pub mod facets;

pub use beliefs::*;
pub use cast::*;
pub use entities::*;
pub use error::*;
pub use facets::*;
