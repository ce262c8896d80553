//! Beliefs - what an entity thinks it knows about itself and others.
//!
//! A belief model consists of:
//! - **Evidence items**: weighted, sourced assertions that a facet has some value
//! - **Evidence sets**: all evidence for one facet plus cached strength totals
//! - **Belief models**: one evidence set per facet of the regarded entity

mod evidence;
mod model;

pub use evidence::*;
pub use model::*;
