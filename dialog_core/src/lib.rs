//! # Dialog Core
//!
//! Turn-based conversations between two entities of an `identity_model` cast.
//! Utterances are composed from a graph of move definitions; what gets said
//! each turn is decided by the speaker's obligations, the open topics and the
//! conversation's goals. Move effects feed evidence back into belief models.
//!
//! ## Core Components
//!
//! - **moves**: Move tags, move definitions and the validated move graph
//! - **obligations**: Per-participant duties with urgency and time to live
//! - **topics**: Topic introduction and addressing
//! - **goals**: What a conversation wants to achieve, and when it is done
//! - **conversation**: Participants, history and the callback contexts
//! - **engine**: The `DialogManager` stepping conversations turn by turn
//!
//! Moves never mutate the live conversation. Effects are recorded on the
//! pending history entry and merged in one commit after the move is realized.

pub mod config;
pub mod conversation;
pub mod engine;
pub mod error;
pub mod goals;
pub mod moves;
pub mod obligations;
pub mod topics;

pub use config::*;
pub use conversation::*;
pub use engine::*;
pub use error::*;
pub use goals::*;
pub use moves::*;
pub use obligations::*;
pub use topics::*;
