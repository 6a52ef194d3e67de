//! HTTP surface over the engine: game lifecycle, legal-move queries, moves
//! and undo.

pub mod errors;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
