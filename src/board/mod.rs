//! Board and tile model.
//!
//! ## Key Types
//!
//! - `Board`: the grid plus pawn, aura, and direct-effect logs
//! - `Tile`: one cell with derived ownership and occupant state
//! - `PawnDelta`, `EffectAura`, `DirectEffect`: log records
//! - `TileView`: read-only descriptor for outside collaborators

pub mod logs;
pub mod state;
pub mod tile;

pub use logs::{DirectEffect, EffectAura, HandGrant, PawnDelta};
pub use state::{create_initial_board, Board};
pub use tile::{Origin, SpawnContext, Tile, TileView, TriggerState};
