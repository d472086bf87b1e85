//! # lane-kernel
//!
//! A deterministic rules kernel for a lane-control card placement game on
//! a 3-lane by 5-column board.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: No clocks, no randomness, no hash-ordered output.
//!    Fixed card data and a fixed placement sequence always produce the
//!    same board and the same score.
//!
//! 2. **Logs Over Mutation**: Tile ownership is derived from append-only
//!    pawn-delta logs; effect zones are append-only aura records.
//!
//! 3. **Explicit Collaborators**: Card and effect data are injected through
//!    the `CardSource` and `EffectSource` traits. No global defaults.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: Board logs use `im` so speculative
//!   search can clone a `Board` in O(1) and mutate the copy freely.
//!
//! - **Validated Schema**: Effect registry entries become typed `EffectOp`
//!   values at load time; an unregistered effect id is simply "no effect".
//!
//! ## Modules
//!
//! - `core`: Sides, positions, board geometry
//! - `cards`: Card records, pattern notation, card registry
//! - `board`: Tiles, logs, ownership derivation
//! - `projection`: Pattern projection with side mirroring
//! - `effects`: Effect schema, registry, and resolution engine
//! - `scoring`: Lane and match scoring
//! - `rules`: Legality and the placement pipeline

pub mod core;
pub mod error;
pub mod cards;
pub mod board;
pub mod projection;
pub mod effects;
pub mod scoring;
pub mod rules;

// Re-export commonly used types
pub use crate::core::{Position, Side, COLS, LANES, MAX_RANK};

pub use crate::error::{Error, PatternFault, Result};

pub use crate::cards::{Card, CardId, CardRegistry, CardSource, ProjectionCell, Symbol};

pub use crate::board::{
    create_initial_board, Board, DirectEffect, EffectAura, HandGrant, PawnDelta, Tile, TileView,
};

pub use crate::projection::{
    compute_projection_targets, compute_projection_targets_for_enemy, ProjectionResult,
    ProjectionTarget,
};

pub use crate::effects::{
    EffectDef, EffectEngine, EffectOp, EffectRegistry, EffectSource, Scope, Trigger,
};

pub use crate::scoring::{compute_lane_power, compute_match_score, LaneScore, MatchScore};

pub use crate::rules::{is_legal_placement, play_card};
