//! Append-only board logs.
//!
//! Tile ownership is never mutated directly: pawn influence is logged as
//! `PawnDelta` records and folded over `base_influence` on recompute.
//! Standing zones of effect are `EffectAura` records anchored by geometry;
//! one-shot on-play modifiers against an occupant are `DirectEffect`s.

use serde::{Deserialize, Serialize};

use crate::cards::CardId;
use crate::core::{Position, Side};

/// A logged, signed influence contribution (positive favours `You`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PawnDelta {
    pub position: Position,
    pub source: CardId,
    pub amount: i32,
}

/// A standing effect zone projected by a card's `E`/`X` cells.
///
/// Survives independently of the source's occupancy; only the destruction
/// cleanup of its source removes it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectAura {
    pub position: Position,
    pub source: CardId,
    /// Where the source was placed.
    pub source_position: Position,
    /// Side of the source when the aura was registered.
    pub source_side: Side,
    pub description: String,
}

/// A one-shot power modifier applied to the occupant of a tile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectEffect {
    pub source: CardId,
    pub source_position: Position,
    pub amount: i32,
}

/// A card granted to a side's hand by an `add_to_hand` operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandGrant {
    pub side: Side,
    pub card_id: CardId,
    pub source: CardId,
}
