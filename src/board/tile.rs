//! Tile state.
//!
//! A `Tile` is one cell of the board. Ownership and rank are derived from
//! influence logs by `Board::recompute_influence_from_deltas`; everything
//! else here belongs to the current occupant and is reset whenever the
//! occupant changes.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::CardId;
use crate::core::{Position, Side, COLS};

/// Per-occupant trigger bookkeeping.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerState {
    pub first_enhanced_fired: bool,
    pub first_enfeebled_fired: bool,
    /// Threshold values already crossed by this occupant.
    pub thresholds_fired: SmallVec<[i32; 2]>,
}

impl TriggerState {
    /// Whether a threshold value has already fired.
    #[must_use]
    pub fn threshold_fired(&self, value: i32) -> bool {
        self.thresholds_fired.contains(&value)
    }

    /// Record a threshold crossing.
    pub fn mark_threshold(&mut self, value: i32) {
        if !self.threshold_fired(value) {
            self.thresholds_fired.push(value);
        }
    }
}

/// Recorded when a token is spawned onto a tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnContext {
    /// Rank of the tile the token replaced, or 0 when not tracked.
    pub replaced_pawns: u8,
}

/// How the current occupant arrived.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// Played from a hand.
    Played,
    /// Spawned by another card's effect.
    Token { spawned_by: CardId },
}

/// A single board tile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub owner: Side,
    pub rank: u8,
    pub card_id: Option<CardId>,
    /// Side that placed the occupant. Recompute never overrides it.
    pub placed_by: Option<Side>,
    pub origin: Option<Origin>,
    base_influence: i32,
    pub power_delta: i32,
    pub scale_delta: i32,
    pub trigger_state: TriggerState,
    pub spawn_context: Option<SpawnContext>,
}

impl Tile {
    /// Starting tile for a column: home columns are owned at rank 1.
    #[must_use]
    pub fn initial(col: usize) -> Self {
        let base_influence = if col == 0 {
            1
        } else if col == COLS - 1 {
            -1
        } else {
            0
        };
        Self {
            owner: Side::from_influence(base_influence),
            rank: base_influence.unsigned_abs() as u8,
            card_id: None,
            placed_by: None,
            origin: None,
            base_influence,
            power_delta: 0,
            scale_delta: 0,
            trigger_state: TriggerState::default(),
            spawn_context: None,
        }
    }

    /// Fixed influence this tile starts with.
    #[must_use]
    pub fn base_influence(&self) -> i32 {
        self.base_influence
    }

    /// Whether a card occupies this tile.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.card_id.is_some()
    }

    /// Install a new occupant, resetting all per-occupant state.
    pub(crate) fn occupy(&mut self, card_id: CardId, side: Side, origin: Origin) {
        self.card_id = Some(card_id);
        self.placed_by = Some(side);
        self.owner = side;
        self.origin = Some(origin);
        self.power_delta = 0;
        self.scale_delta = 0;
        self.trigger_state = TriggerState::default();
        self.spawn_context = None;
    }

    /// Remove the occupant and every piece of occupant state.
    pub(crate) fn vacate(&mut self) -> Option<CardId> {
        self.placed_by = None;
        self.origin = None;
        self.power_delta = 0;
        self.scale_delta = 0;
        self.trigger_state = TriggerState::default();
        self.spawn_context = None;
        self.card_id.take()
    }
}

/// Read-only tile descriptor for legality and rendering collaborators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileView {
    pub position: Position,
    pub owner: Side,
    pub rank: u8,
    pub card_id: Option<CardId>,
    pub has_auras: bool,
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.card_id {
            Some(id) => write!(f, "[{}]", id.as_str()),
            None => write!(f, "[{}{}]", self.owner, self.rank),
        }
    }
}
