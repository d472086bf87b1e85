//! Pattern projection onto the board.
//!
//! A placed card's projection cells map to absolute tiles. `You` adds the
//! column offset; `Enemy` subtracts it, mirroring the pattern horizontally.
//! Off-board cells are dropped and the implicit placement cell is never a
//! target.
//!
//! ## Mirror property
//!
//! The enemy projection of a placement at `(lane, 4 - col)` is the column
//! mirror of the `You` projection at `(lane, col)`.

use smallvec::SmallVec;

use crate::board::{Board, EffectAura};
use crate::cards::{Card, Symbol};
use crate::core::{Position, Side};

/// One absolute projection target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProjectionTarget {
    pub position: Position,
    pub symbol: Symbol,
}

/// Targets of a single placement, in pattern order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectionResult {
    pub root: Position,
    pub targets: SmallVec<[ProjectionTarget; 8]>,
}

impl ProjectionResult {
    /// Targets carrying pawn influence (`P`/`X`).
    pub fn pawn_targets(&self) -> impl Iterator<Item = Position> + '_ {
        self.targets
            .iter()
            .filter(|t| t.symbol.carries_pawn())
            .map(|t| t.position)
    }

    /// Targets carrying the card's effect (`E`/`X`).
    pub fn effect_targets(&self) -> impl Iterator<Item = Position> + '_ {
        self.targets
            .iter()
            .filter(|t| t.symbol.carries_effect())
            .map(|t| t.position)
    }
}

fn project(lane: usize, col: usize, card: &Card, col_sign: i32) -> ProjectionResult {
    let root = Position::new(lane, col);
    let targets = card
        .projection_cells
        .iter()
        .filter(|cell| cell.symbol != Symbol::Placement)
        .filter_map(|cell| {
            root.offset(cell.row_offset, col_sign * cell.col_offset)
                .map(|position| ProjectionTarget {
                    position,
                    symbol: cell.symbol,
                })
        })
        .collect();
    ProjectionResult { root, targets }
}

/// Projection for a `You` placement at `(lane, col)`.
///
/// ```
/// use lane_kernel::cards::Card;
/// use lane_kernel::core::Position;
/// use lane_kernel::projection::compute_projection_targets;
///
/// let card = Card::new("001", "Officer", 1, 1, "B3P,A3P").unwrap();
/// let proj = compute_projection_targets(1, 3, &card);
/// // A3P would land on column 5 and is dropped.
/// assert_eq!(proj.targets.len(), 1);
/// assert_eq!(proj.targets[0].position, Position::new(1, 4));
/// ```
#[must_use]
pub fn compute_projection_targets(lane: usize, col: usize, card: &Card) -> ProjectionResult {
    project(lane, col, card, 1)
}

/// Projection for an `Enemy` placement: columns mirrored.
#[must_use]
pub fn compute_projection_targets_for_enemy(
    lane: usize,
    col: usize,
    card: &Card,
) -> ProjectionResult {
    project(lane, col, card, -1)
}

/// Projection for whichever side placed the card. `Neutral` projects like `You`.
#[must_use]
pub fn projection_for_side(lane: usize, col: usize, card: &Card, side: Side) -> ProjectionResult {
    match side {
        Side::Enemy => compute_projection_targets_for_enemy(lane, col, card),
        Side::You | Side::Neutral => compute_projection_targets(lane, col, card),
    }
}

/// Effect ids whose cards project supercharged pawns, with the pawn count
/// per `P`/`X` cell. Their `on_play` is satisfied by projection alone.
const SUPERCHARGED_PAWNS: [(&str, i32); 2] = [
    ("on_play_raise_positions_rank_2", 2),
    ("on_play_raise_positions_rank_3", 3),
];

fn supercharged_amount(card: &Card) -> Option<i32> {
    let id = card.effect_id.as_deref()?;
    SUPERCHARGED_PAWNS
        .iter()
        .find(|(effect, _)| *effect == id)
        .map(|(_, amount)| *amount)
}

/// Pawns a card adds per `P`/`X` cell: 1, or more for supercharged cards.
#[must_use]
pub fn pawn_amount_for_card(card: &Card) -> i32 {
    supercharged_amount(card).unwrap_or(1)
}

/// Whether the card's pawn projection already carries its `on_play` effect.
#[must_use]
pub fn projects_supercharged_pawns(card: &Card) -> bool {
    supercharged_amount(card).is_some()
}

fn apply_pawns(board: &mut Board, proj: &ProjectionResult, card: &Card, side: Side) {
    let amount = pawn_amount_for_card(card) * side.influence_sign();
    for pos in proj.pawn_targets() {
        board.add_pawn_delta(pos, card.id.clone(), amount);
    }
    board.recompute_influence_from_deltas();
}

/// Log `You` pawns on every `P`/`X` target, then recompute ownership.
pub fn apply_pawns_for_you(board: &mut Board, proj: &ProjectionResult, card: &Card) {
    apply_pawns(board, proj, card, Side::You);
}

/// Log `Enemy` pawns on every `P`/`X` target, then recompute ownership.
pub fn apply_pawns_for_enemy(board: &mut Board, proj: &ProjectionResult, card: &Card) {
    apply_pawns(board, proj, card, Side::Enemy);
}

fn apply_effects(board: &mut Board, proj: &ProjectionResult, card: &Card, side: Side) {
    for pos in proj.effect_targets() {
        board.add_effect_aura(EffectAura {
            position: pos,
            source: card.id.clone(),
            source_position: proj.root,
            source_side: side,
            description: card.effect_description().to_string(),
        });
    }
}

/// Register a `You` aura on every `E`/`X` target, occupied or not.
pub fn apply_effects_for_you(board: &mut Board, proj: &ProjectionResult, card: &Card) {
    apply_effects(board, proj, card, Side::You);
}

/// Register an `Enemy` aura on every `E`/`X` target, occupied or not.
pub fn apply_effects_for_enemy(board: &mut Board, proj: &ProjectionResult, card: &Card) {
    apply_effects(board, proj, card, Side::Enemy);
}
