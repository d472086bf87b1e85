//! Legality checks and the full placement pipeline.
//!
//! ## Pipeline
//!
//! 1. Legality (`IllegalPlacement` on failure)
//! 2. Place and fire on-play, or run the replace-ally protocol
//! 3. Side-specific projection: pawns then auras
//! 4. Influence recompute
//! 5. `on_card_played` watchers

use log::debug;

use crate::board::Board;
use crate::cards::Card;
use crate::core::{Position, Side};
use crate::effects::{EffectEngine, EffectOp};
use crate::error::{Error, Result};
use crate::projection::{
    apply_effects_for_enemy, apply_effects_for_you, apply_pawns_for_enemy, apply_pawns_for_you,
    projection_for_side,
};

/// Whether the card replaces an ally instead of taking an empty tile.
fn replaces_ally(engine: &EffectEngine<'_>, card: &Card) -> bool {
    engine.get_effect_for_card(card).is_some_and(|effect| {
        effect
            .operations
            .iter()
            .any(|op| matches!(op, EffectOp::ReplaceAlly { .. }))
    })
}

fn check_placement(
    board: &Board,
    engine: &EffectEngine<'_>,
    lane: usize,
    col: usize,
    card: &Card,
    side: Side,
) -> Result<()> {
    let illegal = |reason: &'static str| Error::IllegalPlacement { lane, col, reason };

    let pos = Position::checked(lane, col).ok_or_else(|| illegal("off the board"))?;
    if !side.is_player() {
        return Err(illegal("neutral cannot place"));
    }
    let tile = board.tile(pos);

    if replaces_ally(engine, card) {
        return match board.side_at(pos) {
            Some(occupant) if occupant == side => Ok(()),
            _ => Err(illegal("replacement needs an allied occupant")),
        };
    }

    if tile.is_occupied() {
        return Err(illegal("tile is occupied"));
    }
    if tile.owner != side {
        return Err(illegal("tile is not owned by the placing side"));
    }
    if tile.rank < card.cost {
        return Err(illegal("tile rank is below card cost"));
    }
    Ok(())
}

/// Whether `side` may play `card` on `(lane, col)`.
///
/// Ordinary cards need an empty tile owned by `side` with rank >= cost.
/// Cards carrying a `replace_ally` operation need an allied occupant.
#[must_use]
pub fn is_legal_placement(
    board: &Board,
    engine: &EffectEngine<'_>,
    lane: usize,
    col: usize,
    card: &Card,
    side: Side,
) -> bool {
    check_placement(board, engine, lane, col, card, side).is_ok()
}

/// Every position where `side` may legally play `card`, row-major.
#[must_use]
pub fn legal_placements(
    board: &Board,
    engine: &EffectEngine<'_>,
    card: &Card,
    side: Side,
) -> Vec<Position> {
    Position::all()
        .filter(|pos| is_legal_placement(board, engine, pos.lane, pos.col, card, side))
        .collect()
}

/// Play `card` for `side` on `(lane, col)` through the full pipeline.
///
/// ## Example
///
/// ```
/// use lane_kernel::board::Board;
/// use lane_kernel::cards::{Card, CardRegistry};
/// use lane_kernel::core::Side;
/// use lane_kernel::effects::{EffectEngine, EffectRegistry};
/// use lane_kernel::rules::play_card;
///
/// let officer = Card::new("001", "Officer", 1, 1, "B3P").unwrap();
/// let mut cards = CardRegistry::new();
/// cards.register(officer.clone());
/// let effects = EffectRegistry::new();
/// let engine = EffectEngine::new(&cards, &effects);
///
/// let mut board = Board::create_initial();
/// play_card(&mut board, &engine, 1, 0, &officer, Side::You).unwrap();
///
/// assert_eq!(board.tile_at(1, 1).owner, Side::You);
/// assert!(play_card(&mut board, &engine, 1, 0, &officer, Side::You).is_err());
/// ```
pub fn play_card(
    board: &mut Board,
    engine: &EffectEngine<'_>,
    lane: usize,
    col: usize,
    card: &Card,
    side: Side,
) -> Result<()> {
    check_placement(board, engine, lane, col, card, side)?;
    debug!("{} plays {} at ({lane}, {col})", side, card.id);

    if replaces_ally(engine, card) {
        engine.replace_ally(board, lane, col, card, side);
    } else {
        board.place_card(lane, col, card, side, Some(engine));
    }

    let proj = projection_for_side(lane, col, card, side);
    match side {
        Side::Enemy => {
            apply_pawns_for_enemy(board, &proj, card);
            apply_effects_for_enemy(board, &proj, card);
        }
        _ => {
            apply_pawns_for_you(board, &proj, card);
            apply_effects_for_you(board, &proj, card);
        }
    }
    board.recompute_influence_from_deltas();

    engine.handle_card_played(board, lane, col, card);
    Ok(())
}
