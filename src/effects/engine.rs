//! The effect resolution engine: power queries and scope resolution.
//!
//! `EffectEngine` is the sole authority for a tile's effective power. It
//! borrows its collaborators (card and effect sources) and never caches
//! anything derived from the board, so every query reflects the live state.
//!
//! ## Effective power
//!
//! ```text
//! base + power_delta + scale_delta
//!      + Σ direct effects on the tile
//!      + Σ while_in_play aura modify_power amounts whose scope admits the occupant
//!      + own while_in_play modify_power
//!      + Σ own while_in_play modify_power_scale snapshots
//! ```
//!
//! Mutation paths (placement, destruction, triggers) live in `resolution`.

use std::cell::Cell;

use log::warn;
use smallvec::SmallVec;

use super::definition::{EffectDef, EffectOp, Locality, Relation, ScaleEvent, Scope, Trigger};
use super::registry::EffectSource;
use crate::board::Board;
use crate::cards::{Card, CardSource};
use crate::core::{Position, Side};
use crate::projection::projection_for_side;

/// Trigger cascades deeper than this are cut off.
pub const MAX_CASCADE_DEPTH: u32 = 32;

/// Occupied positions a firing effect acts on, in deterministic order.
pub type ScopeTargets = SmallVec<[Position; 8]>;

/// Resolves effects against a board.
///
/// ## Example
///
/// ```
/// use lane_kernel::board::Board;
/// use lane_kernel::cards::{Card, CardRegistry};
/// use lane_kernel::core::Side;
/// use lane_kernel::effects::{EffectEngine, EffectRegistry};
///
/// let mut cards = CardRegistry::new();
/// cards.register(Card::new("001", "Officer", 1, 2, "B3P").unwrap());
/// let effects = EffectRegistry::new();
/// let engine = EffectEngine::new(&cards, &effects);
///
/// let mut board = Board::create_initial();
/// let officer = cards.get(&"001".into()).unwrap().clone();
/// board.place_card(1, 0, &officer, Side::You, Some(&engine));
///
/// assert_eq!(engine.compute_effective_power(&board, 1, 0), 2);
/// assert_eq!(engine.compute_effective_power(&board, 1, 1), 0);
/// ```
pub struct EffectEngine<'a> {
    pub(super) cards: &'a dyn CardSource,
    pub(super) effects: &'a dyn EffectSource,
    pub(super) depth: Cell<u32>,
}

/// Holds one level of cascade depth; released on drop.
pub(super) struct CascadeGuard<'e> {
    depth: &'e Cell<u32>,
}

impl Drop for CascadeGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get() - 1);
    }
}

impl<'a> EffectEngine<'a> {
    /// Create an engine over explicit collaborators.
    pub fn new(cards: &'a dyn CardSource, effects: &'a dyn EffectSource) -> Self {
        Self {
            cards,
            effects,
            depth: Cell::new(0),
        }
    }

    /// The card collaborator.
    #[must_use]
    pub fn cards(&self) -> &'a dyn CardSource {
        self.cards
    }

    /// Effect of a card, or `None` when it has no id or the id is unregistered.
    #[must_use]
    pub fn get_effect_for_card(&self, card: &Card) -> Option<&'a EffectDef> {
        let id = card.effect_id.as_deref()?;
        self.effects.get_effect(id)
    }

    /// Enter one cascade level, or `None` when the guard depth is exhausted.
    pub(super) fn enter(&self) -> Option<CascadeGuard<'_>> {
        let depth = self.depth.get();
        if depth >= MAX_CASCADE_DEPTH {
            warn!("effect cascade exceeded depth {MAX_CASCADE_DEPTH}; cutting off");
            return None;
        }
        self.depth.set(depth + 1);
        Some(CascadeGuard { depth: &self.depth })
    }

    /// Card record of the occupant at `pos`.
    pub(super) fn occupant(&self, board: &Board, pos: Position) -> Option<&'a Card> {
        let id = board.tile(pos).card_id.as_ref()?;
        match self.cards.get_card(id) {
            Ok(card) => Some(card),
            Err(err) => {
                warn!("{err} on board at {pos}; ignoring");
                None
            }
        }
    }

    /// Occupant at `pos` together with its registered effect.
    pub(super) fn occupant_effect(
        &self,
        board: &Board,
        pos: Position,
    ) -> Option<(&'a Card, &'a EffectDef)> {
        let card = self.occupant(board, pos)?;
        let effect = self.get_effect_for_card(card)?;
        Some((card, effect))
    }

    /// Effective power of the occupant at `(lane, col)`; 0 when empty.
    #[must_use]
    pub fn compute_effective_power(&self, board: &Board, lane: usize, col: usize) -> i32 {
        let pos = Position::new(lane, col);
        let Some(card) = self.occupant(board, pos) else {
            return 0;
        };
        card.power + self.modifier_total(board, pos) + self.snapshot_scale(board, pos, card)
    }

    /// Every modifier on the occupant except its base power and its own
    /// scaling snapshot. The sign classifies the card as enhanced or
    /// enfeebled.
    #[must_use]
    pub fn modifier_total(&self, board: &Board, pos: Position) -> i32 {
        let tile = board.tile(pos);
        if !tile.is_occupied() {
            return 0;
        }
        let direct: i32 = board.direct_effects_at(pos).map(|e| e.amount).sum();
        tile.power_delta + tile.scale_delta + direct + self.continuous_total(board, pos)
    }

    /// Sum of live `while_in_play` `modify_power` contributions reaching `pos`:
    /// auras on the tile whose source scope admits the occupant, plus the
    /// occupant's own `while_in_play` effect.
    fn continuous_total(&self, board: &Board, pos: Position) -> i32 {
        let Some(target_side) = board.side_at(pos) else {
            return 0;
        };
        let occupant = board.tile(pos).card_id.as_ref();
        let mut total = 0;

        // Auras anchored here, whether or not the source remains.
        for aura in board.auras_at(pos) {
            let effect = match self.cards.get_card(&aura.source) {
                Ok(card) => self.get_effect_for_card(card),
                Err(err) => {
                    warn!("aura source {err}; ignoring");
                    None
                }
            };
            let Some(effect) = effect.filter(|e| e.trigger == Trigger::WhileInPlay) else {
                continue;
            };
            let admitted = match effect.scope {
                Scope::SelfOnly => occupant == Some(&aura.source),
                Scope::LaneOwner => false,
                Scope::Cards { relation, locality } => {
                    relation.matches(aura.source_side, target_side)
                        && locality_reaches(locality, aura.source_position, pos)
                }
            };
            if admitted {
                total += effect.power_amounts().sum::<i32>();
            }
        }

        if let Some((_, effect)) = self.occupant_effect(board, pos) {
            if effect.trigger == Trigger::WhileInPlay {
                total += effect.power_amounts().sum::<i32>();
            }
        }

        total
    }

    /// Live `modify_power_scale` snapshot of the occupant's own
    /// `while_in_play` effect, counted over the whole board.
    fn snapshot_scale(&self, board: &Board, pos: Position, card: &Card) -> i32 {
        let Some(effect) = self
            .get_effect_for_card(card)
            .filter(|e| e.trigger == Trigger::WhileInPlay)
        else {
            return 0;
        };
        let source_side = board.side_at(pos).unwrap_or(Side::Neutral);

        let mut total = 0;
        for op in &effect.operations {
            let EffectOp::ModifyPowerScale { per, amount_per } = op else {
                continue;
            };
            let count = board
                .occupied()
                .filter(|(other, _)| {
                    let target_side = board.side_at(*other).unwrap_or(Side::Neutral);
                    if !per.relation.matches(source_side, target_side) {
                        return false;
                    }
                    let modifiers = self.modifier_total(board, *other);
                    match per.event {
                        ScaleEvent::Enhanced => modifiers > 0,
                        ScaleEvent::Enfeebled => modifiers < 0,
                        ScaleEvent::EnhancedOrEnfeebled => modifiers != 0,
                        ScaleEvent::Played | ScaleEvent::Destroyed => false,
                    }
                })
                .count();
            total += amount_per * count as i32;
        }
        total
    }

    /// Occupied positions a scope admits for a source placed at `source`
    /// on `side`.
    ///
    /// Affected-tile scopes follow the source's `E`/`X` projection order;
    /// lane and global scopes scan row-major, the source tile included.
    #[must_use]
    pub fn resolve_scope(
        &self,
        board: &Board,
        card: &Card,
        scope: &Scope,
        source: Position,
        side: Side,
    ) -> ScopeTargets {
        let admits = |relation: Relation, pos: Position| {
            board
                .side_at(pos)
                .is_some_and(|target| relation.matches(side, target))
        };

        let mut targets = ScopeTargets::new();
        match *scope {
            Scope::SelfOnly => {
                if board.tile(source).is_occupied() {
                    targets.push(source);
                }
            }
            Scope::LaneOwner => {}
            Scope::Cards { relation, locality } => {
                let candidates: ScopeTargets = match locality {
                    Locality::AffectedTiles => projection_for_side(source.lane, source.col, card, side)
                        .effect_targets()
                        .collect(),
                    Locality::Lane => Position::lane_positions(source.lane).collect(),
                    Locality::Global => Position::all().collect(),
                };
                for pos in candidates {
                    if admits(relation, pos) && !targets.contains(&pos) {
                        targets.push(pos);
                    }
                }
            }
        }
        targets
    }
}

/// Whether a locality measured from `source` reaches `pos`. Affected-tile
/// reach is carried by the aura itself.
fn locality_reaches(locality: Locality, source: Position, pos: Position) -> bool {
    match locality {
        Locality::AffectedTiles | Locality::Global => true,
        Locality::Lane => source.lane == pos.lane,
    }
}
