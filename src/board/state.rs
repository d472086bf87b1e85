//! Board state: the tile grid plus its append-only logs.
//!
//! ## Ownership model
//!
//! Empty tiles derive owner and rank purely from
//! `base_influence + Σ pawn deltas`. Occupied tiles keep the side that
//! placed the occupant (`Tile::placed_by`); recompute only refreshes their
//! rank. An occupied tile therefore never reports `Neutral`.
//!
//! ## Cloning
//!
//! Logs live in `im` persistent collections, so `Board::clone()` is cheap
//! and yields a fully independent board for speculative search.

use im::{OrdMap, Vector};

use super::logs::{DirectEffect, EffectAura, HandGrant, PawnDelta};
use super::tile::{Origin, SpawnContext, Tile, TileView};
use crate::cards::{Card, CardId};
use crate::core::{Position, Side, COLS, LANES, MAX_RANK};
use crate::effects::EffectEngine;

/// The 3×5 board.
///
/// Tile state outside the crate is read-only; ownership changes go
/// through the pawn log.
///
/// ```compile_fail
/// use lane_kernel::board::Board;
/// use lane_kernel::core::Position;
///
/// let mut board = Board::create_initial();
/// board.tile_mut(Position::new(0, 0)).rank = 3;
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    tiles: Vec<Tile>,
    pawn_deltas: Vector<PawnDelta>,
    effect_auras: Vector<EffectAura>,
    direct_effects: OrdMap<Position, Vector<DirectEffect>>,
    hand_grants: Vector<HandGrant>,
}

/// Standard starting board; see [`Board::create_initial`].
#[must_use]
pub fn create_initial_board() -> Board {
    Board::create_initial()
}

impl Default for Board {
    fn default() -> Self {
        Self::create_initial()
    }
}

impl Board {
    /// Create the standard starting board.
    ///
    /// Left column: `You` rank 1. Right column: `Enemy` rank 1.
    /// Middle columns: neutral rank 0.
    ///
    /// ```
    /// use lane_kernel::board::Board;
    /// use lane_kernel::core::Side;
    ///
    /// let board = Board::create_initial();
    /// assert_eq!(board.tile_at(1, 0).owner, Side::You);
    /// assert_eq!(board.tile_at(1, 2).owner, Side::Neutral);
    /// assert_eq!(board.tile_at(1, 4).rank, 1);
    /// ```
    #[must_use]
    pub fn create_initial() -> Self {
        let tiles = Position::all().map(|pos| Tile::initial(pos.col)).collect();
        Self {
            tiles,
            pawn_deltas: Vector::new(),
            effect_auras: Vector::new(),
            direct_effects: OrdMap::new(),
            hand_grants: Vector::new(),
        }
    }

    // === Tile access ===

    /// Tile at a position.
    #[must_use]
    pub fn tile(&self, pos: Position) -> &Tile {
        &self.tiles[pos.index()]
    }

    /// Tile at `(lane, col)`.
    #[must_use]
    pub fn tile_at(&self, lane: usize, col: usize) -> &Tile {
        self.tile(Position::new(lane, col))
    }

    /// Mutable tile access for the engine. Direct edits bypass the logs.
    pub(crate) fn tile_mut(&mut self, pos: Position) -> &mut Tile {
        &mut self.tiles[pos.index()]
    }

    /// Iterate over `(position, tile)` in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (Position, &Tile)> {
        Position::all().zip(self.tiles.iter())
    }

    /// Iterate over occupied positions and their occupants, row-major.
    pub fn occupied(&self) -> impl Iterator<Item = (Position, &CardId)> {
        self.tiles()
            .filter_map(|(pos, tile)| tile.card_id.as_ref().map(|id| (pos, id)))
    }

    /// Canonical tile descriptor.
    #[must_use]
    pub fn describe_tile(&self, lane: usize, col: usize) -> TileView {
        let position = Position::new(lane, col);
        let tile = self.tile(position);
        TileView {
            position,
            owner: tile.owner,
            rank: tile.rank,
            card_id: tile.card_id.clone(),
            has_auras: self.auras_at(position).next().is_some(),
        }
    }

    // === Placing cards ===

    /// Place a card on a tile for `side`.
    ///
    /// Legality (ownership, rank, occupancy) is the caller's job: this
    /// overwrites whatever is there. Resets per-occupant state, drops stale
    /// direct effects, then runs the card's on-play operations when an
    /// engine is supplied.
    pub fn place_card(
        &mut self,
        lane: usize,
        col: usize,
        card: &Card,
        side: Side,
        engine: Option<&EffectEngine<'_>>,
    ) {
        let pos = Position::new(lane, col);
        self.direct_effects.remove(&pos);
        self.tile_mut(pos).occupy(card.id.clone(), side, Origin::Played);

        if let Some(engine) = engine {
            engine.apply_on_play_effects(self, lane, col, card, 0);
        }
    }

    /// Put a token on a tile on behalf of `spawned_by`.
    pub(crate) fn spawn_token(
        &mut self,
        pos: Position,
        token: CardId,
        side: Side,
        spawned_by: CardId,
        context: SpawnContext,
    ) {
        self.direct_effects.remove(&pos);
        let tile = self.tile_mut(pos);
        tile.occupy(token, side, Origin::Token { spawned_by });
        tile.spawn_context = Some(context);
    }

    /// Remove the occupant of `pos` and everything it left behind: its
    /// auras, the direct effects it issued, and the direct effects on its
    /// tile. Returns the removed id.
    pub(crate) fn remove_occupant(&mut self, pos: Position) -> Option<CardId> {
        let id = self.tile_mut(pos).vacate()?;

        self.effect_auras = self
            .effect_auras
            .iter()
            .filter(|aura| !(aura.source == id && aura.source_position == pos))
            .cloned()
            .collect();

        let mut kept = OrdMap::new();
        for (at, effects) in self.direct_effects.iter() {
            if *at == pos {
                continue;
            }
            let remaining: Vector<DirectEffect> = effects
                .iter()
                .filter(|effect| !(effect.source == id && effect.source_position == pos))
                .cloned()
                .collect();
            if !remaining.is_empty() {
                kept.insert(*at, remaining);
            }
        }
        self.direct_effects = kept;

        Some(id)
    }

    // === Pawn deltas ===

    /// Log a raw signed pawn delta (positive favours `You`).
    pub fn add_pawn_delta(&mut self, pos: Position, source: CardId, amount: i32) {
        self.pawn_deltas.push_back(PawnDelta {
            position: pos,
            source,
            amount,
        });
    }

    /// Log an influence gain for `You`.
    pub fn add_pawn_delta_for_you(&mut self, pos: Position, source: CardId, amount: i32) {
        self.add_pawn_delta(pos, source, amount);
    }

    /// Log an influence gain for the enemy.
    pub fn add_pawn_delta_for_enemy(&mut self, pos: Position, source: CardId, amount: i32) {
        self.add_pawn_delta(pos, source, -amount);
    }

    /// All logged pawn deltas, oldest first.
    pub fn pawn_deltas(&self) -> impl Iterator<Item = &PawnDelta> {
        self.pawn_deltas.iter()
    }

    /// Net influence at a tile: base plus every logged delta.
    #[must_use]
    pub fn influence_at(&self, pos: Position) -> i32 {
        self.tile(pos).base_influence()
            + self
                .pawn_deltas
                .iter()
                .filter(|delta| delta.position == pos)
                .map(|delta| delta.amount)
                .sum::<i32>()
    }

    /// Re-derive owner and rank of every tile from the pawn log.
    ///
    /// Pure over `base_influence` and the log, so repeated calls without new
    /// deltas change nothing. Occupied tiles keep their placing side.
    pub fn recompute_influence_from_deltas(&mut self) {
        let mut influences = [0i32; LANES * COLS];
        for (pos, tile) in self.tiles() {
            influences[pos.index()] = tile.base_influence();
        }
        for delta in self.pawn_deltas.iter() {
            influences[delta.position.index()] += delta.amount;
        }

        for (tile, influence) in self.tiles.iter_mut().zip(influences) {
            tile.rank = influence.unsigned_abs().min(u32::from(MAX_RANK)) as u8;
            tile.owner = match tile.placed_by {
                Some(side) if tile.card_id.is_some() => side,
                _ => Side::from_influence(influence),
            };
        }
    }

    // === Effect auras ===

    /// Register an effect aura.
    pub fn add_effect_aura(&mut self, aura: EffectAura) {
        self.effect_auras.push_back(aura);
    }

    /// Auras currently anchored on a tile, in registration order.
    pub fn auras_at(&self, pos: Position) -> impl Iterator<Item = &EffectAura> {
        self.effect_auras
            .iter()
            .filter(move |aura| aura.position == pos)
    }

    /// Every registered aura.
    pub fn effect_auras(&self) -> impl Iterator<Item = &EffectAura> {
        self.effect_auras.iter()
    }

    // === Direct effects ===

    /// Register a one-shot modifier against the occupant of `pos`.
    pub fn add_direct_effect(&mut self, pos: Position, effect: DirectEffect) {
        self.direct_effects.entry(pos).or_default().push_back(effect);
    }

    /// Direct effects on the occupant of `pos`.
    pub fn direct_effects_at(&self, pos: Position) -> impl Iterator<Item = &DirectEffect> {
        self.direct_effects
            .get(&pos)
            .into_iter()
            .flat_map(|effects| effects.iter())
    }

    // === Hand grants ===

    /// Queue a card for a side's hand.
    pub fn grant_to_hand(&mut self, grant: HandGrant) {
        self.hand_grants.push_back(grant);
    }

    /// Pending hand grants, oldest first.
    pub fn hand_grants(&self) -> impl Iterator<Item = &HandGrant> {
        self.hand_grants.iter()
    }

    /// Take every pending hand grant.
    pub fn drain_hand_grants(&mut self) -> Vec<HandGrant> {
        std::mem::take(&mut self.hand_grants).into_iter().collect()
    }

    // === Side resolution ===

    /// Side of the occupant at `pos`, or `None` when the tile is empty.
    #[must_use]
    pub fn side_at(&self, pos: Position) -> Option<Side> {
        let tile = self.tile(pos);
        tile.card_id.as_ref()?;
        Some(tile.placed_by.unwrap_or(tile.owner))
    }

    /// Side of a card looked up by id.
    ///
    /// Scans row-major and returns the first `You`/`Enemy` match; `Neutral`
    /// when the id only sits on neutral tiles; `None` when absent. With
    /// duplicate ids on both sides the first match wins, so callers that
    /// know a position should use [`Board::side_at`].
    #[must_use]
    pub fn get_card_side(&self, card_id: &CardId) -> Option<Side> {
        let mut found_neutral = false;
        for (pos, id) in self.occupied() {
            if id != card_id {
                continue;
            }
            match self.side_at(pos) {
                Some(side) if side.is_player() => return Some(side),
                _ => found_neutral = true,
            }
        }
        found_neutral.then_some(Side::Neutral)
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for lane in 0..LANES {
            let row: Vec<String> = Position::lane_positions(lane)
                .map(|pos| self.tile(pos).to_string())
                .collect();
            writeln!(f, "{}", row.join("  "))?;
        }
        Ok(())
    }
}
