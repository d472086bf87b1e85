//! Triggered operations and their cascades.
//!
//! Every board mutation performed by an effect goes through here:
//! on-play resolution, immediate power changes with their self-triggers,
//! the destruction protocol, spawning, rank mutation, expansion, and the
//! replace-ally protocol.
//!
//! ## Apply modes
//!
//! On-play `modify_power` against an occupied target is recorded as a
//! `DirectEffect` (cleared when the occupant changes). Every other firing
//! applies `modify_power` immediately to `power_delta`. Both paths run the
//! same hooks: `on_enfeebled`, first-enhanced/enfeebled crossings, and
//! power thresholds.

use log::{debug, warn};

use super::definition::{AdjustMode, EffectDef, EffectOp, ScaleEvent, Trigger};
use super::engine::EffectEngine;
use crate::board::{Board, DirectEffect, HandGrant, SpawnContext};
use crate::cards::{Card, CardId};
use crate::core::{Position, Side, MAX_RANK};
use crate::projection::{projection_for_side, projects_supercharged_pawns};

/// How a firing records `modify_power`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ApplyMode {
    /// On-play: one-shot direct effects.
    Direct,
    /// Triggers: straight into `power_delta`.
    Immediate,
}

impl EffectEngine<'_> {
    /// Fire a freshly placed card's `on_play` operations.
    ///
    /// `replaced_ally_power` feeds raise/lower follow-ups of the
    /// replace-ally protocol and is 0 for ordinary placements.
    pub fn apply_on_play_effects(
        &self,
        board: &mut Board,
        lane: usize,
        col: usize,
        card: &Card,
        replaced_ally_power: i32,
    ) {
        let Some(effect) = self.get_effect_for_card(card) else {
            return;
        };
        if effect.trigger != Trigger::OnPlay || projects_supercharged_pawns(card) {
            return;
        }
        debug!("on_play {} for {} at ({lane}, {col})", effect.id, card.id);
        self.apply_operations(
            board,
            Position::new(lane, col),
            card,
            effect,
            ApplyMode::Direct,
            replaced_ally_power,
        );
    }

    /// Notify `on_card_played` watchers that `card` landed on `(lane, col)`.
    pub fn handle_card_played(&self, board: &mut Board, lane: usize, col: usize, card: &Card) {
        let played = Position::new(lane, col);
        let Some(played_side) = board.side_at(played) else {
            return;
        };
        debug!("{} played at {played}", card.id);

        let watchers: Vec<Position> = board
            .occupied()
            .map(|(pos, _)| pos)
            .filter(|pos| *pos != played)
            .collect();
        for watcher in watchers {
            self.bump_watcher(board, watcher, Trigger::OnCardPlayed, ScaleEvent::Played, played_side);
        }
    }

    /// Immediately change the power of the occupant at `(lane, col)`,
    /// running every mutation hook.
    pub fn modify_power(&self, board: &mut Board, lane: usize, col: usize, amount: i32) {
        let pos = Position::new(lane, col);
        self.mutate_power(board, pos, amount, |board| {
            board.tile_mut(pos).power_delta += amount;
        });
    }

    /// Destroy a simultaneous batch of occupants.
    ///
    /// Positions are deduplicated; empty ones are ignored. Every `on_destroy`
    /// fires before any `on_card_destroyed` watcher, and removal happens last.
    pub fn destroy_cards(&self, board: &mut Board, positions: &[Position]) {
        let Some(_guard) = self.enter() else {
            return;
        };

        let mut batch = positions.to_vec();
        batch.sort_unstable();
        batch.dedup();
        let victims: Vec<(Position, CardId, Side)> = batch
            .into_iter()
            .filter_map(|pos| {
                let id = board.tile(pos).card_id.clone()?;
                let side = board.side_at(pos)?;
                Some((pos, id, side))
            })
            .collect();
        if victims.is_empty() {
            return;
        }
        debug!("destroying {} card(s)", victims.len());

        let still_there =
            |board: &Board, pos: Position, id: &CardId| board.tile(pos).card_id.as_ref() == Some(id);

        for (pos, id, _) in &victims {
            if !still_there(board, *pos, id) {
                continue;
            }
            if let Some((card, effect)) = self.occupant_effect(board, *pos) {
                if effect.trigger == Trigger::OnDestroy {
                    self.apply_operations(board, *pos, card, effect, ApplyMode::Immediate, 0);
                }
            }
        }

        for (pos, id, side) in &victims {
            if !still_there(board, *pos, id) {
                continue;
            }
            let watchers: Vec<Position> = board
                .occupied()
                .map(|(watcher, _)| watcher)
                .filter(|watcher| watcher != pos)
                .collect();
            for watcher in watchers {
                self.bump_watcher(board, watcher, Trigger::OnCardDestroyed, ScaleEvent::Destroyed, *side);
            }
        }

        for (pos, id, _) in &victims {
            if still_there(board, *pos, id) {
                board.remove_occupant(*pos);
            }
        }
        board.recompute_influence_from_deltas();
    }

    /// Replace an ally: capture its effective power, destroy it, place
    /// `card`, then fire `card`'s on-play with the captured power.
    pub fn replace_ally(&self, board: &mut Board, lane: usize, col: usize, card: &Card, side: Side) {
        let pos = Position::new(lane, col);
        let replaced_power = self.compute_effective_power(board, lane, col);
        self.destroy_cards(board, &[pos]);
        board.place_card(lane, col, card, side, None);
        self.apply_on_play_effects(board, lane, col, card, replaced_power);
    }

    /// Run every operation of a firing effect from the source at `source`.
    fn apply_operations(
        &self,
        board: &mut Board,
        source: Position,
        card: &Card,
        effect: &EffectDef,
        mode: ApplyMode,
        replaced_ally_power: i32,
    ) {
        let Some(_guard) = self.enter() else {
            return;
        };
        let side = board.side_at(source).unwrap_or(Side::Neutral);
        let mut to_destroy: Vec<Position> = Vec::new();

        for op in &effect.operations {
            match op {
                EffectOp::ModifyPower { amount, conditions } => {
                    for target in self.resolve_scope(board, card, &effect.scope, source, side) {
                        if let Some(pawns) = conditions.replaced_pawns {
                            let recorded = board.tile(target).spawn_context.map(|c| c.replaced_pawns);
                            if recorded != Some(pawns) {
                                continue;
                            }
                        }
                        match mode {
                            ApplyMode::Direct => {
                                self.record_direct(board, target, card, source, *amount)
                            }
                            ApplyMode::Immediate => {
                                self.modify_power(board, target.lane, target.col, *amount)
                            }
                        }
                    }
                }
                EffectOp::DestroyCards => {
                    to_destroy.extend(self.resolve_scope(board, card, &effect.scope, source, side));
                }
                EffectOp::ReplaceAlly { mode: adjust, .. } => {
                    let amount = match adjust {
                        AdjustMode::Raise => replaced_ally_power,
                        AdjustMode::Lower => -replaced_ally_power,
                    };
                    if amount == 0 {
                        continue;
                    }
                    for target in self.resolve_scope(board, card, &effect.scope, source, side) {
                        self.modify_power(board, target.lane, target.col, amount);
                    }
                }
                EffectOp::AddToHand { card_ids } => {
                    for card_id in card_ids {
                        board.grant_to_hand(HandGrant {
                            side,
                            card_id: card_id.clone(),
                            source: card.id.clone(),
                        });
                    }
                }
                EffectOp::SpawnToken {
                    token_id, per_pawns, ..
                } => self.spawn_tokens(board, card, side, token_id, *per_pawns),
                EffectOp::ModifyTileRanks { amount } => {
                    self.modify_tile_ranks(board, card, source, side, *amount)
                }
                EffectOp::ExpandPositions => self.expand_positions(board, card, source, side),
                // Watchers, snapshots and scoring read these elsewhere.
                EffectOp::ModifyPowerScale { .. } | EffectOp::ScoreBonus(_) => {}
            }
        }

        if !to_destroy.is_empty() {
            self.destroy_cards(board, &to_destroy);
        }
    }

    /// Record an on-play `modify_power` as a direct effect on `target`.
    fn record_direct(&self, board: &mut Board, target: Position, card: &Card, source: Position, amount: i32) {
        self.mutate_power(board, target, amount, |board| {
            board.add_direct_effect(
                target,
                DirectEffect {
                    source: card.id.clone(),
                    source_position: source,
                    amount,
                },
            );
        });
    }

    /// Apply a power change through `apply` and run the mutation hooks.
    fn mutate_power(
        &self,
        board: &mut Board,
        pos: Position,
        amount: i32,
        apply: impl FnOnce(&mut Board),
    ) {
        let Some(id) = board.tile(pos).card_id.clone() else {
            return;
        };
        let old_total = self.power_change_total(board, pos);
        let old_power = self.compute_effective_power(board, pos.lane, pos.col);
        apply(board);
        let new_total = self.power_change_total(board, pos);

        if amount < 0 {
            self.fire_self_trigger(board, pos, Trigger::OnEnfeebled);
        }
        if board.tile(pos).card_id.as_ref() != Some(&id) {
            return;
        }

        if old_total <= 0 && new_total > 0 && !board.tile(pos).trigger_state.first_enhanced_fired {
            board.tile_mut(pos).trigger_state.first_enhanced_fired = true;
            self.fire_self_trigger(board, pos, Trigger::OnFirstEnhanced);
        }
        if old_total >= 0 && new_total < 0 && !board.tile(pos).trigger_state.first_enfeebled_fired {
            board.tile_mut(pos).trigger_state.first_enfeebled_fired = true;
            self.fire_self_trigger(board, pos, Trigger::OnFirstEnfeebled);
        }
        if board.tile(pos).card_id.as_ref() != Some(&id) {
            return;
        }

        self.check_power_thresholds(board, pos, old_power);
    }

    /// Accumulated explicit power changes: `power_delta` plus direct effects.
    fn power_change_total(&self, board: &Board, pos: Position) -> i32 {
        board.tile(pos).power_delta + board.direct_effects_at(pos).map(|e| e.amount).sum::<i32>()
    }

    /// Fire the occupant's own effect if it carries `trigger`.
    fn fire_self_trigger(&self, board: &mut Board, pos: Position, trigger: Trigger) {
        let Some((card, effect)) = self.occupant_effect(board, pos) else {
            return;
        };
        if effect.trigger != trigger {
            return;
        }
        debug!("{trigger} fired for {} at {pos}", card.id);
        self.apply_operations(board, pos, card, effect, ApplyMode::Immediate, 0);
    }

    /// Fire `on_power_threshold` for every value crossed strictly upward
    /// since `old_power`.
    fn check_power_thresholds(&self, board: &mut Board, pos: Position, old_power: i32) {
        let Some((card, effect)) = self.occupant_effect(board, pos) else {
            return;
        };
        if effect.trigger != Trigger::OnPowerThreshold {
            return;
        }
        let new_power = self.compute_effective_power(board, pos.lane, pos.col);

        for op in &effect.operations {
            let conditions = op.conditions();
            let Some(value) = conditions.threshold else {
                continue;
            };
            if !(old_power < value && value <= new_power) {
                continue;
            }
            if board.tile(pos).card_id.as_ref() != Some(&card.id) {
                return;
            }
            let state = &mut board.tile_mut(pos).trigger_state;
            if conditions.first_time && state.threshold_fired(value) {
                continue;
            }
            state.mark_threshold(value);
            debug!("power threshold {value} crossed for {} at {pos}", card.id);
            self.apply_operations(board, pos, card, effect, ApplyMode::Immediate, 0);
        }
    }

    /// Bump the scale of a watcher whose `trigger` predicate matches an
    /// event by a card on `event_side`.
    fn bump_watcher(
        &self,
        board: &mut Board,
        watcher: Position,
        trigger: Trigger,
        event: ScaleEvent,
        event_side: Side,
    ) {
        let Some((_, effect)) = self.occupant_effect(board, watcher) else {
            return;
        };
        if effect.trigger != trigger {
            return;
        }
        let watcher_side = board.side_at(watcher).unwrap_or(Side::Neutral);

        for op in &effect.operations {
            let EffectOp::ModifyPowerScale { per, amount_per } = op else {
                continue;
            };
            if per.event != event || !per.relation.matches(watcher_side, event_side) {
                continue;
            }
            let old_power = self.compute_effective_power(board, watcher.lane, watcher.col);
            board.tile_mut(watcher).scale_delta += amount_per;
            self.check_power_thresholds(board, watcher, old_power);
        }
    }

    /// Spawn `token_id` onto every empty, `side`-owned tile with rank > 0.
    fn spawn_tokens(&self, board: &mut Board, source: &Card, side: Side, token_id: &CardId, per_pawns: bool) {
        if !side.is_player() {
            return;
        }
        let token = match self.cards.get_card(token_id) {
            Ok(token) => token,
            Err(err) => {
                warn!("spawn by {} skipped: {err}", source.id);
                return;
            }
        };

        let spots: Vec<Position> = board
            .tiles()
            .filter(|(_, tile)| !tile.is_occupied() && tile.owner == side && tile.rank > 0)
            .map(|(pos, _)| pos)
            .collect();
        for pos in spots {
            let tile = board.tile(pos);
            if tile.is_occupied() {
                continue;
            }
            let replaced_pawns = if per_pawns { tile.rank } else { 0 };
            board.spawn_token(
                pos,
                token.id.clone(),
                side,
                source.id.clone(),
                SpawnContext { replaced_pawns },
            );
            debug!("{} spawned {} at {pos}", source.id, token.id);
            self.fire_self_trigger(board, pos, Trigger::OnSpawned);
        }
    }

    /// Move the rank of every projection target by `amount`, clamped to
    /// `0..=MAX_RANK`, in the direction of whoever holds the tile. A tile
    /// with no holder leans toward `side`.
    fn modify_tile_ranks(&self, board: &mut Board, card: &Card, source: Position, side: Side, amount: i32) {
        if !side.is_player() {
            return;
        }
        let max = i32::from(MAX_RANK);
        let proj = projection_for_side(source.lane, source.col, card, side);
        for pos in proj.targets.iter().map(|t| t.position) {
            let influence = board.influence_at(pos);
            let holder = match Side::from_influence(influence) {
                Side::Neutral if board.tile(pos).owner.is_player() => board.tile(pos).owner,
                Side::Neutral => side,
                held => held,
            };
            let rank = influence.abs().min(max);
            let target = (rank + amount).clamp(0, max);
            if target == rank {
                continue;
            }
            let delta = holder.influence_sign() * (target - influence.abs());
            debug!("{} moves {pos} to rank {target}", card.id);
            board.add_pawn_delta(pos, card.id.clone(), delta);
        }
        board.recompute_influence_from_deltas();
    }

    /// Claim neutral neighbours at rank 1 and add one rank to every
    /// neighbour `side` already holds below the max, occupied or empty.
    /// Enemy-held neighbours are left alone.
    fn expand_positions(&self, board: &mut Board, card: &Card, source: Position, side: Side) {
        if !side.is_player() {
            return;
        }
        for pos in source.neighbours() {
            let tile = board.tile(pos);
            let claim = if tile.owner == Side::Neutral {
                true
            } else {
                tile.owner == side && tile.rank < MAX_RANK
            };
            if claim {
                board.add_pawn_delta(pos, card.id.clone(), side.influence_sign());
            }
        }
        board.recompute_influence_from_deltas();
    }
}
