//! Lane and match scoring.
//!
//! Lane sums come from the engine's effective power per occupied tile.
//! Score-modifying triggers (`on_lane_win` flat bonuses and `on_round_end`
//! lane-min transfers) are applied on top; if applying them fails, scoring
//! falls back to the unmodified lane sums.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::cards::CardSource;
use crate::core::{Position, Side, LANES};
use crate::effects::{EffectEngine, EffectOp, ScoreBonus, Trigger};
use crate::error::Result;

/// Score of one lane.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneScore {
    pub lane_index: usize,
    pub power_you: i32,
    pub power_enemy: i32,
    /// `None` on a tie.
    pub winner: Option<Side>,
    pub lane_points: i32,
}

/// Aggregate score across all lanes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchScore {
    pub lanes: Vec<LaneScore>,
    pub total_you: i32,
    pub total_enemy: i32,
    pub winner: Option<Side>,
    /// `total_you - total_enemy`.
    pub margin: i32,
}

fn leader(you: i32, enemy: i32) -> Option<Side> {
    match you.cmp(&enemy) {
        std::cmp::Ordering::Greater => Some(Side::You),
        std::cmp::Ordering::Less => Some(Side::Enemy),
        std::cmp::Ordering::Equal => None,
    }
}

/// Sum effective power per side across one lane.
#[must_use]
pub fn compute_lane_power(board: &Board, engine: &EffectEngine<'_>, lane_index: usize) -> LaneScore {
    let mut power_you = 0;
    let mut power_enemy = 0;

    for pos in Position::lane_positions(lane_index) {
        let power = engine.compute_effective_power(board, pos.lane, pos.col);
        match board.side_at(pos) {
            Some(Side::You) => power_you += power,
            Some(Side::Enemy) => power_enemy += power,
            Some(Side::Neutral) | None => {}
        }
    }

    let winner = leader(power_you, power_enemy);
    let lane_points = match winner {
        Some(Side::You) => power_you,
        Some(_) => power_enemy,
        None => 0,
    };

    LaneScore {
        lane_index,
        power_you,
        power_enemy,
        winner,
        lane_points,
    }
}

/// Score every lane, apply score modifiers, and total the result.
///
/// ```
/// use lane_kernel::board::Board;
/// use lane_kernel::cards::CardRegistry;
/// use lane_kernel::effects::{EffectEngine, EffectRegistry};
/// use lane_kernel::scoring::compute_match_score;
///
/// let (cards, effects) = (CardRegistry::new(), EffectRegistry::new());
/// let engine = EffectEngine::new(&cards, &effects);
/// let score = compute_match_score(&Board::create_initial(), &engine);
///
/// assert_eq!((score.total_you, score.total_enemy, score.margin), (0, 0, 0));
/// assert!(score.winner.is_none());
/// ```
#[must_use]
pub fn compute_match_score(board: &Board, engine: &EffectEngine<'_>) -> MatchScore {
    let base: Vec<LaneScore> = (0..LANES)
        .map(|lane| compute_lane_power(board, engine, lane))
        .collect();

    let mut lanes = base.clone();
    if let Err(err) = engine.apply_score_modifiers(board, &mut lanes) {
        warn!("score modifiers failed, using base lane scores: {err}");
        lanes = base;
    }

    let total_for = |side: Side| -> i32 {
        lanes
            .iter()
            .filter(|lane| lane.winner == Some(side))
            .map(|lane| lane.lane_points)
            .sum()
    };
    let total_you = total_for(Side::You);
    let total_enemy = total_for(Side::Enemy);

    MatchScore {
        winner: leader(total_you, total_enemy),
        margin: total_you - total_enemy,
        total_you,
        total_enemy,
        lanes,
    }
}

impl EffectEngine<'_> {
    /// Apply `on_lane_win` flat bonuses and `on_round_end` lane-min
    /// transfers of winning-side cards to each won lane.
    ///
    /// Fails when an occupant's card record cannot be resolved.
    pub fn apply_score_modifiers(&self, board: &Board, lanes: &mut [LaneScore]) -> Result<()> {
        for lane in lanes.iter_mut() {
            let Some(winner) = lane.winner else {
                continue;
            };
            let lower = lane.power_you.min(lane.power_enemy);
            let mut bonus = 0;
            let mut transfers = 0;

            for pos in Position::lane_positions(lane.lane_index) {
                let Some(id) = board.tile(pos).card_id.as_ref() else {
                    continue;
                };
                if board.side_at(pos) != Some(winner) {
                    continue;
                }
                let card = self.cards().get_card(id)?;
                let Some(effect) = self.get_effect_for_card(card) else {
                    continue;
                };
                for op in &effect.operations {
                    match (effect.trigger, op) {
                        (Trigger::OnLaneWin, EffectOp::ScoreBonus(ScoreBonus::Flat(amount))) => {
                            bonus += amount;
                        }
                        (Trigger::OnRoundEnd, EffectOp::ScoreBonus(ScoreBonus::LaneMinTransfer)) => {
                            transfers += 1;
                        }
                        _ => {}
                    }
                }
            }

            lane.lane_points += bonus;
            if lower > 0 {
                lane.lane_points += lower * transfers;
            }
        }
        Ok(())
    }
}

/// Heuristic board-control score `(you, enemy)`.
///
/// Counts empty owned tiles in lanes that are not full, weighted by rank:
/// 1 → 1.0, 2 → 3.0, 3 → 4.0.
#[must_use]
pub fn territory_score(board: &Board) -> (f64, f64) {
    let weight = |rank: u8| match rank {
        0 => 0.0,
        1 => 1.0,
        2 => 3.0,
        _ => 4.0,
    };

    let mut you = 0.0;
    let mut enemy = 0.0;
    for lane in 0..LANES {
        if Position::lane_positions(lane).all(|pos| board.tile(pos).is_occupied()) {
            continue;
        }
        for pos in Position::lane_positions(lane) {
            let tile = board.tile(pos);
            if tile.is_occupied() {
                continue;
            }
            match tile.owner {
                Side::You => you += weight(tile.rank),
                Side::Enemy => enemy += weight(tile.rank),
                Side::Neutral => {}
            }
        }
    }
    (you, enemy)
}
