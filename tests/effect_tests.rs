//! Effect resolution integration tests.
//!
//! Registries are loaded from JSON fixtures the same way a data pack is,
//! then driven through the public placement and destruction APIs.

use lane_kernel::board::{Board, Origin};
use lane_kernel::cards::{Card, CardId, CardRegistry, CardSource};
use lane_kernel::core::{Position, Side};
use lane_kernel::effects::{EffectEngine, EffectRegistry, MAX_CASCADE_DEPTH};
use lane_kernel::rules::play_card;
use serde_json::{json, Value};

fn registries(cards: Value, effects: Value) -> (CardRegistry, EffectRegistry) {
    (
        CardRegistry::from_json_str(&cards.to_string()).unwrap(),
        EffectRegistry::from_json_str(&effects.to_string()).unwrap(),
    )
}

fn card(cards: &CardRegistry, id: &str) -> Card {
    cards.get_card(&CardId::new(id)).unwrap().clone()
}

/// A while_in_play -1 aura next to an enemy of base power 1 leaves it at 0.
/// The source carries its own effect too, so the weakener drops to 1.
#[test]
fn test_continuous_aura_weakens_enemy() {
    let (cards, effects) = registries(
        json!([
            {"id": "WEAKEN", "name": "Weakener", "cost": 1, "power": 2, "pattern": "B3E", "effect_id": "weaken"},
            {"id": "TARGET", "name": "Target", "cost": 1, "power": 1, "pattern": ""}
        ]),
        json!({
            "weaken": {
                "trigger": "while_in_play",
                "scope": "enemies_on_affected_tiles",
                "operations": [{"type": "modify_power", "stat": "power", "amount": -1}]
            }
        }),
    );
    let engine = EffectEngine::new(&cards, &effects);
    let mut board = Board::create_initial();

    play_card(&mut board, &engine, 1, 0, &card(&cards, "WEAKEN"), Side::You).unwrap();
    board.place_card(1, 1, &card(&cards, "TARGET"), Side::Enemy, Some(&engine));

    assert_eq!(engine.compute_effective_power(&board, 1, 1), 0);
    assert_eq!(engine.compute_effective_power(&board, 1, 0), 1);
    assert!(board.describe_tile(1, 1).has_auras);
}

/// Lane and global buffs only reach allies standing under one of the
/// source's auras; the source itself always gets its own buff.
#[test]
fn test_continuous_buff_needs_aura() {
    let (cards, effects) = registries(
        json!([
            {"id": "RALLY", "name": "Rally", "cost": 1, "power": 1, "pattern": "B3E", "effect_id": "rally"},
            {"id": "BANNER", "name": "Banner", "cost": 1, "power": 1, "pattern": "", "effect_id": "banner"},
            {"id": "ALLY", "name": "Ally", "cost": 1, "power": 2, "pattern": ""}
        ]),
        json!({
            "rally": {
                "trigger": "while_in_play",
                "scope": "allies_in_lane",
                "operations": [{"type": "modify_power", "amount": 1}]
            },
            "banner": {
                "trigger": "while_in_play",
                "scope": "allies_global",
                "operations": [{"type": "modify_power", "amount": 1}]
            }
        }),
    );
    let engine = EffectEngine::new(&cards, &effects);
    let mut board = Board::create_initial();
    let ally = card(&cards, "ALLY");

    board.place_card(1, 1, &ally, Side::You, None);
    board.place_card(1, 3, &ally, Side::You, None);
    board.place_card(2, 2, &ally, Side::You, None);
    play_card(&mut board, &engine, 1, 0, &card(&cards, "RALLY"), Side::You).unwrap();
    play_card(&mut board, &engine, 0, 0, &card(&cards, "BANNER"), Side::You).unwrap();

    // Under the rally aura.
    assert_eq!(engine.compute_effective_power(&board, 1, 1), 3);
    // Same lane, no aura.
    assert_eq!(engine.compute_effective_power(&board, 1, 3), 2);
    // The banner projects nothing, so no ally is reached.
    assert_eq!(engine.compute_effective_power(&board, 2, 2), 2);
    assert_eq!(engine.compute_effective_power(&board, 1, 0), 2);
    assert_eq!(engine.compute_effective_power(&board, 0, 0), 2);
}

/// An on_play -4 against an enemy of base power 1 becomes a direct effect: -3.
#[test]
fn test_on_play_direct_effect() {
    let (cards, effects) = registries(
        json!([
            {"id": "SAPPER", "name": "Sapper", "cost": 1, "power": 1, "pattern": "B3E", "effect_id": "sap"},
            {"id": "TARGET", "name": "Target", "cost": 1, "power": 1, "pattern": ""}
        ]),
        json!({
            "sap": {
                "trigger": "on_play",
                "scope": "enemies_on_affected_tiles",
                "operations": [{"type": "modify_power", "stat": "power", "amount": -4}]
            }
        }),
    );
    let engine = EffectEngine::new(&cards, &effects);
    let mut board = Board::create_initial();
    let target = Position::new(1, 1);

    board.place_card(1, 1, &card(&cards, "TARGET"), Side::Enemy, Some(&engine));
    play_card(&mut board, &engine, 1, 0, &card(&cards, "SAPPER"), Side::You).unwrap();

    assert_eq!(engine.compute_effective_power(&board, 1, 1), -3);
    assert_eq!(board.direct_effects_at(target).count(), 1);
    assert_eq!(board.tile(target).power_delta, 0);
    assert!(board.tile(target).trigger_state.first_enfeebled_fired);

    // Destroying the source removes the direct effect it issued.
    engine.destroy_cards(&mut board, &[Position::new(1, 0)]);
    assert_eq!(engine.compute_effective_power(&board, 1, 1), 1);
}

/// A replaced occupant sheds the direct effects aimed at its predecessor.
#[test]
fn test_direct_effect_cleared_on_new_occupant() {
    let (cards, effects) = registries(
        json!([
            {"id": "SAPPER", "name": "Sapper", "cost": 1, "power": 1, "pattern": "B3E", "effect_id": "sap"},
            {"id": "TARGET", "name": "Target", "cost": 1, "power": 1, "pattern": ""}
        ]),
        json!({
            "sap": {
                "trigger": "on_play",
                "scope": "all_cards_on_affected_tiles",
                "operations": [{"type": "modify_power", "amount": -1}]
            }
        }),
    );
    let engine = EffectEngine::new(&cards, &effects);
    let mut board = Board::create_initial();

    board.place_card(2, 1, &card(&cards, "TARGET"), Side::You, None);
    board.place_card(2, 0, &card(&cards, "SAPPER"), Side::You, Some(&engine));
    assert_eq!(engine.compute_effective_power(&board, 2, 1), 0);

    board.place_card(2, 1, &card(&cards, "TARGET"), Side::You, None);
    assert_eq!(engine.compute_effective_power(&board, 2, 1), 1);
}

/// on_destroy fires before on_card_destroyed watchers; the watcher also
/// received the on_destroy buff: 1 + 2 + 1 = 4.
#[test]
fn test_destruction_protocol_order() {
    let (cards, effects) = registries(
        json!([
            {"id": "MARTYR", "name": "Martyr", "cost": 1, "power": 1, "pattern": "B3E", "effect_id": "last_gift"},
            {"id": "MOURNER", "name": "Mourner", "cost": 1, "power": 1, "pattern": "", "effect_id": "grieve"}
        ]),
        json!({
            "_meta": {"version": "test"},
            "last_gift": {
                "trigger": "on_destroy",
                "scope": "allies_on_affected_tiles",
                "operations": [{"type": "modify_power", "stat": "power", "amount": 2}]
            },
            "grieve": {
                "trigger": "on_card_destroyed",
                "scope": "self",
                "operations": [{"type": "modify_power_scale", "per": "destroyed_ally", "amount_per": 1}]
            }
        }),
    );
    let engine = EffectEngine::new(&cards, &effects);
    let mut board = Board::create_initial();
    let martyr = Position::new(1, 0);

    play_card(&mut board, &engine, 1, 0, &card(&cards, "MARTYR"), Side::You).unwrap();
    board.place_card(1, 1, &card(&cards, "MOURNER"), Side::You, Some(&engine));
    assert_eq!(board.auras_at(Position::new(1, 1)).count(), 1);

    // Duplicates in one batch count once.
    engine.destroy_cards(&mut board, &[martyr, martyr]);

    assert_eq!(engine.compute_effective_power(&board, 1, 1), 4);
    let mourner = board.tile(Position::new(1, 1));
    assert_eq!((mourner.power_delta, mourner.scale_delta), (2, 1));

    let tile = board.tile(martyr);
    assert!(tile.card_id.is_none());
    assert_eq!(tile.power_delta, 0);
    assert_eq!(tile.scale_delta, 0);
    assert!(tile.spawn_context.is_none());
    assert_eq!(board.effect_auras().count(), 0);
    assert_eq!(board.tile(martyr).owner, Side::You);
}

/// Destroying an empty tile changes nothing.
#[test]
fn test_destroy_empty_is_noop() {
    let (cards, effects) = registries(json!([]), json!({}));
    let engine = EffectEngine::new(&cards, &effects);
    let mut board = Board::create_initial();
    let before = board.clone();

    engine.destroy_cards(&mut board, &[Position::new(0, 2)]);

    assert_eq!(board, before);
}

/// Chained on_destroy destruction resolves fully; watchers count each loss.
#[test]
fn test_destruction_chain() {
    let (cards, effects) = registries(
        json!([
            {"id": "BOMB", "name": "Bomb", "cost": 1, "power": 1, "pattern": "B3E", "effect_id": "blast"},
            {"id": "TALLY", "name": "Tally", "cost": 1, "power": 0, "pattern": "", "effect_id": "count_all"}
        ]),
        json!({
            "blast": {
                "trigger": "on_destroy",
                "scope": "all_cards_on_affected_tiles",
                "operations": [{"type": "destroy_cards"}]
            },
            "count_all": {
                "trigger": "on_card_destroyed",
                "scope": "self",
                "operations": [{"type": "modify_power_scale", "per": "destroyed_all", "amount_per": 1}]
            }
        }),
    );
    let engine = EffectEngine::new(&cards, &effects);
    let mut board = Board::create_initial();
    let bomb = card(&cards, "BOMB");
    for col in 0..3 {
        board.place_card(0, col, &bomb, Side::You, None);
    }
    board.place_card(2, 4, &card(&cards, "TALLY"), Side::Enemy, None);

    engine.destroy_cards(&mut board, &[Position::new(0, 0)]);

    for col in 0..3 {
        assert!(!board.tile_at(0, col).is_occupied());
    }
    assert_eq!(engine.compute_effective_power(&board, 2, 4), 3);
}

/// on_first_enhanced fires once per occupant, however often power moves.
#[test]
fn test_first_enhanced_fires_once() {
    let (cards, effects) = registries(
        json!([
            {"id": "EAGER", "name": "Eager", "cost": 1, "power": 1, "pattern": "", "effect_id": "eager"}
        ]),
        json!({
            "eager": {
                "trigger": "on_first_enhanced",
                "scope": "self",
                "operations": [{"type": "modify_power", "stat": "power", "amount": 1}]
            }
        }),
    );
    let engine = EffectEngine::new(&cards, &effects);
    let mut board = Board::create_initial();
    board.place_card(0, 0, &card(&cards, "EAGER"), Side::You, None);

    engine.modify_power(&mut board, 0, 0, 1);
    assert_eq!(board.tile_at(0, 0).power_delta, 2);

    engine.modify_power(&mut board, 0, 0, -5);
    engine.modify_power(&mut board, 0, 0, 10);
    assert_eq!(board.tile_at(0, 0).power_delta, 7);
    assert_eq!(engine.compute_effective_power(&board, 0, 0), 8);

    // A new occupant starts with fresh flags.
    board.place_card(0, 0, &card(&cards, "EAGER"), Side::You, None);
    assert!(!board.tile_at(0, 0).trigger_state.first_enhanced_fired);
    engine.modify_power(&mut board, 0, 0, 1);
    assert_eq!(board.tile_at(0, 0).power_delta, 2);
}

/// on_first_enfeebled fires on the first drop below zero only.
#[test]
fn test_first_enfeebled_fires_once() {
    let (cards, effects) = registries(
        json!([
            {"id": "GRUDGE", "name": "Grudge", "cost": 1, "power": 5, "pattern": "", "effect_id": "grudge"}
        ]),
        json!({
            "grudge": {
                "trigger": "on_first_enfeebled",
                "scope": "self",
                "operations": [{"type": "add_to_hand", "card_ids": ["REVENGE"]}]
            }
        }),
    );
    let engine = EffectEngine::new(&cards, &effects);
    let mut board = Board::create_initial();
    board.place_card(2, 0, &card(&cards, "GRUDGE"), Side::You, None);

    engine.modify_power(&mut board, 2, 0, -1);
    engine.modify_power(&mut board, 2, 0, 2);
    engine.modify_power(&mut board, 2, 0, -3);

    assert_eq!(board.drain_hand_grants().len(), 1);
}

/// on_enfeebled fires on every negative change; grants land in the outbox.
#[test]
fn test_on_enfeebled_every_time() {
    let (cards, effects) = registries(
        json!([
            {"id": "WHINER", "name": "Whiner", "cost": 1, "power": 3, "pattern": "", "effect_id": "complain"}
        ]),
        json!({
            "complain": {
                "trigger": "on_enfeebled",
                "scope": "self",
                "operations": [{"type": "add_to_hand", "card_ids": ["GIFT"]}]
            }
        }),
    );
    let engine = EffectEngine::new(&cards, &effects);
    let mut board = Board::create_initial();
    board.place_card(0, 4, &card(&cards, "WHINER"), Side::Enemy, None);

    engine.modify_power(&mut board, 0, 4, -1);
    engine.modify_power(&mut board, 0, 4, 1);
    engine.modify_power(&mut board, 0, 4, -1);

    let grants = board.drain_hand_grants();
    assert_eq!(grants.len(), 2);
    assert!(grants.iter().all(|g| g.side == Side::Enemy));
    assert!(grants.iter().all(|g| g.card_id == CardId::new("GIFT")));
    assert!(grants.iter().all(|g| g.source == CardId::new("WHINER")));
}

/// A first-time threshold fires on the first upward crossing only.
#[test]
fn test_power_threshold_first_time() {
    let (cards, effects) = registries(
        json!([
            {"id": "T", "name": "Threshold", "cost": 0, "power": 1, "pattern": "", "effect_id": "threshold_eff"}
        ]),
        json!({
            "threshold_eff": {
                "description": "",
                "trigger": "on_power_threshold",
                "scope": "self",
                "operations": [{
                    "type": "modify_power", "stat": "power", "amount": 1,
                    "conditions": {"threshold": {"stat": "power", "value": 3}, "first_time": true}
                }]
            }
        }),
    );
    let engine = EffectEngine::new(&cards, &effects);
    let mut board = Board::create_initial();
    board.place_card(1, 0, &card(&cards, "T"), Side::You, None);

    engine.modify_power(&mut board, 1, 0, 2);
    assert_eq!(board.tile_at(1, 0).power_delta, 3);

    engine.modify_power(&mut board, 1, 0, 1);
    assert_eq!(board.tile_at(1, 0).power_delta, 4);

    engine.modify_power(&mut board, 1, 0, -3);
    engine.modify_power(&mut board, 1, 0, 3);
    assert_eq!(board.tile_at(1, 0).power_delta, 4);
    assert!(board.tile_at(1, 0).trigger_state.threshold_fired(3));
}

/// on_card_played watchers count matching plays, never their own.
#[test]
fn test_card_played_watchers() {
    let (cards, effects) = registries(
        json!([
            {"id": "SPY", "name": "Spy", "cost": 1, "power": 1, "pattern": "", "effect_id": "spy"},
            {"id": "CROWD", "name": "Crowd", "cost": 1, "power": 1, "pattern": "", "effect_id": "crowd"},
            {"id": "PLAIN", "name": "Plain", "cost": 1, "power": 1, "pattern": ""}
        ]),
        json!({
            "spy": {
                "trigger": "on_card_played",
                "scope": "self",
                "operations": [{"type": "modify_power_scale", "per": "played_enemy", "amount_per": 1}]
            },
            "crowd": {
                "trigger": "on_card_played",
                "scope": "self",
                "operations": [{"type": "modify_power_scale", "per": "played_all", "amount_per": 2}]
            }
        }),
    );
    let engine = EffectEngine::new(&cards, &effects);
    let mut board = Board::create_initial();

    play_card(&mut board, &engine, 1, 0, &card(&cards, "SPY"), Side::You).unwrap();
    play_card(&mut board, &engine, 2, 0, &card(&cards, "CROWD"), Side::You).unwrap();
    assert_eq!(engine.compute_effective_power(&board, 1, 0), 1);
    assert_eq!(engine.compute_effective_power(&board, 2, 0), 1);

    play_card(&mut board, &engine, 1, 4, &card(&cards, "PLAIN"), Side::Enemy).unwrap();
    assert_eq!(engine.compute_effective_power(&board, 1, 0), 2);
    assert_eq!(engine.compute_effective_power(&board, 2, 0), 3);

    play_card(&mut board, &engine, 0, 0, &card(&cards, "PLAIN"), Side::You).unwrap();
    assert_eq!(engine.compute_effective_power(&board, 1, 0), 2);
    assert_eq!(engine.compute_effective_power(&board, 2, 0), 5);
}

/// Tokens fill empty owned tiles; on_spawned reads the replaced pawn count.
#[test]
fn test_spawn_tokens_with_pawn_context() {
    let (cards, effects) = registries(
        json!([
            {"id": "SRC", "name": "Spawner", "cost": 0, "power": 1, "pattern": "", "effect_id": "spawn_eff"},
            {"id": "TOK", "name": "Token", "cost": 0, "power": 1, "pattern": "", "effect_id": "spawned_gain"}
        ]),
        json!({
            "spawn_eff": {
                "trigger": "on_play",
                "scope": "self",
                "operations": [
                    {"type": "spawn_token", "token_id": "TOK", "apply_to": "empty_positions", "per_pawns": true}
                ]
            },
            "spawned_gain": {
                "trigger": "on_spawned",
                "scope": "self",
                "operations": [
                    {"type": "modify_power", "stat": "power", "amount": 2, "conditions": {"replaced_pawns": 2}},
                    {"type": "modify_power", "stat": "power", "amount": 3, "conditions": {"replaced_pawns": 3}}
                ]
            }
        }),
    );
    let engine = EffectEngine::new(&cards, &effects);
    let mut board = Board::create_initial();
    let source = CardId::new("SRC");
    for _ in 0..2 {
        board.add_pawn_delta_for_you(Position::new(1, 1), source.clone(), 1);
    }
    for _ in 0..3 {
        board.add_pawn_delta_for_you(Position::new(1, 2), source.clone(), 1);
    }
    board.recompute_influence_from_deltas();

    play_card(&mut board, &engine, 0, 0, &card(&cards, "SRC"), Side::You).unwrap();

    let expected = [((1, 0), 1, 1), ((2, 0), 1, 1), ((1, 1), 2, 3), ((1, 2), 3, 4)];
    for ((lane, col), pawns, power) in expected {
        let tile = board.tile_at(lane, col);
        assert_eq!(tile.card_id, Some(CardId::new("TOK")));
        assert_eq!(tile.origin, Some(Origin::Token { spawned_by: source.clone() }));
        assert_eq!(tile.spawn_context.map(|c| c.replaced_pawns), Some(pawns));
        assert_eq!(engine.compute_effective_power(&board, lane, col), power);
    }
    assert!(!board.tile_at(0, 4).is_occupied());
    assert!(!board.tile_at(0, 1).is_occupied());
}

/// An unknown token id spawns nothing and does not abort the play.
#[test]
fn test_spawn_unknown_token_skipped() {
    let (cards, effects) = registries(
        json!([
            {"id": "SRC", "name": "Spawner", "cost": 0, "power": 1, "pattern": "", "effect_id": "spawn_eff"}
        ]),
        json!({
            "spawn_eff": {
                "trigger": "on_play",
                "scope": "self",
                "operations": [{"type": "spawn_token", "token_id": "GONE", "apply_to": "empty_positions"}]
            }
        }),
    );
    let engine = EffectEngine::new(&cards, &effects);
    let mut board = Board::create_initial();

    play_card(&mut board, &engine, 0, 0, &card(&cards, "SRC"), Side::You).unwrap();

    assert_eq!(board.occupied().count(), 1);
}

/// Replace-ally carries the replaced ally's power into raise follow-ups.
#[test]
fn test_replace_ally_protocol() {
    let (cards, effects) = registries(
        json!([
            {"id": "ALLY", "name": "Ally", "cost": 0, "power": 2, "pattern": ""},
            {"id": "REPL", "name": "Replacer", "cost": 0, "power": 1, "pattern": "B3E", "effect_id": "replace_eff"},
            {"id": "TARGET", "name": "Target", "cost": 0, "power": 1, "pattern": ""}
        ]),
        json!({
            "replace_eff": {
                "trigger": "on_play",
                "scope": "all_cards_on_affected_tiles",
                "operations": [
                    {"type": "replace_ally", "mode": "raise", "adjustment": "replaced_ally_power"},
                    {"type": "modify_power", "stat": "power", "amount": -1}
                ]
            }
        }),
    );
    let engine = EffectEngine::new(&cards, &effects);
    let mut board = Board::create_initial();

    board.place_card(1, 2, &card(&cards, "ALLY"), Side::You, None);
    engine.modify_power(&mut board, 1, 2, 1);
    board.place_card(1, 3, &card(&cards, "TARGET"), Side::You, None);

    engine.replace_ally(&mut board, 1, 2, &card(&cards, "REPL"), Side::You);

    assert_eq!(board.tile_at(1, 2).card_id, Some(CardId::new("REPL")));
    assert_eq!(board.tile_at(1, 2).power_delta, 0);
    assert_eq!(engine.compute_effective_power(&board, 1, 3), 3);
}

/// Expansion claims neutral neighbours, raises owned ones (occupied or
/// not), and skips enemies.
#[test]
fn test_expand_positions() {
    let (cards, effects) = registries(
        json!([
            {"id": "GROW", "name": "Grower", "cost": 0, "power": 1, "pattern": "", "effect_id": "expand"}
        ]),
        json!({
            "expand": {
                "trigger": "on_play",
                "scope": "self",
                "operations": [{"type": "expand_positions", "apply_to": "adjacent"}]
            }
        }),
    );
    let engine = EffectEngine::new(&cards, &effects);
    let mut board = Board::create_initial();
    let seed = CardId::new("seed");
    board.add_pawn_delta_for_enemy(Position::new(0, 1), seed.clone(), 1);
    board.add_pawn_delta_for_you(Position::new(1, 1), seed, 1);
    board.recompute_influence_from_deltas();
    // An occupied owned neighbour is raised like an empty one.
    board.place_card(1, 1, &card(&cards, "GROW"), Side::You, None);

    board.place_card(1, 2, &card(&cards, "GROW"), Side::You, Some(&engine));

    let owner_rank = |board: &Board, lane, col| {
        let tile = board.tile_at(lane, col);
        (tile.owner, tile.rank)
    };
    assert_eq!(owner_rank(&board, 0, 1), (Side::Enemy, 1));
    assert_eq!(owner_rank(&board, 1, 1), (Side::You, 2));
    for (lane, col) in [(0, 2), (0, 3), (1, 3), (2, 1), (2, 2), (2, 3)] {
        assert_eq!(owner_rank(&board, lane, col), (Side::You, 1));
    }

    // Logged as pawn deltas, so a recompute keeps the result.
    board.recompute_influence_from_deltas();
    assert_eq!(owner_rank(&board, 2, 2), (Side::You, 1));
}

/// modify_tile_ranks raises every projection target toward its holder.
#[test]
fn test_modify_tile_ranks() {
    let (cards, effects) = registries(
        json!([
            {"id": "RAISE", "name": "Raiser", "cost": 1, "power": 1, "pattern": "B3P,B2E", "effect_id": "raise2"}
        ]),
        json!({
            "raise2": {
                "trigger": "on_play",
                "scope": "self",
                "operations": [{"type": "modify_tile_ranks", "amount": 2}]
            }
        }),
    );
    let engine = EffectEngine::new(&cards, &effects);
    let mut board = Board::create_initial();

    board.place_card(1, 4, &card(&cards, "RAISE"), Side::Enemy, Some(&engine));

    assert_eq!(board.tile_at(1, 3).owner, Side::Enemy);
    assert_eq!(board.tile_at(1, 3).rank, 2);
    // Effect-only targets are raised as well.
    assert_eq!(board.tile_at(0, 3).owner, Side::Enemy);
    assert_eq!(board.tile_at(0, 3).rank, 2);
}

/// Raising a tile the other side holds pushes it toward its holder, and
/// ranks stop at 3.
#[test]
fn test_modify_tile_ranks_caps_at_max() {
    let (cards, effects) = registries(
        json!([
            {"id": "RAISE", "name": "Raiser", "cost": 1, "power": 1, "pattern": "B3P,B2E", "effect_id": "raise2"}
        ]),
        json!({
            "raise2": {
                "trigger": "on_play",
                "scope": "self",
                "operations": [{"type": "modify_tile_ranks", "amount": 2}]
            }
        }),
    );
    let engine = EffectEngine::new(&cards, &effects);
    let mut board = Board::create_initial();
    board.add_pawn_delta_for_you(Position::new(0, 3), CardId::new("seed"), 2);
    board.add_pawn_delta_for_enemy(Position::new(1, 3), CardId::new("seed"), 3);
    board.recompute_influence_from_deltas();

    board.place_card(1, 4, &card(&cards, "RAISE"), Side::Enemy, Some(&engine));

    assert_eq!(board.tile_at(0, 3).owner, Side::You);
    assert_eq!(board.tile_at(0, 3).rank, 3);
    assert_eq!(board.influence_at(Position::new(0, 3)), 3);
    assert_eq!(board.influence_at(Position::new(1, 3)), -3);
}

/// A supercharged card projects two pawns per cell and skips its on_play
/// rank raise.
#[test]
fn test_supercharged_pawns() {
    let (cards, effects) = registries(
        json!([
            {"id": "CHARGE", "name": "Charger", "cost": 1, "power": 1, "pattern": "B3P",
             "effect_id": "on_play_raise_positions_rank_2"}
        ]),
        json!({
            "on_play_raise_positions_rank_2": {
                "trigger": "on_play",
                "scope": "self",
                "operations": [{"type": "modify_tile_ranks", "amount": 2}]
            }
        }),
    );
    let engine = EffectEngine::new(&cards, &effects);
    let mut board = Board::create_initial();

    play_card(&mut board, &engine, 1, 0, &card(&cards, "CHARGE"), Side::You).unwrap();

    assert_eq!(board.influence_at(Position::new(1, 1)), 2);
    assert_eq!(board.tile_at(1, 1).owner, Side::You);
    assert_eq!(board.tile_at(1, 1).rank, 2);
}

/// A card whose effect id is not registered behaves as if it had none.
#[test]
fn test_unregistered_effect_is_noop() {
    let (cards, effects) = registries(
        json!([
            {"id": "ODD", "name": "Oddity", "cost": 1, "power": 2, "pattern": "B3X", "effect_id": "not_in_registry"}
        ]),
        json!({}),
    );
    let engine = EffectEngine::new(&cards, &effects);
    let mut board = Board::create_initial();

    play_card(&mut board, &engine, 0, 0, &card(&cards, "ODD"), Side::You).unwrap();

    assert_eq!(engine.compute_effective_power(&board, 0, 0), 2);
    assert_eq!(board.tile_at(0, 1).owner, Side::You);
}

/// A self-feeding trigger loop is cut off at the cascade depth.
#[test]
fn test_cascade_guard_stops_loops() {
    let (cards, effects) = registries(
        json!([
            {"id": "LOOP", "name": "Spiral", "cost": 1, "power": 1, "pattern": "", "effect_id": "spiral"}
        ]),
        json!({
            "spiral": {
                "trigger": "on_enfeebled",
                "scope": "self",
                "operations": [{"type": "modify_power", "amount": -1}]
            }
        }),
    );
    let engine = EffectEngine::new(&cards, &effects);
    let mut board = Board::create_initial();
    board.place_card(0, 0, &card(&cards, "LOOP"), Side::You, None);

    engine.modify_power(&mut board, 0, 0, -1);

    assert_eq!(
        board.tile_at(0, 0).power_delta,
        -(MAX_CASCADE_DEPTH as i32 + 1)
    );

    // The guard is released afterwards.
    engine.modify_power(&mut board, 0, 0, -1);
    assert_eq!(
        board.tile_at(0, 0).power_delta,
        -2 * (MAX_CASCADE_DEPTH as i32 + 1)
    );
}
