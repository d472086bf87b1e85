//! Effect definitions - the typed registry schema.
//!
//! Registry entries arrive as loosely typed JSON (`RawEffectDef`) and are
//! validated into `EffectDef` at load time, so a malformed entry fails the
//! load instead of surfacing mid-match.
//!
//! ## Schema
//!
//! ```json
//! {
//!   "trigger": "while_in_play",
//!   "scope": "enemies_on_affected_tiles",
//!   "operations": [{"type": "modify_power", "stat": "power", "amount": -1}]
//! }
//! ```

use serde::Deserialize;

use crate::cards::CardId;
use crate::core::Side;
use crate::error::{Error, Result};

/// Event category that makes an effect's operations fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Never applied; contributes live on every power query.
    WhileInPlay,
    OnPlay,
    OnDestroy,
    /// Watcher: another card was destroyed.
    OnCardDestroyed,
    OnEnfeebled,
    OnFirstEnhanced,
    OnFirstEnfeebled,
    OnPowerThreshold,
    /// Watcher: another card was played.
    OnCardPlayed,
    OnSpawned,
    /// Consulted by scoring only.
    OnLaneWin,
    /// Consulted by scoring only.
    OnRoundEnd,
}

impl Trigger {
    const NAMES: [(&'static str, Trigger); 12] = [
        ("while_in_play", Trigger::WhileInPlay),
        ("on_play", Trigger::OnPlay),
        ("on_destroy", Trigger::OnDestroy),
        ("on_card_destroyed", Trigger::OnCardDestroyed),
        ("on_enfeebled", Trigger::OnEnfeebled),
        ("on_first_enhanced", Trigger::OnFirstEnhanced),
        ("on_first_enfeebled", Trigger::OnFirstEnfeebled),
        ("on_power_threshold", Trigger::OnPowerThreshold),
        ("on_card_played", Trigger::OnCardPlayed),
        ("on_spawned", Trigger::OnSpawned),
        ("on_lane_win", Trigger::OnLaneWin),
        ("on_round_end", Trigger::OnRoundEnd),
    ];

    /// Parse a registry trigger name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, trigger)| *trigger)
    }

    /// Registry name of this trigger.
    #[must_use]
    pub fn name(self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(_, t)| *t == self)
            .map_or("", |(n, _)| n)
    }
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which occupants a scope admits, relative to the source's side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    Allies,
    Enemies,
    All,
}

impl Relation {
    /// Whether a target on `target` side is admitted for a source on `source` side.
    ///
    /// ```
    /// use lane_kernel::core::Side;
    /// use lane_kernel::effects::Relation;
    ///
    /// assert!(Relation::Enemies.matches(Side::You, Side::Enemy));
    /// assert!(!Relation::Enemies.matches(Side::You, Side::Neutral));
    /// assert!(Relation::Allies.matches(Side::Enemy, Side::Enemy));
    /// ```
    #[must_use]
    pub fn matches(self, source: Side, target: Side) -> bool {
        match self {
            Relation::All => true,
            Relation::Allies => source == target,
            Relation::Enemies => source != target && source.is_player() && target.is_player(),
        }
    }
}

/// Where a scope looks for targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Locality {
    /// The source's own `E`/`X` projection targets.
    AffectedTiles,
    /// Every other tile in the source's lane.
    Lane,
    /// Every other tile on the board.
    Global,
}

/// Scope of a firing effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The source tile only.
    SelfOnly,
    Cards { relation: Relation, locality: Locality },
    /// Scoring-only; never targets cards.
    LaneOwner,
}

impl Scope {
    /// Parse a registry scope name such as `allies_in_lane`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "self" => return Some(Scope::SelfOnly),
            "lane_owner" => return Some(Scope::LaneOwner),
            _ => {}
        }

        let (relation, rest) = if let Some(rest) = name.strip_prefix("allies_") {
            (Relation::Allies, rest)
        } else if let Some(rest) = name.strip_prefix("enemies_") {
            (Relation::Enemies, rest)
        } else if let Some(rest) = name.strip_prefix("all_cards_") {
            (Relation::All, rest)
        } else {
            return None;
        };

        let locality = match rest {
            "on_affected_tiles" => Locality::AffectedTiles,
            "in_lane" => Locality::Lane,
            "global" => Locality::Global,
            _ => return None,
        };

        Some(Scope::Cards { relation, locality })
    }
}

/// Board event counted by a scaling operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScaleEvent {
    Played,
    Destroyed,
    Enhanced,
    Enfeebled,
    EnhancedOrEnfeebled,
}

/// The `per` predicate of `modify_power_scale`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScalePredicate {
    pub event: ScaleEvent,
    pub relation: Relation,
}

impl ScalePredicate {
    /// Parse a predicate name such as `destroyed_ally`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "enhanced_or_enfeebled_all" {
            return Some(Self {
                event: ScaleEvent::EnhancedOrEnfeebled,
                relation: Relation::All,
            });
        }

        let (event, relation) = name.rsplit_once('_')?;
        let event = match event {
            "played" => ScaleEvent::Played,
            "destroyed" => ScaleEvent::Destroyed,
            "enhanced" => ScaleEvent::Enhanced,
            "enfeebled" => ScaleEvent::Enfeebled,
            _ => return None,
        };
        let relation = match relation {
            "all" => Relation::All,
            "ally" => Relation::Allies,
            "enemy" => Relation::Enemies,
            _ => return None,
        };
        Some(Self { event, relation })
    }
}

/// Optional gates on a `modify_power` operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct OpConditions {
    /// Only apply to targets whose spawn context recorded this many pawns.
    pub replaced_pawns: Option<u8>,
    /// Effective-power value watched by `on_power_threshold`.
    pub threshold: Option<i32>,
    /// Fire the threshold at most once per value per tile.
    pub first_time: bool,
}

/// Direction of a replace-ally follow-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdjustMode {
    Raise,
    Lower,
}

/// Quantity a replace-ally follow-up adjusts by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Adjustment {
    ReplacedAllyPower,
}

/// Where spawned tokens go.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnPlacement {
    /// Every empty, source-owned tile with rank > 0.
    EmptyPositions,
}

/// Scoring adjustment of a `score_bonus` operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScoreBonus {
    /// Flat points added when the card's lane is won.
    Flat(i32),
    /// The losing side's lane sum is added to the winner.
    LaneMinTransfer,
}

/// One validated operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EffectOp {
    ModifyPower {
        amount: i32,
        conditions: OpConditions,
    },
    ModifyPowerScale {
        per: ScalePredicate,
        amount_per: i32,
    },
    DestroyCards,
    ReplaceAlly {
        mode: AdjustMode,
        adjustment: Adjustment,
    },
    AddToHand {
        card_ids: Vec<CardId>,
    },
    SpawnToken {
        token_id: CardId,
        placement: SpawnPlacement,
        per_pawns: bool,
    },
    ModifyTileRanks {
        amount: i32,
    },
    ScoreBonus(ScoreBonus),
    ExpandPositions,
}

impl EffectOp {
    /// Unconditional `modify_power`.
    #[must_use]
    pub fn modify_power(amount: i32) -> Self {
        EffectOp::ModifyPower {
            amount,
            conditions: OpConditions::default(),
        }
    }

    /// `modify_power_scale` with the given predicate.
    #[must_use]
    pub fn scale(per: ScalePredicate, amount_per: i32) -> Self {
        EffectOp::ModifyPowerScale { per, amount_per }
    }

    /// Gating conditions, empty for every kind but `modify_power`.
    #[must_use]
    pub fn conditions(&self) -> OpConditions {
        match self {
            EffectOp::ModifyPower { conditions, .. } => *conditions,
            _ => OpConditions::default(),
        }
    }
}

/// A validated registry entry.
///
/// ## Example
///
/// ```
/// use lane_kernel::effects::{EffectDef, EffectOp, Scope, Trigger};
///
/// let effect = EffectDef::new("self_buff", Trigger::OnPlay, Scope::SelfOnly)
///     .with_op(EffectOp::modify_power(2));
///
/// assert_eq!(effect.operations.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectDef {
    pub id: String,
    pub description: String,
    pub trigger: Trigger,
    pub scope: Scope,
    pub operations: Vec<EffectOp>,
}

impl EffectDef {
    /// Create an effect with no operations.
    pub fn new(id: impl Into<String>, trigger: Trigger, scope: Scope) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            trigger,
            scope,
            operations: Vec::new(),
        }
    }

    /// Append an operation (builder pattern).
    #[must_use]
    pub fn with_op(mut self, op: EffectOp) -> Self {
        self.operations.push(op);
        self
    }

    /// Set the description (builder pattern).
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// `modify_power` amounts that apply unconditionally to a matching target.
    pub(crate) fn power_amounts(&self) -> impl Iterator<Item = i32> + '_ {
        self.operations.iter().filter_map(|op| match op {
            EffectOp::ModifyPower { amount, conditions } if conditions.replaced_pawns.is_none() => {
                Some(*amount)
            }
            _ => None,
        })
    }

    /// Validate a raw registry entry.
    pub(crate) fn from_raw(id: &str, raw: RawEffectDef) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidEffect {
            id: id.to_string(),
            reason,
        };

        let trigger = Trigger::from_name(&raw.trigger)
            .ok_or_else(|| invalid(format!("unknown trigger `{}`", raw.trigger)))?;
        let scope = Scope::from_name(&raw.scope)
            .ok_or_else(|| invalid(format!("unknown scope `{}`", raw.scope)))?;
        let operations = raw
            .operations
            .into_iter()
            .map(|op| op.validate().map_err(&invalid))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id: id.to_string(),
            description: raw.description,
            trigger,
            scope,
            operations,
        })
    }
}

/// Registry entry as authored.
#[derive(Debug, Deserialize)]
pub(crate) struct RawEffectDef {
    #[serde(default)]
    description: String,
    trigger: String,
    scope: String,
    #[serde(default)]
    operations: Vec<RawEffectOp>,
}

/// Operation as authored: one flat record for every kind.
#[derive(Debug, Deserialize)]
struct RawEffectOp {
    #[serde(rename = "type")]
    kind: String,
    stat: Option<String>,
    amount: Option<i32>,
    apply_to: Option<String>,
    per: Option<String>,
    amount_per: Option<i32>,
    card_ids: Option<Vec<String>>,
    adjustment: Option<String>,
    mode: Option<String>,
    token_id: Option<String>,
    #[serde(default)]
    per_pawns: bool,
    conditions: Option<RawConditions>,
}

#[derive(Debug, Deserialize)]
struct RawConditions {
    replaced_pawns: Option<u8>,
    threshold: Option<RawThreshold>,
    #[serde(default)]
    first_time: bool,
}

#[derive(Debug, Deserialize)]
struct RawThreshold {
    value: i32,
}

fn required<T>(value: Option<T>, kind: &str, field: &str) -> std::result::Result<T, String> {
    value.ok_or_else(|| format!("`{kind}` requires `{field}`"))
}

impl RawEffectOp {
    fn validate(self) -> std::result::Result<EffectOp, String> {
        let kind = self.kind.as_str();
        let op = match kind {
            "modify_power" => {
                if let Some(stat) = self.stat.as_deref().filter(|s| *s != "power") {
                    return Err(format!("unsupported stat `{stat}`"));
                }
                let conditions = self.conditions.map_or_else(OpConditions::default, |c| {
                    OpConditions {
                        replaced_pawns: c.replaced_pawns,
                        threshold: c.threshold.map(|t| t.value),
                        first_time: c.first_time,
                    }
                });
                EffectOp::ModifyPower {
                    amount: required(self.amount, kind, "amount")?,
                    conditions,
                }
            }
            "modify_power_scale" => {
                let per = required(self.per, kind, "per")?;
                EffectOp::ModifyPowerScale {
                    per: ScalePredicate::from_name(&per)
                        .ok_or_else(|| format!("unknown scale predicate `{per}`"))?,
                    amount_per: required(self.amount_per, kind, "amount_per")?,
                }
            }
            "destroy_cards" => EffectOp::DestroyCards,
            "replace_ally" => {
                let mode = match required(self.mode, kind, "mode")?.as_str() {
                    "raise" => AdjustMode::Raise,
                    "lower" => AdjustMode::Lower,
                    other => return Err(format!("unknown replace mode `{other}`")),
                };
                let adjustment = match required(self.adjustment, kind, "adjustment")?.as_str() {
                    "replaced_ally_power" => Adjustment::ReplacedAllyPower,
                    other => return Err(format!("unknown adjustment `{other}`")),
                };
                EffectOp::ReplaceAlly { mode, adjustment }
            }
            "add_to_hand" => EffectOp::AddToHand {
                card_ids: required(self.card_ids, kind, "card_ids")?
                    .into_iter()
                    .map(CardId::from)
                    .collect(),
            },
            "spawn_token" => {
                let placement = match required(self.apply_to, kind, "apply_to")?.as_str() {
                    "empty_positions" => SpawnPlacement::EmptyPositions,
                    other => return Err(format!("unknown spawn placement `{other}`")),
                };
                EffectOp::SpawnToken {
                    token_id: CardId::from(required(self.token_id, kind, "token_id")?),
                    placement,
                    per_pawns: self.per_pawns,
                }
            }
            "modify_tile_ranks" => EffectOp::ModifyTileRanks {
                amount: required(self.amount, kind, "amount")?,
            },
            "score_bonus" => match (self.amount, self.mode.as_deref()) {
                (_, Some("lane_min_transfer")) => EffectOp::ScoreBonus(ScoreBonus::LaneMinTransfer),
                (_, Some(other)) => return Err(format!("unknown score mode `{other}`")),
                (Some(amount), None) => EffectOp::ScoreBonus(ScoreBonus::Flat(amount)),
                (None, None) => return Err("`score_bonus` requires `amount` or `mode`".into()),
            },
            "expand_positions" => match self.apply_to.as_deref() {
                None | Some("adjacent") => EffectOp::ExpandPositions,
                Some(other) => return Err(format!("unknown expand target `{other}`")),
            },
            other => return Err(format!("unknown operation `{other}`")),
        };
        Ok(op)
    }
}
