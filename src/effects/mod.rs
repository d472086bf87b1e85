//! Effect system: registry schema, lookup, and the resolution engine.
//!
//! ## Key Types
//!
//! - `EffectDef`/`EffectOp`: validated trigger, scope, and operations
//! - `EffectSource`: Lookup seam; `EffectRegistry` is the in-memory source
//! - `EffectEngine`: Effective power, scope resolution, and every
//!   effect-driven mutation (on-play, destruction, spawning, triggers)
//!
//! ## Determinism
//!
//! The engine never iterates a hash map to produce results. Scans are
//! row-major, projection targets keep pattern order, and board logs keep
//! insertion order.

mod definition;
mod engine;
mod registry;
mod resolution;

pub use definition::{
    AdjustMode, Adjustment, EffectDef, EffectOp, Locality, OpConditions, Relation, ScaleEvent,
    ScalePredicate, Scope, ScoreBonus, SpawnPlacement, Trigger,
};
pub use engine::{EffectEngine, ScopeTargets, MAX_CASCADE_DEPTH};
pub use registry::{EffectRegistry, EffectSource};
