//! Effect registry for definition lookup.
//!
//! The `EffectSource` trait is what the engine consumes. An effect id that
//! is not registered resolves to `None`, which the engine treats as "no
//! effect", so partial data packs never abort a simulation.

use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use super::definition::{EffectDef, RawEffectDef};
use crate::error::{Error, Result};

/// Registry key holding metadata rather than an effect.
const META_KEY: &str = "_meta";

/// Supplies immutable effect definitions by id.
pub trait EffectSource {
    fn get_effect(&self, id: &str) -> Option<&EffectDef>;
}

/// Registry of effect definitions.
///
/// ## Example
///
/// ```
/// use lane_kernel::effects::{EffectRegistry, EffectSource, Trigger};
///
/// let registry = EffectRegistry::from_json_str(r#"{
///     "_meta": {"version": "1.1"},
///     "weaken": {
///         "trigger": "while_in_play",
///         "scope": "enemies_on_affected_tiles",
///         "operations": [{"type": "modify_power", "stat": "power", "amount": -1}]
///     }
/// }"#).unwrap();
///
/// assert_eq!(registry.len(), 1);
/// assert_eq!(registry.get_effect("weaken").unwrap().trigger, Trigger::WhileInPlay);
/// assert!(registry.get_effect("missing").is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct EffectRegistry {
    effects: FxHashMap<String, EffectDef>,
}

impl EffectRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a registry JSON object keyed by effect id.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Map<String, Value> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for (id, value) in entries {
            if id == META_KEY {
                continue;
            }
            let raw: RawEffectDef =
                serde_json::from_value(value).map_err(|err| Error::InvalidEffect {
                    id: id.clone(),
                    reason: err.to_string(),
                })?;
            registry.register(EffectDef::from_raw(&id, raw)?);
        }
        Ok(registry)
    }

    /// Register an effect definition.
    ///
    /// Panics if an effect with the same ID already exists.
    pub fn register(&mut self, effect: EffectDef) {
        if self.effects.contains_key(&effect.id) {
            panic!("Effect with ID {} already registered", effect.id);
        }
        self.effects.insert(effect.id.clone(), effect);
    }

    /// Check if an effect ID is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.effects.contains_key(id)
    }

    /// Get the number of registered effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl EffectSource for EffectRegistry {
    fn get_effect(&self, id: &str) -> Option<&EffectDef> {
        self.effects.get(id)
    }
}
