//! Card registry for record lookup.
//!
//! The `CardSource` trait is the seam the engine consumes; `CardRegistry`
//! is the in-memory implementation, optionally loaded from the JSON card
//! database (an array of card records).

use rustc_hash::FxHashMap;
use serde::Deserialize;

use super::definition::{Card, CardId};
use crate::error::{Error, Result};

/// Supplies immutable card records by id.
pub trait CardSource {
    /// Look up a card, failing with `UnknownCard` when absent.
    fn get_card(&self, id: &CardId) -> Result<&Card>;
}

/// Raw card database entry. Extra fields in the database are ignored.
#[derive(Debug, Deserialize)]
struct CardRecord {
    id: String,
    #[serde(default)]
    name: String,
    cost: u8,
    power: i32,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    effect_id: Option<String>,
    #[serde(default)]
    effect: Option<String>,
}

impl TryFrom<CardRecord> for Card {
    type Error = Error;

    fn try_from(record: CardRecord) -> Result<Self> {
        let mut card = Card::new(
            record.id,
            record.name,
            record.cost,
            record.power,
            record.pattern.unwrap_or_default(),
        )?;
        card.effect_id = record.effect_id.filter(|id| !id.is_empty());
        card.effect_text = record.effect;
        Ok(card)
    }
}

/// Registry of card records.
///
/// ## Example
///
/// ```
/// use lane_kernel::cards::{Card, CardId, CardRegistry, CardSource};
///
/// let mut registry = CardRegistry::new();
/// registry.register(Card::new("001", "Security Officer", 1, 1, "B3P").unwrap());
///
/// let found = registry.get_card(&CardId::new("001")).unwrap();
/// assert_eq!(found.name, "Security Officer");
/// assert!(registry.get_card(&CardId::new("999")).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, Card>,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a registry from a JSON array of card records.
    ///
    /// Every pattern is parsed here, so a malformed pattern fails the load.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<CardRecord> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for record in records {
            registry.register(Card::try_from(record)?);
        }
        Ok(registry)
    }

    /// Register a card record.
    ///
    /// Panics if a card with the same ID already exists.
    pub fn register(&mut self, card: Card) {
        if self.cards.contains_key(&card.id) {
            panic!("Card with ID {} already registered", card.id);
        }
        self.cards.insert(card.id.clone(), card);
    }

    /// Get a card by ID.
    #[must_use]
    pub fn get(&self, id: &CardId) -> Option<&Card> {
        self.cards.get(id)
    }

    /// Check if a card ID is registered.
    #[must_use]
    pub fn contains(&self, id: &CardId) -> bool {
        self.cards.contains_key(id)
    }

    /// Get the number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all card records (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }
}

impl CardSource for CardRegistry {
    fn get_card(&self, id: &CardId) -> Result<&Card> {
        self.cards
            .get(id)
            .ok_or_else(|| Error::UnknownCard(id.clone()))
    }
}
