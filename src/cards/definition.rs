//! Card records - immutable card data.
//!
//! A `Card` is what the card collaborator hands out: cost, base power, the
//! pattern string and the projection cells parsed from it, and an optional
//! effect id. Per-placement state (power deltas, trigger flags) lives on the
//! board tile, never on the card.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::pattern::parse_pattern;
use crate::error::Result;

/// Unique identifier for a card record.
///
/// Ids come from external data ("001", "T12", ...) so they are strings.
/// The same id may legitimately be on the board more than once.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub String);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for CardId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// What a projection cell carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    /// The placement tile itself (`W`).
    Placement,
    /// Pawn influence only (`P`).
    Pawn,
    /// Effect only (`E`).
    Effect,
    /// Pawn and effect (`X`).
    Both,
}

impl Symbol {
    /// Parse a pattern symbol letter.
    #[must_use]
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'W' => Some(Symbol::Placement),
            'P' => Some(Symbol::Pawn),
            'E' => Some(Symbol::Effect),
            'X' => Some(Symbol::Both),
            _ => None,
        }
    }

    /// Whether pawn influence lands on this cell.
    #[must_use]
    pub const fn carries_pawn(self) -> bool {
        matches!(self, Symbol::Pawn | Symbol::Both)
    }

    /// Whether the card's effect lands on this cell.
    #[must_use]
    pub const fn carries_effect(self) -> bool {
        matches!(self, Symbol::Effect | Symbol::Both)
    }
}

/// One cell of a card's pattern, relative to the placement tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionCell {
    pub row_offset: i32,
    pub col_offset: i32,
    pub symbol: Symbol,
}

impl ProjectionCell {
    #[must_use]
    pub const fn new(row_offset: i32, col_offset: i32, symbol: Symbol) -> Self {
        Self {
            row_offset,
            col_offset,
            symbol,
        }
    }
}

/// Projection cells of one card. Patterns rarely exceed eight cells.
pub type ProjectionCells = SmallVec<[ProjectionCell; 8]>;

/// Immutable card record.
///
/// ## Example
///
/// ```
/// use lane_kernel::cards::{Card, Symbol};
///
/// let card = Card::new("001", "Security Officer", 1, 1, "B3P,C2P,C4P")
///     .unwrap()
///     .with_effect("none");
///
/// assert_eq!(card.projection_cells.len(), 4); // implicit W + three pawns
/// assert_eq!(card.projection_cells[0].symbol, Symbol::Placement);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub cost: u8,
    pub power: i32,
    pub pattern: String,
    pub projection_cells: ProjectionCells,
    pub effect_id: Option<String>,
    /// Human-readable effect text, used as the aura description.
    pub effect_text: Option<String>,
}

impl Card {
    /// Create a card, parsing its pattern.
    pub fn new(
        id: impl Into<CardId>,
        name: impl Into<String>,
        cost: u8,
        power: i32,
        pattern: impl Into<String>,
    ) -> Result<Self> {
        let pattern = pattern.into();
        let projection_cells = parse_pattern(&pattern)?;
        Ok(Self {
            id: id.into(),
            name: name.into(),
            cost,
            power,
            pattern,
            projection_cells,
            effect_id: None,
            effect_text: None,
        })
    }

    /// Attach an effect id (builder pattern).
    #[must_use]
    pub fn with_effect(mut self, effect_id: impl Into<String>) -> Self {
        self.effect_id = Some(effect_id.into());
        self
    }

    /// Attach effect text (builder pattern).
    #[must_use]
    pub fn with_effect_text(mut self, text: impl Into<String>) -> Self {
        self.effect_text = Some(text.into());
        self
    }

    /// Aura description for this card's effect.
    #[must_use]
    pub fn effect_description(&self) -> &str {
        self.effect_text.as_deref().unwrap_or("")
    }
}
