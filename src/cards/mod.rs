//! Card system: records, pattern parsing, and the card collaborator.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier for card records
//! - `Card`: Immutable record with parsed projection cells
//! - `CardSource`: Lookup seam consumed by the effect engine
//! - `CardRegistry`: In-memory `CardSource`

pub mod definition;
pub mod pattern;
pub mod registry;

pub use definition::{Card, CardId, ProjectionCell, ProjectionCells, Symbol};
pub use pattern::parse_pattern;
pub use registry::{CardRegistry, CardSource};
