//! Core types: sides, board positions, geometry constants.
//!
//! Everything here is plain `Copy` data shared by every other module.

pub mod position;
pub mod side;

pub use position::{Position, COLS, LANES, MAX_RANK};
pub use side::Side;
