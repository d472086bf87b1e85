//! Placement rules.
//!
//! `Board::place_card` trusts its caller. This module is that caller for
//! ordinary play: it checks legality, then runs the whole placement
//! pipeline (on-play, projection, influence, watchers).

pub mod placement;

pub use placement::{is_legal_placement, legal_placements, play_card};
