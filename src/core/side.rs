//! Side identification.
//!
//! ## Side
//!
//! The two competing sides plus `Neutral`, which is what an unclaimed tile
//! reports. Influence is signed from the perspective of `You`: positive
//! influence belongs to `You`, negative to `Enemy`.

use serde::{Deserialize, Serialize};

/// Which side a tile or card belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// The local player (left side of the board).
    You,
    /// The opponent (right side of the board).
    Enemy,
    /// Unclaimed.
    Neutral,
}

impl Side {
    /// The opposing side. `Neutral` has no opponent.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Side::You => Side::Enemy,
            Side::Enemy => Side::You,
            Side::Neutral => Side::Neutral,
        }
    }

    /// Sign of this side's influence contributions.
    ///
    /// ```
    /// use lane_kernel::core::Side;
    ///
    /// assert_eq!(Side::You.influence_sign(), 1);
    /// assert_eq!(Side::Enemy.influence_sign(), -1);
    /// assert_eq!(Side::Neutral.influence_sign(), 0);
    /// ```
    #[must_use]
    pub const fn influence_sign(self) -> i32 {
        match self {
            Side::You => 1,
            Side::Enemy => -1,
            Side::Neutral => 0,
        }
    }

    /// Derive the owning side from a net influence value.
    #[must_use]
    pub const fn from_influence(influence: i32) -> Self {
        if influence > 0 {
            Side::You
        } else if influence < 0 {
            Side::Enemy
        } else {
            Side::Neutral
        }
    }

    /// Whether this is one of the two competing sides.
    #[must_use]
    pub const fn is_player(self) -> bool {
        !matches!(self, Side::Neutral)
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Side::You => "Y",
            Side::Enemy => "E",
            Side::Neutral => "N",
        };
        f.write_str(tag)
    }
}
