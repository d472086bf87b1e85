//! Board coordinates.
//!
//! The board is `LANES` rows by `COLS` columns. Lane 0 is the top lane,
//! column 0 is the leftmost (home) column of `You`.
//!
//! ```
//! use lane_kernel::core::Position;
//!
//! let mid = Position::new(1, 2);
//! assert_eq!(mid.offset(-1, 2), Some(Position::new(0, 4)));
//! assert_eq!(mid.offset(0, 3), None); // off the board
//! ```

use serde::{Deserialize, Serialize};

/// Number of lanes (board rows).
pub const LANES: usize = 3;

/// Number of columns per lane.
pub const COLS: usize = 5;

/// Highest visible tile rank.
pub const MAX_RANK: u8 = 3;

/// A tile coordinate. Ordered row-major, which is the canonical scan order
/// everywhere in the kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub lane: usize,
    pub col: usize,
}

impl Position {
    /// Create a position. Callers are trusted to stay on the board.
    #[must_use]
    pub const fn new(lane: usize, col: usize) -> Self {
        Self { lane, col }
    }

    /// Checked constructor.
    #[must_use]
    pub const fn checked(lane: usize, col: usize) -> Option<Self> {
        if lane < LANES && col < COLS {
            Some(Self { lane, col })
        } else {
            None
        }
    }

    /// Apply a signed offset, returning `None` when it leaves the board.
    #[must_use]
    pub fn offset(self, d_lane: i32, d_col: i32) -> Option<Self> {
        let lane = self.lane as i32 + d_lane;
        let col = self.col as i32 + d_col;
        if lane < 0 || col < 0 {
            return None;
        }
        Self::checked(lane as usize, col as usize)
    }

    /// Horizontal mirror (`col -> COLS - 1 - col`).
    #[must_use]
    pub const fn mirrored(self) -> Self {
        Self {
            lane: self.lane,
            col: COLS - 1 - self.col,
        }
    }

    /// Row-major index into a flat tile array.
    #[must_use]
    pub const fn index(self) -> usize {
        self.lane * COLS + self.col
    }

    /// Iterate over every board position in row-major order.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..LANES).flat_map(|lane| (0..COLS).map(move |col| Position { lane, col }))
    }

    /// Iterate over the positions of one lane, left to right.
    pub fn lane_positions(lane: usize) -> impl Iterator<Item = Position> {
        (0..COLS).map(move |col| Position { lane, col })
    }

    /// The up-to-eight neighbours of this position, row-major.
    pub fn neighbours(self) -> impl Iterator<Item = Position> {
        (-1..=1i32)
            .flat_map(|dl| (-1..=1i32).map(move |dc| (dl, dc)))
            .filter(|&(dl, dc)| dl != 0 || dc != 0)
            .filter_map(move |(dl, dc)| self.offset(dl, dc))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lane, self.col)
    }
}
