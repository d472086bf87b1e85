//! Pattern notation parser.
//!
//! Patterns are comma-separated tokens `<Column><Row><Symbol>`:
//! columns `E,D,C,B,A` map left to right onto grid indices `0..4`, rows
//! `1..5` map top to bottom onto `0..4`, and the symbol is one of `P`, `E`,
//! `X`. The placement tile is `C3`, so offsets are `index - 2` on both axes.
//! The placement itself is always emitted first as an implicit `W` cell.

use super::definition::{ProjectionCell, ProjectionCells, Symbol};
use crate::error::{Error, PatternFault, Result};

/// Grid index of the placement cell on both axes.
const CENTER: i32 = 2;

fn column_index(letter: char) -> Option<i32> {
    match letter {
        'E' => Some(0),
        'D' => Some(1),
        'C' => Some(2),
        'B' => Some(3),
        'A' => Some(4),
        _ => None,
    }
}

fn invalid(token: &str, fault: PatternFault) -> Error {
    Error::InvalidPattern {
        token: token.to_string(),
        fault,
    }
}

/// Parse one token into a projection cell.
fn parse_token(token: &str) -> Result<ProjectionCell> {
    let chars: Vec<char> = token.chars().map(|c| c.to_ascii_uppercase()).collect();
    if chars.len() < 3 {
        return Err(invalid(token, PatternFault::Malformed));
    }

    let col = column_index(chars[0]).ok_or_else(|| invalid(token, PatternFault::UnknownColumn))?;

    let row_part: String = chars[1..chars.len() - 1].iter().collect();
    let row: i32 = row_part
        .parse()
        .map_err(|_| invalid(token, PatternFault::NonNumericRow))?;
    if !(1..=5).contains(&row) {
        return Err(invalid(token, PatternFault::RowOutOfRange));
    }

    let symbol = match chars[chars.len() - 1] {
        'P' => Symbol::Pawn,
        'E' => Symbol::Effect,
        'X' => Symbol::Both,
        _ => return Err(invalid(token, PatternFault::UnknownSymbol)),
    };

    Ok(ProjectionCell::new(row - 1 - CENTER, col - CENTER, symbol))
}

/// Parse a pattern string into projection cells.
///
/// Empty tokens (stray commas, surrounding whitespace) are skipped.
///
/// ```
/// use lane_kernel::cards::{parse_pattern, Symbol};
///
/// let cells = parse_pattern("B3X, D2P").unwrap();
/// assert_eq!(cells.len(), 3);
/// assert_eq!((cells[1].row_offset, cells[1].col_offset), (0, 1));
/// assert_eq!(cells[1].symbol, Symbol::Both);
/// assert_eq!((cells[2].row_offset, cells[2].col_offset), (-1, -1));
/// ```
pub fn parse_pattern(pattern: &str) -> Result<ProjectionCells> {
    let mut cells = ProjectionCells::new();
    cells.push(ProjectionCell::new(0, 0, Symbol::Placement));

    for token in pattern.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        cells.push(parse_token(token)?);
    }

    Ok(cells)
}
