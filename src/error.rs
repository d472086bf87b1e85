//! Error types.
//!
//! Data-loading errors (bad patterns, bad effect entries, unknown cards)
//! surface to the caller. Failures while resolving effects during a live
//! simulation are logged and skipped by the engine instead, so a partial
//! data pack never aborts a match.

use thiserror::Error;

use crate::cards::CardId;

/// Why a pattern token was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternFault {
    /// Token shorter than `<column><row><symbol>`.
    Malformed,
    /// Column letter outside `E,D,C,B,A`.
    UnknownColumn,
    /// Row part is not a number.
    NonNumericRow,
    /// Row number outside `1..=5`.
    RowOutOfRange,
    /// Symbol outside `P,E,X`.
    UnknownSymbol,
}

impl std::fmt::Display for PatternFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            PatternFault::Malformed => "malformed token",
            PatternFault::UnknownColumn => "unknown column letter",
            PatternFault::NonNumericRow => "non-numeric row",
            PatternFault::RowOutOfRange => "row out of range",
            PatternFault::UnknownSymbol => "unknown projection symbol",
        };
        f.write_str(text)
    }
}

/// Crate error type.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// A pattern token could not be parsed.
    #[error("invalid pattern token `{token}`: {fault}")]
    InvalidPattern { token: String, fault: PatternFault },

    /// The card source has no record for this id.
    #[error("unknown card {0}")]
    UnknownCard(CardId),

    /// An effect registry entry failed validation.
    #[error("invalid effect `{id}`: {reason}")]
    InvalidEffect { id: String, reason: String },

    /// A JSON document could not be decoded.
    #[error("json decode failed: {0}")]
    Json(String),

    /// A placement was rejected by the legality check.
    #[error("illegal placement at ({lane}, {col}): {reason}")]
    IllegalPlacement {
        lane: usize,
        col: usize,
        reason: &'static str,
    },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, Error>;
