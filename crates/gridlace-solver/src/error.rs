//! Fault taxonomy for puzzle grids.
//!
//! Two kinds of fault exist at the grid level:
//!
//! - [`RuleViolation`]: the attempted transition breaks the One Rule (or
//!   the givens were malformed). Always recoverable: the caller discards
//!   the transition and moves on.
//! - [`AlgorithmFailure`]: an internal consistency check that propagation
//!   relies on has failed. This is a defect signal, not a puzzle-data
//!   problem; callers should treat it as fatal rather than retry.
//!
//! [`PuzzleError`] is the union of the two, raised by move application.

use derive_more::{Display, Error, From};
use gridlace_core::Coord;

/// A One-Rule constraint violation.
///
/// Raised when a move or a propagation step would contradict the rule that
/// each symbol appears exactly once in every group, or when puzzle givens
/// are malformed. The grid that raised it must be discarded (or, for
/// in-place application, not used further); the fault itself is recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum RuleViolation {
    /// Removing a candidate would leave a cell with no candidates at all.
    #[display("no candidates remain at {cell}")]
    NoCandidates {
        /// The emptied cell.
        cell: Coord,
    },
    /// A move's symbol is not in the target cell's candidate set.
    #[display("{symbol:?} is not a candidate at {cell}")]
    NotACandidate {
        /// The move's target cell.
        cell: Coord,
        /// The move's symbol, as its display character.
        symbol: char,
    },
    /// A group holds the same resolved symbol twice.
    #[display("a group holds the same symbol twice")]
    GroupConflict,
    /// A given used a character that is neither a symbol nor the
    /// placeholder.
    #[display("given {symbol:?} at row {row}, column {col} is not in the alphabet")]
    UnknownSymbol {
        /// Row of the offending given.
        row: usize,
        /// Column of the offending given.
        col: usize,
        /// The unrecognized character.
        symbol: char,
    },
    /// A given lies outside the grid.
    #[display("given at row {row}, column {col} is outside a {size}x{size} grid")]
    GivenOutOfBounds {
        /// Row of the offending given.
        row: usize,
        /// Column of the offending given.
        col: usize,
        /// The grid size.
        size: u8,
    },
    /// The alphabet does not have one symbol per grid size.
    #[display("alphabet of {alphabet} symbols cannot fill a size-{grid} grid")]
    AlphabetMismatch {
        /// The alphabet's symbol count.
        alphabet: u8,
        /// The grid size.
        grid: u8,
    },
}

/// An internal sanity check failed; "should never happen".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("internal solver defect: {context}")]
pub struct AlgorithmFailure {
    context: &'static str,
}

impl AlgorithmFailure {
    pub(crate) const fn new(context: &'static str) -> Self {
        Self { context }
    }

    /// The invariant that was found broken.
    #[must_use]
    pub const fn context(&self) -> &'static str {
        self.context
    }
}

/// Any fault raised while applying and propagating a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, From)]
pub enum PuzzleError {
    /// A recoverable One-Rule violation; discard the attempted transition.
    #[display("{_0}")]
    Rule(RuleViolation),
    /// An unrecoverable defect signal.
    #[display("{_0}")]
    Algorithm(AlgorithmFailure),
}
