//! Breadth-first placement-puzzle solving with constraint propagation.
//!
//! This crate couples two engines:
//!
//! 1. **Constraint propagation**: [`ConstraintGrid`] keeps a candidate set
//!    per cell and, after every move, removes the placed symbol throughout
//!    the cell's neighborhood (cascading through forced resolutions) and
//!    runs the [`strategy`] set to a fixed point.
//! 2. **Breadth-first search**: [`PuzzleSolver`] explores move sequences
//!    over anything implementing [`PuzzleState`], deduplicating states by
//!    canonical fingerprint and yielding solutions lazily. The first
//!    solution found is always a shortest one.
//!
//! The grid is one implementation of the state contract; the engine knows
//! nothing about Sudoku. Any placement puzzle that can enumerate legal
//! moves, clone-and-apply them, and fingerprint itself plugs into the same
//! search.
//!
//! # Examples
//!
//! ```
//! use gridlace_core::{Alphabet, Geometry};
//! use gridlace_solver::{ConstraintGrid, Propagation, PuzzleSolver};
//!
//! let givens = [
//!     "...4....1", "...9.28..", "3......57",
//!     ".7.3.....", "..2.4.1..", "..8.2..65",
//!     ".....9..8", "....1.2..", ".8.....3.",
//! ];
//! let mut grid = ConstraintGrid::from_givens(
//!     Geometry::square(9)?,
//!     Alphabet::for_size(9)?,
//!     &givens,
//! )?;
//!
//! if !grid.is_end_state() {
//!     let moves = PuzzleSolver::new().solve(grid.clone())?.expect("solvable");
//!     for m in &moves {
//!         grid.apply(*m, Propagation::Full)?;
//!     }
//! }
//! assert!(grid.is_end_state());
//! println!("{grid}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod grid;
pub mod search;
pub mod strategy;
pub mod testing;

pub use self::{
    error::{AlgorithmFailure, PuzzleError, RuleViolation},
    grid::{CellMove, ConstraintGrid, Propagation},
    search::{
        PuzzleSolver, PuzzleState, Search, SearchConfig, SearchError, SearchStats, SolutionQuota,
    },
};
