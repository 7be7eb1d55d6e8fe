//! Test utilities for strategy and solver verification.
//!
//! This module provides [`StrategyTester`], a harness for checking that
//! propagation strategies make exactly the deductions they should, plus the
//! reference puzzles (with verified solutions) shared by unit tests and
//! benchmarks.
//!
//! # Example
//!
//! ```
//! use gridlace_core::{Alphabet, Coord, Geometry};
//! use gridlace_solver::{ConstraintGrid, strategy::HiddenSingle, testing::StrategyTester};
//!
//! let grid = ConstraintGrid::from_givens(
//!     Geometry::square(9)?,
//!     Alphabet::for_size(9)?,
//!     &["........."],
//! )?;
//!
//! StrategyTester::new(grid)
//!     .apply_once(&HiddenSingle::new())
//!     .assert_no_change(Coord::new(0, 0));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use gridlace_core::{Alphabet, Coord, Geometry, Symbol};

use crate::{
    grid::{ConstraintGrid, Propagation},
    search::PuzzleSolver,
    strategy::Strategy,
};

/// A test harness for verifying strategy implementations.
///
/// The tester keeps the initial grid next to the current one, so
/// assertions can talk about what a strategy *changed*, not just the state
/// it left behind. All methods return `self` for chaining and panic with
/// `#[track_caller]` locations on failure.
#[derive(Debug)]
pub struct StrategyTester {
    initial: ConstraintGrid,
    current: ConstraintGrid,
}

impl StrategyTester {
    /// Creates a tester from an initial grid state.
    #[must_use]
    pub fn new(initial: ConstraintGrid) -> Self {
        let current = initial.clone();
        Self { initial, current }
    }

    /// Applies the strategy once and returns self for chaining.
    ///
    /// # Panics
    ///
    /// Panics if the strategy reports a fault.
    #[track_caller]
    pub fn apply_once(mut self, strategy: &dyn Strategy) -> Self {
        strategy
            .apply(&mut self.current)
            .unwrap_or_else(|fault| panic!("{} failed: {fault}", strategy.name()));
        self
    }

    /// Asserts that the given symbols were removed from a cell's
    /// candidates.
    ///
    /// # Panics
    ///
    /// Panics if any symbol was not a candidate initially or still is one.
    #[track_caller]
    pub fn assert_removed(self, cell: Coord, symbols: impl IntoIterator<Item = Symbol>) -> Self {
        for symbol in symbols {
            assert!(
                self.initial.candidates(cell).contains(symbol),
                "{symbol:?} was never a candidate at {cell}"
            );
            assert!(
                !self.current.candidates(cell).contains(symbol),
                "{symbol:?} still a candidate at {cell}"
            );
        }
        self
    }

    /// Asserts that a cell is now resolved to the given symbol.
    ///
    /// # Panics
    ///
    /// Panics if the cell holds anything else.
    #[track_caller]
    pub fn assert_resolved(self, cell: Coord, symbol: Symbol) -> Self {
        assert_eq!(
            self.current.value(cell),
            Some(symbol),
            "expected {cell} resolved to {symbol:?}"
        );
        self
    }

    /// Asserts that a cell's candidates are untouched.
    ///
    /// # Panics
    ///
    /// Panics if the cell's candidate set changed.
    #[track_caller]
    pub fn assert_no_change(self, cell: Coord) -> Self {
        assert_eq!(
            self.current.candidates(cell),
            self.initial.candidates(cell),
            "candidates at {cell} changed"
        );
        self
    }

    /// The grid after the applied strategies.
    #[must_use]
    pub fn grid(&self) -> &ConstraintGrid {
        &self.current
    }
}

/// Renders solution rows the way [`ConstraintGrid`] fingerprints them: one
/// centered three-character field per cell, one line per row.
#[must_use]
pub fn rendered(rows: &[&str]) -> String {
    let mut out = String::new();
    for row in rows {
        for ch in row.chars() {
            out.push_str(&format!("{ch:^3}"));
        }
        out.push('\n');
    }
    out
}

/// Solves a fixture to completion (through the engine if construction
/// propagation leaves blanks) and checks the result cell-for-cell against
/// the fixture's reference solution.
///
/// # Panics
///
/// Panics if the puzzle cannot be built, cannot be solved, or solves to
/// anything but the reference grid.
#[track_caller]
pub fn assert_solves_to_reference(
    geometry: Geometry,
    alphabet: Alphabet,
    fixture: &fixtures::Fixture,
) {
    let mut grid = ConstraintGrid::from_givens(geometry, alphabet, fixture.givens)
        .expect("fixture givens must be valid");

    if !grid.is_end_state() {
        let moves = PuzzleSolver::new()
            .solve(grid.clone())
            .expect("search must not fault")
            .expect("fixture must be solvable");
        for m in &moves {
            grid.apply(*m, Propagation::Full)
                .expect("replaying a found solution must succeed");
        }
    }

    assert!(grid.is_end_state());
    assert_eq!(grid.canonical_state(), rendered(fixture.solution));
}

/// Reference puzzles with verified solutions.
pub mod fixtures {
    /// A puzzle's givens and its unique solution.
    #[derive(Debug, Clone, Copy)]
    pub struct Fixture {
        /// One string per row; `.` denotes an unknown cell.
        pub givens: &'static [&'static str],
        /// The solved grid, one string per row.
        pub solution: &'static [&'static str],
    }

    /// A quickly solvable 9×9 puzzle.
    pub const EASY_9X9: Fixture = Fixture {
        givens: &[
            "5.1.7...6",
            "6.....14.",
            ".....4.2.",
            ".5...92.8",
            "....8....",
            "2.85...7.",
            ".3.1.....",
            ".65.....2",
            "9...6.3.7",
        ],
        solution: &[
            "541372896",
            "627958143",
            "389614725",
            "156749238",
            "473286951",
            "298531674",
            "834127569",
            "765893412",
            "912465387",
        ],
    };

    /// A sparse 21-given 9×9 puzzle that defeats propagation alone.
    pub const HARD_9X9: Fixture = Fixture {
        givens: &[
            "..9...2..",
            ".8.5...1.",
            "7.......6",
            "..6.9....",
            ".5.8..3..",
            "4....7...",
            ".....4..9",
            ".3..1..8.",
            "...2..5..",
        ],
        solution: &[
            "319468275",
            "682573914",
            "745921836",
            "876392451",
            "251846397",
            "493157628",
            "528734169",
            "934615782",
            "167289543",
        ],
    };

    /// A 12×12 puzzle with 3×4 regions and the `1-9A-C` alphabet.
    pub const TWELVE_3X4: Fixture = Fixture {
        givens: &[
            "..1.6.2.A7..",
            "62.5B...1...",
            ".8....C3B.62",
            "A97.2.6..B5.",
            ".5.......37C",
            "3B.....7...9",
            "57B.4......1",
            "8......A.9..",
            ".4..97...6..",
            ".1C........B",
            "4......2.C..",
            "....5C..7126",
        ],
        solution: &[
            "C31B6425A798",
            "62A5B97814C3",
            "7894A1C3B562",
            "A97C23618B54",
            "15468BA9237C",
            "3B28C5476A19",
            "57B9468C32A1",
            "8C61325A49B7",
            "243A971BC685",
            "91C27A36584B",
            "465718B29C3A",
            "BA835C947126",
        ],
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_matches_grid_display() {
        let grid = ConstraintGrid::from_givens(
            Geometry::square(9).unwrap(),
            Alphabet::for_size(9).unwrap(),
            fixtures::EASY_9X9.solution,
        )
        .unwrap();
        assert_eq!(grid.to_string(), rendered(fixtures::EASY_9X9.solution));
    }
}
