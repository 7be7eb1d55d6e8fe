use gridlace_core::{Coord, GroupKind, Symbol};
use tinyvec::ArrayVec;

use super::{BoxedStrategy, Strategy};
use crate::{error::PuzzleError, grid::ConstraintGrid};

const NAME: &str = "Locked Candidates";

/// Eliminates candidates pointed at by a region.
///
/// When every unresolved cell of a region that still admits a symbol lies
/// on one shared row (or column), the symbol must land on that line inside
/// the region, so it is removed from the rest of the line outside the
/// region.
#[derive(Debug, Default, Clone, Copy)]
pub struct LockedCandidates {}

impl LockedCandidates {
    /// Creates a new `LockedCandidates` strategy.
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }
}

impl Strategy for LockedCandidates {
    fn name(&self) -> &'static str {
        NAME
    }

    fn clone_box(&self) -> BoxedStrategy {
        Box::new(*self)
    }

    fn apply(&self, grid: &mut ConstraintGrid) -> Result<bool, PuzzleError> {
        let geometry = grid.geometry().clone();
        let symbols: Vec<Symbol> = grid.alphabet().symbols().collect();
        let size = geometry.size();

        for group in geometry
            .groups()
            .iter()
            .filter(|g| g.kind() == GroupKind::Region)
        {
            for &symbol in &symbols {
                let mut admitting: ArrayVec<[Coord; 32]> = ArrayVec::new();
                for &cell in group.cells() {
                    if grid.value(cell).is_none() && grid.candidates(cell).contains(symbol) {
                        admitting.push(cell);
                    }
                }
                if admitting.len() < 2 {
                    continue;
                }

                let mut changed = false;
                if admitting.iter().all(|c| c.row() == admitting[0].row()) {
                    let row = admitting[0].row();
                    for col in 0..size {
                        let cell = Coord::new(row, col);
                        if geometry.region_of(cell) != group.index() {
                            changed |= grid.eliminate(cell, symbol)?;
                        }
                    }
                } else if admitting.iter().all(|c| c.col() == admitting[0].col()) {
                    let col = admitting[0].col();
                    for row in 0..size {
                        let cell = Coord::new(row, col);
                        if geometry.region_of(cell) != group.index() {
                            changed |= grid.eliminate(cell, symbol)?;
                        }
                    }
                }
                if changed {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use gridlace_core::{Alphabet, Geometry, Symbol};

    use super::*;
    use crate::testing::StrategyTester;

    fn empty_9x9() -> ConstraintGrid {
        ConstraintGrid::empty(Geometry::square(9).unwrap(), Alphabet::for_size(9).unwrap())
            .unwrap()
    }

    #[test]
    fn test_pointing_row_eliminates_outside_the_region() {
        let mut grid = empty_9x9();
        let symbol = Symbol::new(4);
        // Region 0 admits the symbol only on its top row.
        for row in 1..3 {
            for col in 0..3 {
                grid.eliminate(Coord::new(row, col), symbol).unwrap();
            }
        }

        StrategyTester::new(grid)
            .apply_once(&LockedCandidates::new())
            .assert_removed(Coord::new(0, 3), [symbol])
            .assert_removed(Coord::new(0, 8), [symbol])
            // Inside the region nothing moved.
            .assert_no_change(Coord::new(0, 0))
            .assert_no_change(Coord::new(0, 2));
    }

    #[test]
    fn test_pointing_column_eliminates_outside_the_region() {
        let mut grid = empty_9x9();
        let symbol = Symbol::new(6);
        // Region 4 (rows 3-5, cols 3-5) admits the symbol only in column 4.
        for row in 3..6 {
            for col in [3, 5] {
                grid.eliminate(Coord::new(row, col), symbol).unwrap();
            }
        }

        StrategyTester::new(grid)
            .apply_once(&LockedCandidates::new())
            .assert_removed(Coord::new(0, 4), [symbol])
            .assert_removed(Coord::new(8, 4), [symbol])
            .assert_no_change(Coord::new(4, 4));
    }

    #[test]
    fn test_no_change_on_a_fresh_grid() {
        StrategyTester::new(empty_9x9())
            .apply_once(&LockedCandidates::new())
            .assert_no_change(Coord::new(0, 0))
            .assert_no_change(Coord::new(8, 8));
    }

    #[test]
    fn test_idempotent_after_exhaustion() {
        let mut grid = empty_9x9();
        let symbol = Symbol::new(4);
        for row in 1..3 {
            for col in 0..3 {
                grid.eliminate(Coord::new(row, col), symbol).unwrap();
            }
        }

        let strategy = LockedCandidates::new();
        while strategy.apply(&mut grid).unwrap() {}
        assert!(!strategy.apply(&mut grid).unwrap());
        assert!(!strategy.apply(&mut grid).unwrap());
    }
}
