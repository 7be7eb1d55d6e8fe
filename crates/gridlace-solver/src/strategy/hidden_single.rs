use gridlace_core::Coord;
use tinyvec::ArrayVec;

use super::{BoxedStrategy, Strategy};
use crate::{
    error::PuzzleError,
    grid::{CellMove, ConstraintGrid, Propagation},
};

const NAME: &str = "Hidden Single";

/// Resolves a symbol that only one unresolved cell of some group still
/// admits.
///
/// If every other cell of a row, column, or region has lost a symbol from
/// its candidates, the placement is forced: the remaining cell must hold
/// it. The forced move is applied with full propagation, so one hidden
/// single frequently uncovers the next.
#[derive(Debug, Default, Clone, Copy)]
pub struct HiddenSingle {}

impl HiddenSingle {
    /// Creates a new `HiddenSingle` strategy.
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }
}

impl Strategy for HiddenSingle {
    fn name(&self) -> &'static str {
        NAME
    }

    fn clone_box(&self) -> BoxedStrategy {
        Box::new(*self)
    }

    fn apply(&self, grid: &mut ConstraintGrid) -> Result<bool, PuzzleError> {
        let Some(forced) = find_forced(grid) else {
            return Ok(false);
        };
        grid.apply(forced, Propagation::Full)?;
        Ok(true)
    }
}

fn find_forced(grid: &ConstraintGrid) -> Option<CellMove> {
    for symbol in grid.alphabet().symbols() {
        for group in grid.geometry().groups() {
            let mut admitting: ArrayVec<[Coord; 32]> = ArrayVec::new();
            for &cell in group.cells() {
                if grid.value(cell).is_none() && grid.candidates(cell).contains(symbol) {
                    admitting.push(cell);
                    if admitting.len() > 1 {
                        break;
                    }
                }
            }
            if admitting.len() == 1 {
                return Some(CellMove::new(admitting[0], symbol));
            }
        }
    }
    None
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
    fn test_resolves_last_admitting_cell_of_a_row() {
        let mut grid = empty_9x9();
        let symbol = Symbol::new(1);
        // Row 0 admits the symbol only at (0, 4).
        for col in 0..9 {
            if col != 4 {
                grid.eliminate(Coord::new(0, col), symbol).unwrap();
            }
        }

        StrategyTester::new(grid)
            .apply_once(&HiddenSingle::new())
            .assert_resolved(Coord::new(0, 4), symbol);
    }

    #[test]
    fn test_no_change_on_a_fresh_grid() {
        StrategyTester::new(empty_9x9())
            .apply_once(&HiddenSingle::new())
            .assert_no_change(Coord::new(0, 0))
            .assert_no_change(Coord::new(4, 4));
    }

    #[test]
    fn test_idempotent_after_exhaustion() {
        let mut grid = empty_9x9();
        let symbol = Symbol::new(1);
        for col in 0..9 {
            if col != 4 {
                grid.eliminate(Coord::new(0, col), symbol).unwrap();
            }
        }

        let strategy = HiddenSingle::new();
        while strategy.apply(&mut grid).unwrap() {}
        assert!(!strategy.apply(&mut grid).unwrap());
        assert!(!strategy.apply(&mut grid).unwrap());
    }
}
