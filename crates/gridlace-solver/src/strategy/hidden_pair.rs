use gridlace_core::{Coord, Group, Symbol, SymbolSet};
use tinyvec::ArrayVec;

use super::{BoxedStrategy, Strategy};
use crate::{error::PuzzleError, grid::ConstraintGrid};

const NAME: &str = "Hidden Pair";

/// Locks two cells to a pair of symbols confined to them.
///
/// When two symbols' admitting cells within a group are the same two cells,
/// those cells must hold the pair in some order; every other candidate is
/// purged from them.
#[derive(Debug, Default, Clone, Copy)]
pub struct HiddenPair {}

impl HiddenPair {
    /// Creates a new `HiddenPair` strategy.
    #[must_use]
    pub const fn new() -> Self {
        Self {}
    }
}

impl Strategy for HiddenPair {
    fn name(&self) -> &'static str {
        NAME
    }

    fn clone_box(&self) -> BoxedStrategy {
        Box::new(*self)
    }

    fn apply(&self, grid: &mut ConstraintGrid) -> Result<bool, PuzzleError> {
        let geometry = grid.geometry().clone();
        let size = u16::from(geometry.size());
        let symbols: Vec<Symbol> = grid.alphabet().symbols().collect();

        for group in geometry.groups() {
            for (i, &a) in symbols.iter().enumerate() {
                if grid.placements(a) == size {
                    continue;
                }
                let cells_a = admitting_cells(grid, group, a);
                if cells_a.len() != 2 {
                    continue;
                }
                for &b in &symbols[i + 1..] {
                    if grid.placements(b) == size {
                        continue;
                    }
                    if admitting_cells(grid, group, b) != cells_a {
                        continue;
                    }

                    // The pair owns both cells; purge everything else.
                    let pair = SymbolSet::only(a) | SymbolSet::only(b);
                    let mut changed = false;
                    for &cell in &cells_a {
                        for extra in grid.candidates(cell).difference(pair) {
                            changed |= grid.eliminate(cell, extra)?;
                        }
                    }
                    if changed {
                        return Ok(true);
                    }
                }
            }
        }
        Ok(false)
    }
}

fn admitting_cells(grid: &ConstraintGrid, group: &Group, symbol: Symbol) -> ArrayVec<[Coord; 32]> {
    let mut cells = ArrayVec::new();
    for &cell in group.cells() {
        if grid.value(cell).is_none() && grid.candidates(cell).contains(symbol) {
            cells.push(cell);
        }
    }
    cells
}
