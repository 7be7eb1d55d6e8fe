//! Puzzle geometry: rows, columns, and regions.
//!
//! A [`Geometry`] describes the shape of one puzzle family: which cells form
//! which groups, which region each cell belongs to, and which cells share a
//! group with which. All of that is derived once per `(size, partition)`
//! pair, interned in a process-wide cache, and shared read-only by every
//! puzzle instance with that shape; the tables are never mutated after
//! construction.
//!
//! # Examples
//!
//! ```
//! use gridlace_core::{Coord, Geometry, GroupKind};
//!
//! let geometry = Geometry::square(9)?;
//!
//! // Groups come in a stable order: rows, then columns, then regions.
//! assert_eq!(geometry.groups()[0].kind(), GroupKind::Row);
//! assert_eq!(geometry.groups()[26].kind(), GroupKind::Region);
//!
//! // The centre cell of a 9×9 grid sits in region 4.
//! assert_eq!(geometry.region_of(Coord::new(4, 4)), 4);
//! # Ok::<(), gridlace_core::GeometryError>(())
//! ```

use std::{
    collections::HashMap,
    sync::{Arc, LazyLock, Mutex, PoisonError},
};

use derive_more::{Display, Error};

use crate::{Coord, MAX_GRID_SIZE};

/// The kinds of cell groups subject to the one-symbol-per-group rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// A horizontal line of cells.
    Row,
    /// A vertical line of cells.
    Column,
    /// One part of the region partition (a box, in square layouts).
    Region,
}

/// An ordered list of the cells forming one row, column, or region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    kind: GroupKind,
    index: u8,
    cells: Vec<Coord>,
}

impl Group {
    /// The kind of group this is.
    #[must_use]
    #[inline]
    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    /// The group's index within its kind (row number, column number, or
    /// region number).
    #[must_use]
    #[inline]
    pub fn index(&self) -> u8 {
        self.index
    }

    /// The cells of the group, in their defining order.
    #[must_use]
    #[inline]
    pub fn cells(&self) -> &[Coord] {
        &self.cells
    }
}

/// Errors from geometry construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum GeometryError {
    /// The grid size is outside the supported range.
    #[display("grid size {size} is out of range (2-{})", MAX_GRID_SIZE)]
    SizeOutOfRange {
        /// The requested size.
        size: u8,
    },
    /// The size has no integer square root, so no default square-region
    /// layout exists.
    #[display("size {size} cannot be tiled with square regions")]
    NotASquare {
        /// The requested size.
        size: u8,
    },
    /// A region names a cell outside the grid.
    #[display("region cell {cell} is outside a {size}x{size} grid")]
    CellOutOfBounds {
        /// The offending cell.
        cell: Coord,
        /// The grid size.
        size: u8,
    },
    /// A grid cell is not covered by any region.
    #[display("cell {cell} is not covered by any region")]
    UnassignedCell {
        /// The uncovered cell.
        cell: Coord,
    },
}

/// The immutable geometry of one puzzle shape.
///
/// Cloning is cheap (the tables live behind an [`Arc`]); constructing
/// through [`Geometry::square`], [`Geometry::rectangular`], or
/// [`Geometry::with_regions`] interns the result process-wide, so every
/// puzzle of the same shape shares one copy of the tables.
///
/// The constructors check only what the derived tables need (size range,
/// region cells in bounds, every cell covered by some region). Deeper
/// well-formedness of a custom partition (exactly `size` regions of
/// exactly `size` cells each, no overlaps) is the caller's obligation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometry {
    inner: Arc<Inner>,
}

#[derive(Debug, PartialEq, Eq)]
struct Inner {
    size: u8,
    groups: Vec<Group>,
    region_index: Vec<u8>,
    neighborhoods: Vec<Vec<Coord>>,
}

type CacheKey = (u8, Vec<Vec<Coord>>);

static CACHE: LazyLock<Mutex<HashMap<CacheKey, Geometry>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

impl Geometry {
    /// The default geometry for a size with square regions (9×9 with 3×3
    /// boxes, 16×16 with 4×4 boxes, ...).
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NotASquare`] if `size` has no integer square
    /// root, or [`GeometryError::SizeOutOfRange`] for unsupported sizes.
    pub fn square(size: u8) -> Result<Self, GeometryError> {
        check_size(size)?;
        let side = size.isqrt();
        if side * side != size {
            return Err(GeometryError::NotASquare { size });
        }
        Self::rectangular(side, side)
    }

    /// A geometry tiled with `region_height` × `region_width` rectangular
    /// regions; the grid size is their product (e.g. 3×4 regions tile a
    /// 12×12 grid).
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::SizeOutOfRange`] if the product is outside
    /// the supported range.
    pub fn rectangular(region_height: u8, region_width: u8) -> Result<Self, GeometryError> {
        let size = region_height
            .checked_mul(region_width)
            .ok_or(GeometryError::SizeOutOfRange { size: u8::MAX })?;
        check_size(size)?;
        let mut regions = Vec::with_capacity(usize::from(size));
        for base_row in (0..size).step_by(usize::from(region_height)) {
            for base_col in (0..size).step_by(usize::from(region_width)) {
                let cells = (0..region_height)
                    .flat_map(|i| {
                        (0..region_width).map(move |j| Coord::new(base_row + i, base_col + j))
                    })
                    .collect();
                regions.push(cells);
            }
        }
        Self::with_regions(size, regions)
    }

    /// A geometry with a caller-supplied region partition.
    ///
    /// Regions may be any shape; the original harness's 12×12 layout and
    /// irregular ("jigsaw") layouts both go through here.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is unsupported, a region cell is out of
    /// bounds, or some grid cell belongs to no region.
    pub fn with_regions(size: u8, regions: Vec<Vec<Coord>>) -> Result<Self, GeometryError> {
        check_size(size)?;
        let key: CacheKey = (size, regions);
        {
            let cache = CACHE.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(geometry) = cache.get(&key) {
                return Ok(geometry.clone());
            }
        }

        let geometry = Self {
            inner: Arc::new(build(size, &key.1)?),
        };
        let mut cache = CACHE.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(cache.entry(key).or_insert(geometry).clone())
    }

    /// The grid size N (the grid is N×N and every group holds N cells).
    #[must_use]
    #[inline]
    pub fn size(&self) -> u8 {
        self.inner.size
    }

    /// The number of cells in the grid.
    #[must_use]
    #[inline]
    pub fn cell_count(&self) -> usize {
        usize::from(self.inner.size) * usize::from(self.inner.size)
    }

    /// Every group of the grid, in a stable order: rows top to bottom, then
    /// columns left to right, then regions in partition order.
    #[must_use]
    #[inline]
    pub fn groups(&self) -> &[Group] {
        &self.inner.groups
    }

    /// The index of the region containing `cell`.
    ///
    /// # Panics
    ///
    /// Panics if `cell` is outside the grid.
    #[must_use]
    #[inline]
    pub fn region_of(&self, cell: Coord) -> u8 {
        self.inner.region_index[self.cell_index(cell)]
    }

    /// The deduplicated union of the row, column, and region containing
    /// `cell`: every cell sharing a group with it, the cell itself
    /// included. Callers exclude the cell itself where needed.
    ///
    /// # Panics
    ///
    /// Panics if `cell` is outside the grid.
    #[must_use]
    #[inline]
    pub fn neighborhood(&self, cell: Coord) -> &[Coord] {
        &self.inner.neighborhoods[self.cell_index(cell)]
    }

    /// The row-major index of `cell`, for indexing per-cell tables.
    ///
    /// # Panics
    ///
    /// Panics if `cell` is outside the grid.
    #[must_use]
    #[inline]
    pub fn cell_index(&self, cell: Coord) -> usize {
        assert!(cell.row() < self.inner.size && cell.col() < self.inner.size);
        usize::from(cell.row()) * usize::from(self.inner.size) + usize::from(cell.col())
    }

    /// Iterates over every cell of the grid in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Coord> + use<> {
        let size = self.inner.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| Coord::new(row, col)))
    }
}

fn check_size(size: u8) -> Result<(), GeometryError> {
    if (2..=MAX_GRID_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(GeometryError::SizeOutOfRange { size })
    }
}

fn build(size: u8, regions: &[Vec<Coord>]) -> Result<Inner, GeometryError> {
    let cell_count = usize::from(size) * usize::from(size);
    let index_of =
        |cell: Coord| usize::from(cell.row()) * usize::from(size) + usize::from(cell.col());

    let mut groups = Vec::with_capacity(usize::from(size) * 2 + regions.len());
    for row in 0..size {
        groups.push(Group {
            kind: GroupKind::Row,
            index: row,
            cells: (0..size).map(|col| Coord::new(row, col)).collect(),
        });
    }
    for col in 0..size {
        groups.push(Group {
            kind: GroupKind::Column,
            index: col,
            cells: (0..size).map(|row| Coord::new(row, col)).collect(),
        });
    }
    for (i, cells) in regions.iter().enumerate() {
        groups.push(Group {
            kind: GroupKind::Region,
            index: u8::try_from(i).map_err(|_| GeometryError::SizeOutOfRange { size })?,
            cells: cells.clone(),
        });
    }

    // Full scan of region membership; cells in several regions keep the
    // last assignment (well-formed partitions have no overlaps).
    let mut region_index = vec![u8::MAX; cell_count];
    for group in groups.iter().filter(|g| g.kind == GroupKind::Region) {
        for &cell in &group.cells {
            if cell.row() >= size || cell.col() >= size {
                return Err(GeometryError::CellOutOfBounds { cell, size });
            }
            region_index[index_of(cell)] = group.index;
        }
    }
    for row in 0..size {
        for col in 0..size {
            let cell = Coord::new(row, col);
            if region_index[index_of(cell)] == u8::MAX {
                return Err(GeometryError::UnassignedCell { cell });
            }
        }
    }

    let mut neighborhoods = Vec::with_capacity(cell_count);
    let mut seen = vec![false; cell_count];
    for row in 0..size {
        for col in 0..size {
            let cell = Coord::new(row, col);
            let region = usize::from(region_index[index_of(cell)]);
            let row_cells = &groups[usize::from(row)].cells;
            let col_cells = &groups[usize::from(size) + usize::from(col)].cells;
            let region_cells = &groups[usize::from(size) * 2 + region].cells;

            seen.fill(false);
            let mut neighborhood =
                Vec::with_capacity(row_cells.len() + col_cells.len() + region_cells.len());
            for &peer in row_cells.iter().chain(col_cells).chain(region_cells) {
                if !seen[index_of(peer)] {
                    seen[index_of(peer)] = true;
                    neighborhood.push(peer);
                }
            }
            neighborhoods.push(neighborhood);
        }
    }

    Ok(Inner {
        size,
        groups,
        region_index,
        neighborhoods,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_group_order_and_sizes() {
        let geometry = Geometry::square(9).unwrap();
        assert_eq!(geometry.size(), 9);
        assert_eq!(geometry.groups().len(), 27);

        for (i, group) in geometry.groups().iter().enumerate() {
            let expected = match i / 9 {
                0 => GroupKind::Row,
                1 => GroupKind::Column,
                _ => GroupKind::Region,
            };
            assert_eq!(group.kind(), expected);
            assert_eq!(usize::from(group.index()), i % 9);
            assert_eq!(group.cells().len(), 9);
        }
    }

    #[test]
    fn test_square_region_numbering() {
        // Regions number left to right, top to bottom.
        let geometry = Geometry::square(9).unwrap();
        assert_eq!(geometry.region_of(Coord::new(0, 0)), 0);
        assert_eq!(geometry.region_of(Coord::new(0, 8)), 2);
        assert_eq!(geometry.region_of(Coord::new(4, 4)), 4);
        assert_eq!(geometry.region_of(Coord::new(8, 0)), 6);
        assert_eq!(geometry.region_of(Coord::new(8, 8)), 8);
    }

    #[test]
    fn test_neighborhood_is_deduplicated() {
        let geometry = Geometry::square(9).unwrap();
        // 9 row cells + 8 new column cells + 4 new region cells.
        let neighborhood = geometry.neighborhood(Coord::new(4, 4));
        assert_eq!(neighborhood.len(), 21);
        assert!(neighborhood.contains(&Coord::new(4, 4)));

        let mut unique: Vec<_> = neighborhood.to_vec();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), neighborhood.len());
    }

    #[test]
    fn test_rectangular_regions() {
        let geometry = Geometry::rectangular(3, 4).unwrap();
        assert_eq!(geometry.size(), 12);
        assert_eq!(geometry.groups().len(), 36);
        assert_eq!(geometry.region_of(Coord::new(0, 0)), 0);
        assert_eq!(geometry.region_of(Coord::new(0, 4)), 1);
        assert_eq!(geometry.region_of(Coord::new(3, 0)), 3);
        assert_eq!(geometry.region_of(Coord::new(11, 11)), 11);
        // 12 row cells + 11 new column cells + 6 new region cells.
        assert_eq!(geometry.neighborhood(Coord::new(0, 0)).len(), 29);
    }

    #[test]
    fn test_custom_partition() {
        // 2×2 grid with diagonal regions.
        let regions = vec![
            vec![Coord::new(0, 0), Coord::new(1, 1)],
            vec![Coord::new(0, 1), Coord::new(1, 0)],
        ];
        let geometry = Geometry::with_regions(2, regions).unwrap();
        assert_eq!(geometry.region_of(Coord::new(1, 1)), 0);
        assert_eq!(geometry.region_of(Coord::new(1, 0)), 1);
        // Every cell shares a group with every other cell here.
        assert_eq!(geometry.neighborhood(Coord::new(0, 0)).len(), 4);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            Geometry::square(5),
            Err(GeometryError::NotASquare { size: 5 })
        );
        assert_eq!(
            Geometry::square(1),
            Err(GeometryError::SizeOutOfRange { size: 1 })
        );
        assert_eq!(
            Geometry::with_regions(2, vec![vec![Coord::new(5, 0)]]),
            Err(GeometryError::CellOutOfBounds {
                cell: Coord::new(5, 0),
                size: 2
            })
        );
        assert_eq!(
            Geometry::with_regions(2, vec![vec![Coord::new(0, 0)]]),
            Err(GeometryError::UnassignedCell {
                cell: Coord::new(0, 1)
            })
        );
    }

    #[test]
    fn test_interning_shares_tables() {
        let a = Geometry::square(9).unwrap();
        let b = Geometry::square(9).unwrap();
        assert!(Arc::ptr_eq(&a.inner, &b.inner));

        let c = Geometry::rectangular(3, 4).unwrap();
        assert!(!Arc::ptr_eq(&a.inner, &c.inner));
    }
}
