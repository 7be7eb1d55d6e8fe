//! Core data structures for placement-puzzle grids.
//!
//! This crate provides the puzzle-agnostic primitives used by the solver:
//!
//! - [`coord`]: cell coordinates on an N×N grid
//! - [`symbol`]: type-safe symbol indices and candidate bitsets
//! - [`alphabet`]: the characters symbols parse from and render as
//! - [`geometry`]: rows, columns, and arbitrarily shaped regions, with
//!   precomputed per-cell neighborhood tables shared process-wide
//!
//! A puzzle shape is described by a [`Geometry`] (which cells form which
//! groups) and an [`Alphabet`] (which characters stand for which symbols).
//! Both are immutable once built and cheap to share between puzzle
//! instances.
//!
//! # Examples
//!
//! ```
//! use gridlace_core::{Coord, Geometry, SymbolSet};
//!
//! let geometry = Geometry::square(9)?;
//! assert_eq!(geometry.groups().len(), 27);
//!
//! // Every cell sees 20 other cells plus itself.
//! assert_eq!(geometry.neighborhood(Coord::new(4, 4)).len(), 21);
//!
//! // Candidate sets start out full.
//! let candidates = SymbolSet::full(9);
//! assert_eq!(candidates.len(), 9);
//! # Ok::<(), gridlace_core::GeometryError>(())
//! ```

pub mod alphabet;
pub mod coord;
pub mod geometry;
pub mod symbol;

pub use self::{
    alphabet::{Alphabet, AlphabetError},
    coord::Coord,
    geometry::{Geometry, GeometryError, Group, GroupKind},
    symbol::{MAX_GRID_SIZE, Symbol, SymbolSet},
};
