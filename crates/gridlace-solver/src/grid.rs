//! The constraint grid: one puzzle position and its propagation pipeline.
//!
//! A [`ConstraintGrid`] tracks, for every cell, the set of symbols the One
//! Rule still allows there. Applying a move resolves one cell and then
//! propagates: the placed symbol is removed from every cell sharing a group
//! with it (cascading through any resolutions this forces), and the
//! [`strategy`](crate::strategy) set is run to a fixed point. Most puzzles
//! shed the bulk of their blanks this way before the search engine ever
//! branches.
//!
//! Grids are never mutated by more than one owner: the searching path
//! always clones first ([`ConstraintGrid::copy_and_move`]), so a failed
//! propagation costs nothing but the discarded clone. The in-place path
//! ([`ConstraintGrid::apply`]) exists for replaying an already-found
//! solution.

use std::{
    cell::{Cell as CacheCell, RefCell},
    cmp::Reverse,
    fmt,
    sync::Arc,
};

use gridlace_core::{Alphabet, Coord, Geometry, Symbol, SymbolSet};
use log::trace;

use crate::{
    error::{AlgorithmFailure, PuzzleError, RuleViolation},
    search::PuzzleState,
    strategy::{self, BoxedStrategy},
};

/// A move: resolve one cell to one symbol.
///
/// Moves are the only externally visible state transition; two moves are
/// equal iff cell and symbol both match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellMove {
    cell: Coord,
    symbol: Symbol,
}

impl CellMove {
    /// Creates a move resolving `cell` to `symbol`.
    #[must_use]
    #[inline]
    pub const fn new(cell: Coord, symbol: Symbol) -> Self {
        Self { cell, symbol }
    }

    /// The target cell.
    #[must_use]
    #[inline]
    pub const fn cell(self) -> Coord {
        self.cell
    }

    /// The symbol placed by the move.
    #[must_use]
    #[inline]
    pub const fn symbol(self) -> Symbol {
        self.symbol
    }
}

/// Whether applying a move runs the propagation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Kill cascade plus the strategy fixed point; the searching path.
    Full,
    /// Resolve the one cell and stop.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Validity {
    Valid,
    Invalid,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Cell {
    candidates: SymbolSet,
    // Kept in sync manually wherever `candidates` shrinks to one; deriving
    // it on demand costs ~20% on deep searches.
    value: Option<Symbol>,
}

impl Cell {
    fn new(candidates: SymbolSet) -> Self {
        Self {
            candidates,
            value: candidates.single(),
        }
    }
}

/// One puzzle position: a candidate set per cell, with move application,
/// constraint propagation, and a canonical text fingerprint.
///
/// # Examples
///
/// ```
/// use gridlace_core::{Alphabet, Geometry};
/// use gridlace_solver::{ConstraintGrid, Propagation, PuzzleSolver};
///
/// let givens = [
///     "5.1.7...6", "6.....14.", ".....4.2.",
///     ".5...92.8", "....8....", "2.85...7.",
///     ".3.1.....", ".65.....2", "9...6.3.7",
/// ];
/// let mut grid = ConstraintGrid::from_givens(
///     Geometry::square(9)?,
///     Alphabet::for_size(9)?,
///     &givens,
/// )?;
///
/// // Construction already propagates; search only if blanks remain.
/// if !grid.is_end_state() {
///     let moves = PuzzleSolver::new().solve(grid.clone())?.expect("solvable");
///     for m in &moves {
///         grid.apply(*m, Propagation::Full)?;
///     }
/// }
/// assert!(grid.is_end_state());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct ConstraintGrid {
    geometry: Geometry,
    alphabet: Arc<Alphabet>,
    strategies: Arc<Vec<BoxedStrategy>>,
    cells: Vec<Cell>,
    resolved: u16,
    placed: Vec<u16>,
    validity: CacheCell<Validity>,
    move_cache: RefCell<Vec<(CellMove, ConstraintGrid)>>,
}

impl Clone for ConstraintGrid {
    fn clone(&self) -> Self {
        // Geometry, alphabet, and strategies are shared; the successor
        // cache is not carried over.
        Self {
            geometry: self.geometry.clone(),
            alphabet: Arc::clone(&self.alphabet),
            strategies: Arc::clone(&self.strategies),
            cells: self.cells.clone(),
            resolved: self.resolved,
            placed: self.placed.clone(),
            validity: CacheCell::new(self.validity.get()),
            move_cache: RefCell::new(Vec::new()),
        }
    }
}

impl ConstraintGrid {
    /// An empty grid: every cell still admits every symbol.
    ///
    /// # Errors
    ///
    /// Returns [`RuleViolation::AlphabetMismatch`] if the alphabet does not
    /// have exactly one symbol per grid size.
    pub fn empty(geometry: Geometry, alphabet: Alphabet) -> Result<Self, RuleViolation> {
        if alphabet.size() != geometry.size() {
            return Err(RuleViolation::AlphabetMismatch {
                alphabet: alphabet.size(),
                grid: geometry.size(),
            });
        }
        let full = SymbolSet::full(geometry.size());
        let cells = vec![Cell::new(full); geometry.cell_count()];
        let placed = vec![0; usize::from(geometry.size())];
        Ok(Self {
            geometry,
            alphabet: Arc::new(alphabet),
            strategies: Arc::new(strategy::all_strategies()),
            cells,
            resolved: 0,
            placed,
            validity: CacheCell::new(Validity::Valid),
            move_cache: RefCell::new(Vec::new()),
        })
    }

    /// Replaces the propagation strategy set (default: all of
    /// [`strategy::all_strategies`]). An empty set leaves only the kill
    /// cascade running.
    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<BoxedStrategy>) -> Self {
        self.strategies = Arc::new(strategies);
        self
    }

    /// Builds a grid and places the given cells, fully propagating each.
    ///
    /// `rows` holds one string per grid row; the alphabet's placeholder
    /// (default `.`) denotes an unknown cell and whitespace is ignored.
    /// Rows and row suffixes may be omitted.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleViolation`] for malformed givens (a character that
    /// is neither a symbol nor the placeholder, or a given outside the
    /// grid) and for givens that contradict the One Rule, including
    /// contradictions only propagation uncovers.
    pub fn from_givens<S: AsRef<str>>(
        geometry: Geometry,
        alphabet: Alphabet,
        rows: &[S],
    ) -> Result<Self, PuzzleError> {
        let mut grid = Self::empty(geometry, alphabet)?;
        grid.place_givens(rows)?;
        Ok(grid)
    }

    /// Places given cells on an existing grid, fully propagating each.
    ///
    /// See [`ConstraintGrid::from_givens`] for the accepted format.
    ///
    /// # Errors
    ///
    /// As [`ConstraintGrid::from_givens`]; on failure the grid is left at
    /// the last consistent step and must not be used further.
    pub fn place_givens<S: AsRef<str>>(&mut self, rows: &[S]) -> Result<(), PuzzleError> {
        let size = self.size();
        for (r, row) in rows.iter().enumerate() {
            let mut c = 0usize;
            for ch in row.as_ref().chars() {
                if ch.is_whitespace() {
                    continue;
                }
                let col = c;
                c += 1;
                if ch == self.alphabet.placeholder() {
                    continue;
                }
                let cell = match (u8::try_from(r), u8::try_from(col)) {
                    (Ok(row_idx), Ok(col_idx)) if row_idx < size && col_idx < size => {
                        Coord::new(row_idx, col_idx)
                    }
                    _ => {
                        return Err(RuleViolation::GivenOutOfBounds { row: r, col, size }.into());
                    }
                };
                let symbol =
                    self.alphabet
                        .symbol_of(ch)
                        .ok_or(RuleViolation::UnknownSymbol {
                            row: r,
                            col,
                            symbol: ch,
                        })?;
                self.apply(CellMove::new(cell, symbol), Propagation::Full)?;
            }
        }
        Ok(())
    }

    /// The geometry this grid was built with.
    #[must_use]
    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// The alphabet this grid parses and renders with.
    #[must_use]
    #[inline]
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// The grid size N.
    #[must_use]
    #[inline]
    pub fn size(&self) -> u8 {
        self.geometry.size()
    }

    /// The candidate set still possible at `cell`.
    ///
    /// # Panics
    ///
    /// Panics if `cell` is outside the grid.
    #[must_use]
    #[inline]
    pub fn candidates(&self, cell: Coord) -> SymbolSet {
        self.cells[self.geometry.cell_index(cell)].candidates
    }

    /// The resolved symbol at `cell`, if its candidate set has narrowed to
    /// one.
    ///
    /// # Panics
    ///
    /// Panics if `cell` is outside the grid.
    #[must_use]
    #[inline]
    pub fn value(&self, cell: Coord) -> Option<Symbol> {
        self.cells[self.geometry.cell_index(cell)].value
    }

    /// How many cells currently hold `symbol` as their resolved value.
    #[must_use]
    #[inline]
    pub fn placements(&self, symbol: Symbol) -> u16 {
        self.placed[usize::from(symbol.index())]
    }

    /// `true` iff every cell is resolved.
    #[must_use]
    #[inline]
    pub fn is_end_state(&self) -> bool {
        usize::from(self.resolved) == self.geometry.cell_count()
    }

    /// `true` iff no group holds the same resolved symbol twice.
    ///
    /// The answer is cached between mutations; revalidation scans every
    /// group.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self.validity.get() {
            Validity::Valid => true,
            Validity::Invalid => false,
            Validity::Unknown => {
                let ok = self.validate();
                self.validity.set(if ok {
                    Validity::Valid
                } else {
                    Validity::Invalid
                });
                ok
            }
        }
    }

    fn validate(&self) -> bool {
        for group in self.geometry.groups() {
            let mut seen = SymbolSet::EMPTY;
            for &cell in group.cells() {
                if let Some(value) = self.cells[self.geometry.cell_index(cell)].value {
                    if !seen.insert(value) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// The canonical fingerprint of this position: the text rendering.
    ///
    /// Two positions that render identically are interchangeable for
    /// solving purposes; the search engine deduplicates on this value.
    #[must_use]
    pub fn canonical_state(&self) -> String {
        self.to_string()
    }

    /// Performs a move on this grid, in place.
    ///
    /// With [`Propagation::Full`] the whole pipeline runs: kill cascade,
    /// then the strategy set to a fixed point. This often resolves a lot of
    /// cells. With [`Propagation::Skip`] only the one cell is resolved:
    /// the replay path for a move list whose propagation is already known
    /// to succeed.
    ///
    /// A move that a previous propagation already made is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleViolation`] if the move's symbol is not a candidate
    /// at the target cell or propagation uncovers a contradiction. On
    /// failure the grid is left at the last internally consistent step,
    /// not rolled back, and must not be used further.
    pub fn apply(&mut self, m: CellMove, propagation: Propagation) -> Result<(), PuzzleError> {
        let idx = self.geometry.cell_index(m.cell());
        if !self.cells[idx].candidates.contains(m.symbol()) {
            return Err(RuleViolation::NotACandidate {
                cell: m.cell(),
                symbol: self.alphabet.char_of(m.symbol()),
            }
            .into());
        }
        if self.cells[idx].value == Some(m.symbol()) {
            return Ok(());
        }

        self.move_cache.borrow_mut().clear();
        self.resolve(idx, m.symbol());
        if propagation == Propagation::Full {
            self.autosolve(m)?;
        }
        Ok(())
    }

    /// Returns a copy of this grid with the move applied and fully
    /// propagated; the receiver is never mutated.
    ///
    /// When the move was just validated by [`ConstraintGrid::legal_moves`],
    /// the propagated successor computed there is returned directly instead
    /// of being recomputed.
    ///
    /// # Errors
    ///
    /// As [`ConstraintGrid::apply`]; the partially propagated clone is
    /// discarded on failure.
    pub fn copy_and_move(&self, m: &CellMove) -> Result<Self, PuzzleError> {
        let cached = {
            let mut cache = self.move_cache.borrow_mut();
            cache
                .iter()
                .position(|(cm, _)| cm == m)
                .map(|i| cache.swap_remove(i).1)
        };
        match cached {
            Some(successor) => Ok(successor),
            None => self.propagated_successor(*m),
        }
    }

    /// Every move that, if applied, does not immediately violate the One
    /// Rule.
    ///
    /// Guess and check: each candidate placement is trial-applied on a
    /// clone, and placements whose propagation fails are dropped. The
    /// surviving clones are retained so that an immediately following
    /// [`ConstraintGrid::copy_and_move`] with one of the emitted moves is
    /// free.
    ///
    /// The order tries symbols closest to fully placed first; within a
    /// symbol, cells in row-major order. This affects search performance
    /// only, never correctness.
    ///
    /// # Errors
    ///
    /// Returns [`PuzzleError::Algorithm`] if trial propagation trips an
    /// internal consistency check; rule violations merely drop the move.
    pub fn legal_moves(&self) -> Result<Vec<CellMove>, PuzzleError> {
        if !self.is_valid() {
            return Ok(Vec::new());
        }
        let mut cache = Vec::new();
        let mut moves = Vec::new();
        for m in self.heuristic_order() {
            match self.propagated_successor(m) {
                Ok(successor) => {
                    cache.push((m, successor));
                    moves.push(m);
                }
                Err(PuzzleError::Rule(_)) => {}
                Err(failure @ PuzzleError::Algorithm(_)) => return Err(failure),
            }
        }
        *self.move_cache.borrow_mut() = cache;
        Ok(moves)
    }

    fn propagated_successor(&self, m: CellMove) -> Result<Self, PuzzleError> {
        let mut successor = self.clone();
        successor.apply(m, Propagation::Full)?;
        Ok(successor)
    }

    // Candidate cell/symbol pairs in heuristic order: symbols with the
    // fewest remaining placements first, ties by symbol index.
    fn heuristic_order(&self) -> Vec<CellMove> {
        let size = self.size();
        let mut symbols: Vec<Symbol> = self
            .alphabet
            .symbols()
            .filter(|s| self.placements(*s) < u16::from(size))
            .collect();
        symbols.sort_by_key(|s| (Reverse(self.placements(*s)), s.index()));

        let mut order = Vec::new();
        for symbol in symbols {
            for cell in self.geometry.cells() {
                let state = &self.cells[self.geometry.cell_index(cell)];
                if state.value.is_none() && state.candidates.contains(symbol) {
                    order.push(CellMove::new(cell, symbol));
                }
            }
        }
        order
    }

    // Marks one cell resolved and updates the bookkeeping. The caller has
    // already checked that `symbol` is a candidate there.
    fn resolve(&mut self, idx: usize, symbol: Symbol) {
        self.validity.set(Validity::Unknown);
        let cell = &mut self.cells[idx];
        cell.candidates = SymbolSet::only(symbol);
        cell.value = Some(symbol);
        self.resolved += 1;
        self.placed[usize::from(symbol.index())] += 1;
    }

    /// Removes `symbol` from the candidates at `cell`, cascading any
    /// resolution the removal forces. Resolved cells are skipped. Returns
    /// whether anything changed.
    pub(crate) fn eliminate(&mut self, cell: Coord, symbol: Symbol) -> Result<bool, RuleViolation> {
        let idx = self.geometry.cell_index(cell);
        if self.cells[idx].value.is_some() || !self.cells[idx].candidates.remove(symbol) {
            return Ok(false);
        }
        if self.cells[idx].candidates.is_empty() {
            return Err(RuleViolation::NoCandidates { cell });
        }
        if let Some(forced) = self.cells[idx].candidates.single() {
            self.resolve(idx, forced);
            self.kill(cell, forced)?;
        }
        Ok(true)
    }

    // Removes a just-placed symbol from every other cell sharing a group
    // with `from`, recursing through any resolution this forces. Resolved
    // cells are skipped rather than excluded from the neighborhood tables.
    fn kill(&mut self, from: Coord, symbol: Symbol) -> Result<(), RuleViolation> {
        let geometry = self.geometry.clone();
        for &peer in geometry.neighborhood(from) {
            let idx = geometry.cell_index(peer);
            if self.cells[idx].value.is_some() {
                continue;
            }
            if !self.cells[idx].candidates.remove(symbol) {
                continue;
            }
            if self.cells[idx].candidates.is_empty() {
                return Err(RuleViolation::NoCandidates { cell: peer });
            }
            if let Some(forced) = self.cells[idx].candidates.single() {
                self.resolve(idx, forced);
                self.kill(peer, forced)?;
            }
        }
        Ok(())
    }

    // The propagation pipeline for a just-made move: kill cascade, validity
    // check, then the strategy set to a fixed point.
    fn autosolve(&mut self, m: CellMove) -> Result<(), PuzzleError> {
        self.kill(m.cell(), m.symbol())?;
        if !self.is_valid() {
            return Err(RuleViolation::GroupConflict.into());
        }

        let strategies = Arc::clone(&self.strategies);
        'fixed_point: loop {
            for s in strategies.iter() {
                if s.apply(self)? {
                    trace!("{} made progress", s.name());
                    if !self.is_valid() {
                        return Err(RuleViolation::GroupConflict.into());
                    }
                    continue 'fixed_point;
                }
            }
            break;
        }

        if !self.is_valid() {
            return Err(
                AlgorithmFailure::new("grid invalid after propagation reached a fixed point")
                    .into(),
            );
        }
        Ok(())
    }
}

impl fmt::Display for ConstraintGrid {
    /// One line per row, one centered three-character field per cell;
    /// resolved cells show their symbol, unresolved cells the placeholder.
    ///
    /// This rendering doubles as the canonical fingerprint, so it is part
    /// of the dedup contract, not just cosmetics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.size();
        for row in 0..size {
            for col in 0..size {
                let ch = match self.cells[self.geometry.cell_index(Coord::new(row, col))].value {
                    Some(symbol) => self.alphabet.char_of(symbol),
                    None => self.alphabet.placeholder(),
                };
                write!(f, "{ch:^3}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl PuzzleState for ConstraintGrid {
    type Move = CellMove;
    type Fingerprint = String;

    fn legal_moves(&self) -> Result<Vec<CellMove>, PuzzleError> {
        ConstraintGrid::legal_moves(self)
    }

    fn copy_and_move(&self, m: &CellMove) -> Result<Self, PuzzleError> {
        ConstraintGrid::copy_and_move(self, m)
    }

    fn fingerprint(&self) -> String {
        self.canonical_state()
    }

    fn is_end_state(&self) -> bool {
        ConstraintGrid::is_end_state(self)
    }
}
