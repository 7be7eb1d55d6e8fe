//! Generic breadth-first puzzle search.
//!
//! The engine in this module is puzzle-agnostic: anything implementing
//! [`PuzzleState`] can be solved by it, unmodified. It explores states
//! breadth-first from an initial position, deduplicating on canonical
//! fingerprints, and produces solutions lazily: each pull on a [`Search`]
//! resumes the frontier exactly where the previous pull left off.
//!
//! Breadth-first order means the first solution found for any puzzle is a
//! shortest one, and an exhausted frontier proves no solution exists within
//! the reachable, deduplicated space.

use std::{
    collections::{HashSet, VecDeque},
    hash::Hash,
    time::{Duration, Instant},
};

use derive_more::{Display, Error, From};
use log::debug;

use crate::error::PuzzleError;

/// The contract a puzzle must satisfy to be searched.
///
/// Implementations must keep [`copy_and_move`](PuzzleState::copy_and_move)
/// pure: the receiver is never mutated, each transition produces a fresh
/// state owned by the engine's frontier.
///
/// Fingerprints drive duplicate-path pruning. States that differ for
/// solving purposes must produce different fingerprints; identical states
/// must produce equal ones. States that are merely isomorphic *should*
/// share a fingerprint; failing that only inflates the search, never
/// breaks it.
pub trait PuzzleState: Clone {
    /// A single state transition, opaque to the engine.
    type Move: Clone;

    /// The hashable canonical snapshot used for deduplication.
    type Fingerprint: Eq + Hash;

    /// Every move that does not immediately violate the puzzle's rules.
    ///
    /// # Errors
    ///
    /// Returns an error only for internal defects discovered while
    /// validating moves; an empty vector is the normal "no moves" answer.
    fn legal_moves(&self) -> Result<Vec<Self::Move>, PuzzleError>;

    /// Copies the state and performs the move on the copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the move turns out to violate the puzzle's
    /// rules; the engine treats this as fatal, since only moves from
    /// [`legal_moves`](PuzzleState::legal_moves) reach it.
    fn copy_and_move(&self, mv: &Self::Move) -> Result<Self, PuzzleError>;

    /// The canonical fingerprint of this state.
    fn fingerprint(&self) -> Self::Fingerprint;

    /// `true` iff the puzzle is solved.
    fn is_end_state(&self) -> bool;
}

/// Errors that abort a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error, From)]
pub enum SearchError {
    /// The wall-time budget for the current solution request ran out.
    ///
    /// The deadline is polled every
    /// [`check_interval`](SearchConfig::check_interval) moves, so the
    /// search may overrun the limit by up to one interval's worth of work.
    #[display("time limit of {limit:?} exceeded")]
    #[from(ignore)]
    TimeLimitExceeded {
        /// The configured limit.
        limit: Duration,
    },
    /// A fault raised by the puzzle while deriving a successor.
    #[display("{_0}")]
    Puzzle(PuzzleError),
}

/// Search engine tuning knobs.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use gridlace_solver::SearchConfig;
///
/// let config = SearchConfig::new()
///     .time_limit(Duration::from_secs(60))
///     .check_interval(100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    time_limit: Option<Duration>,
    check_interval: u64,
    log_interval: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchConfig {
    /// The default configuration: no time limit, deadline polled every 100
    /// moves, progress logged every 1000 moves.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            time_limit: None,
            check_interval: 100,
            log_interval: 1000,
        }
    }

    /// Sets the wall-time budget for each solution request.
    ///
    /// The budget is scoped per pull on the [`Search`] iterator, not to the
    /// aggregate search.
    #[must_use]
    pub const fn time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Sets how many moves are examined between deadline polls.
    ///
    /// Smaller intervals tighten the deadline at a performance cost; zero
    /// is treated as one.
    #[must_use]
    pub const fn check_interval(mut self, every: u64) -> Self {
        self.check_interval = if every == 0 { 1 } else { every };
        self
    }

    /// Sets how many moves are examined between progress log lines.
    ///
    /// Zero is treated as one.
    #[must_use]
    pub const fn log_interval(mut self, every: u64) -> Self {
        self.log_interval = if every == 0 { 1 } else { every };
        self
    }
}

/// How many solutions a search should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionQuota {
    /// Stop after at most this many solutions (`AtMost(0)` yields none).
    AtMost(usize),
    /// Exhaust the entire reachable, deduplicated state space.
    All,
}

/// Bookkeeping collected while searching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    iterations: u64,
    moves_examined: u64,
    max_queue_len: usize,
    elapsed: Duration,
}

impl SearchStats {
    /// How many frontier states have been expanded.
    #[must_use]
    pub const fn iterations(&self) -> u64 {
        self.iterations
    }

    /// How many legal moves have been examined.
    #[must_use]
    pub const fn moves_examined(&self) -> u64 {
        self.moves_examined
    }

    /// The deepest the frontier queue has been.
    #[must_use]
    pub const fn max_queue_len(&self) -> usize {
        self.max_queue_len
    }

    /// Total wall time spent inside the search, across all pulls.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// A generic breadth-first puzzle solver.
///
/// # Examples
///
/// ```
/// use gridlace_core::{Alphabet, Geometry};
/// use gridlace_solver::{ConstraintGrid, PuzzleSolver};
///
/// // An underconstrained 4×4 grid: several completions exist, and the
/// // engine finds one of the shortest move sequences to any of them.
/// let grid = ConstraintGrid::from_givens(
///     Geometry::square(4)?,
///     Alphabet::for_size(4)?,
///     &["12..", "34.."],
/// )?;
/// let solution = PuzzleSolver::new().solve(grid)?;
/// assert!(solution.is_some());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PuzzleSolver {
    config: SearchConfig,
}

impl PuzzleSolver {
    /// Creates a solver with the default [`SearchConfig`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            config: SearchConfig::new(),
        }
    }

    /// Creates a solver with a custom configuration.
    #[must_use]
    pub const fn with_config(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Starts a lazy breadth-first search from `puzzle`.
    ///
    /// Nothing is explored until the returned [`Search`] is pulled. A
    /// puzzle that is already an end state produces no solutions; the
    /// engine only ever yields successors; check
    /// [`is_end_state`](PuzzleState::is_end_state) first.
    pub fn search<P: PuzzleState>(&self, puzzle: P, quota: SolutionQuota) -> Search<P> {
        let mut seen = HashSet::new();
        seen.insert(puzzle.fingerprint());
        let mut frontier = VecDeque::new();
        frontier.push_back((puzzle, Vec::new()));

        Search {
            config: self.config,
            frontier,
            seen,
            expanding: None,
            stats: SearchStats::default(),
            remaining: match quota {
                SolutionQuota::AtMost(n) => Some(n),
                SolutionQuota::All => None,
            },
            exhausted: false,
            done: false,
        }
    }

    /// Finds one shortest solution, or `None` when the reachable space
    /// holds no solution at all.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::TimeLimitExceeded`] if the configured budget
    /// runs out, or a puzzle fault passed through from move derivation.
    pub fn solve<P: PuzzleState>(&self, puzzle: P) -> Result<Option<Vec<P::Move>>, SearchError> {
        self.search(puzzle, SolutionQuota::AtMost(1)).next().transpose()
    }
}

struct Expansion<P: PuzzleState> {
    state: P,
    trail: Vec<P::Move>,
    moves: std::vec::IntoIter<P::Move>,
}

/// An in-progress breadth-first search; an iterator of solutions.
///
/// Each item is one solution's move trail (or the error that aborted the
/// search). The first pull may do arbitrary work; subsequent pulls resume
/// from the frontier, so requesting a second solution never repeats the
/// work that found the first.
pub struct Search<P: PuzzleState> {
    config: SearchConfig,
    frontier: VecDeque<(P, Vec<P::Move>)>,
    seen: HashSet<P::Fingerprint>,
    expanding: Option<Expansion<P>>,
    stats: SearchStats,
    remaining: Option<usize>,
    exhausted: bool,
    done: bool,
}

impl<P: PuzzleState> Search<P> {
    /// The statistics gathered so far.
    #[must_use]
    pub const fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// `true` once the entire reachable, deduplicated space has been
    /// explored. Distinguishes "no solution exists" from "stopped early".
    #[must_use]
    pub const fn exhausted(&self) -> bool {
        self.exhausted
    }
}

impl<P: PuzzleState> Iterator for Search<P> {
    type Item = Result<Vec<P::Move>, SearchError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.remaining == Some(0) {
            self.done = true;
            return None;
        }
        // Each solution request gets a fresh time budget.
        let started = Instant::now();

        loop {
            if let Some(expansion) = &mut self.expanding {
                for mv in expansion.moves.by_ref() {
                    self.stats.moves_examined += 1;
                    if self.stats.moves_examined % self.config.check_interval == 0 {
                        if let Some(limit) = self.config.time_limit {
                            if started.elapsed() > limit {
                                self.done = true;
                                self.stats.elapsed += started.elapsed();
                                return Some(Err(SearchError::TimeLimitExceeded { limit }));
                            }
                        }
                    }
                    if self.stats.moves_examined % self.config.log_interval == 0 {
                        debug!(
                            "searching: {} states expanded, {} moves examined, queue depth {}",
                            self.stats.iterations,
                            self.stats.moves_examined,
                            self.frontier.len(),
                        );
                    }

                    let successor = match expansion.state.copy_and_move(&mv) {
                        Ok(successor) => successor,
                        Err(fault) => {
                            self.done = true;
                            self.stats.elapsed += started.elapsed();
                            return Some(Err(fault.into()));
                        }
                    };
                    let fingerprint = successor.fingerprint();
                    if self.seen.contains(&fingerprint) {
                        continue;
                    }

                    let mut trail = expansion.trail.clone();
                    trail.push(mv);
                    if successor.is_end_state() {
                        // End states are yielded, never queued or
                        // remembered; a later distinct path to the same
                        // solution counts as its own solution.
                        if let Some(n) = &mut self.remaining {
                            *n -= 1;
                        }
                        self.stats.elapsed += started.elapsed();
                        return Some(Ok(trail));
                    }
                    self.seen.insert(fingerprint);
                    self.frontier.push_back((successor, trail));
                    self.stats.max_queue_len = self.stats.max_queue_len.max(self.frontier.len());
                }
                self.expanding = None;
            }

            match self.frontier.pop_front() {
                Some((state, trail)) => {
                    self.stats.iterations += 1;
                    let moves = match state.legal_moves() {
                        Ok(moves) => moves,
                        Err(fault) => {
                            self.done = true;
                            self.stats.elapsed += started.elapsed();
                            return Some(Err(fault.into()));
                        }
                    };
                    self.expanding = Some(Expansion {
                        state,
                        trail,
                        moves: moves.into_iter(),
                    });
                }
                None => {
                    self.exhausted = true;
                    self.done = true;
                    self.stats.elapsed += started.elapsed();
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use gridlace_core::{Alphabet, Coord, Geometry};

    use super::*;
    use crate::{
        grid::{ConstraintGrid, Propagation},
        testing::{self, fixtures},
    };

    /// The classic disc-moving puzzle; shortest solution is 2^n - 1 moves.
    #[derive(Debug, Clone)]
    struct TowerOfHanoi {
        discs: u8,
        pins: Vec<Vec<u8>>,
    }

    impl TowerOfHanoi {
        fn new(discs: u8) -> Self {
            let mut pins = vec![Vec::new(); 3];
            pins[0] = (1..=discs).rev().collect();
            Self { discs, pins }
        }
    }

    impl PuzzleState for TowerOfHanoi {
        type Move = (usize, usize);
        type Fingerprint = Vec<Vec<u8>>;

        fn legal_moves(&self) -> Result<Vec<(usize, usize)>, PuzzleError> {
            let mut moves = Vec::new();
            for (src, from) in self.pins.iter().enumerate() {
                let Some(&disc) = from.last() else { continue };
                for (dst, to) in self.pins.iter().enumerate() {
                    if src != dst && to.last().is_none_or(|&top| disc < top) {
                        moves.push((src, dst));
                    }
                }
            }
            Ok(moves)
        }

        fn copy_and_move(&self, &(src, dst): &(usize, usize)) -> Result<Self, PuzzleError> {
            let mut next = self.clone();
            let disc = next.pins[src].pop().expect("move from empty pin");
            next.pins[dst].push(disc);
            Ok(next)
        }

        fn fingerprint(&self) -> Vec<Vec<u8>> {
            self.pins.clone()
        }

        fn is_end_state(&self) -> bool {
            self.pins[2].len() == usize::from(self.discs)
        }
    }

    /// Two independent moves to the goal: exactly two shortest solutions.
    #[derive(Debug, Clone)]
    struct BitPair {
        bits: u8,
    }

    impl PuzzleState for BitPair {
        type Move = u8;
        type Fingerprint = u8;

        fn legal_moves(&self) -> Result<Vec<u8>, PuzzleError> {
            Ok((0..2u8).filter(|bit| self.bits & (1 << bit) == 0).collect())
        }

        fn copy_and_move(&self, &bit: &u8) -> Result<Self, PuzzleError> {
            Ok(Self {
                bits: self.bits | (1 << bit),
            })
        }

        fn fingerprint(&self) -> u8 {
            self.bits
        }

        fn is_end_state(&self) -> bool {
            self.bits == 0b11
        }
    }

    /// Never reaches an end state and never repeats a fingerprint.
    #[derive(Debug, Clone)]
    struct Endless {
        n: u64,
    }

    impl PuzzleState for Endless {
        type Move = ();
        type Fingerprint = u64;

        fn legal_moves(&self) -> Result<Vec<()>, PuzzleError> {
            Ok(vec![()])
        }

        fn copy_and_move(&self, (): &()) -> Result<Self, PuzzleError> {
            Ok(Self { n: self.n + 1 })
        }

        fn fingerprint(&self) -> u64 {
            self.n
        }

        fn is_end_state(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_hanoi_solutions_are_shortest() {
        let solver = PuzzleSolver::new();
        for discs in 1..=5 {
            let solution = solver
                .solve(TowerOfHanoi::new(discs))
                .unwrap()
                .expect("hanoi is always solvable");
            assert_eq!(solution.len(), (1usize << discs) - 1, "discs = {discs}");
        }
    }

    #[test]
    fn test_hanoi_difficulty_grows_with_size() {
        let solver = PuzzleSolver::new();
        let mut previous = 0;
        for discs in 1..=5 {
            let mut search = solver.search(TowerOfHanoi::new(discs), SolutionQuota::AtMost(1));
            search.next().unwrap().unwrap();
            let iterations = search.stats().iterations();
            assert!(iterations > previous, "discs = {discs}");
            previous = iterations;
        }
    }

    #[test]
    fn test_quota_semantics() {
        let solver = PuzzleSolver::new();

        let one: Vec<_> = solver
            .search(BitPair { bits: 0 }, SolutionQuota::AtMost(1))
            .collect();
        assert_eq!(one.len(), 1);

        // Both orderings reach the goal; end states are not deduplicated.
        let all: Vec<_> = solver
            .search(BitPair { bits: 0 }, SolutionQuota::All)
            .map(Result::unwrap)
            .collect();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|trail| trail.len() == 2));

        let none: Vec<_> = solver
            .search(BitPair { bits: 0 }, SolutionQuota::AtMost(0))
            .collect();
        assert!(none.is_empty());
    }

    #[test]
    fn test_time_limit_aborts_the_search() {
        let config = SearchConfig::new()
            .time_limit(Duration::ZERO)
            .check_interval(1);
        let solver = PuzzleSolver::with_config(config);

        let mut search = solver.search(Endless { n: 0 }, SolutionQuota::AtMost(1));
        let outcome = search.next().unwrap();
        assert_eq!(
            outcome,
            Err(SearchError::TimeLimitExceeded {
                limit: Duration::ZERO
            })
        );
        assert!(!search.exhausted());
        assert!(search.next().is_none());
    }

    // A 2×2 grid whose regions are the diagonals admits no solution at
    // all, but an empty grid of that shape is perfectly valid: every
    // candidate move fails propagation, so the frontier drains immediately.
    fn unsolvable_2x2() -> ConstraintGrid {
        let regions = vec![
            vec![Coord::new(0, 0), Coord::new(1, 1)],
            vec![Coord::new(0, 1), Coord::new(1, 0)],
        ];
        let geometry = Geometry::with_regions(2, regions).unwrap();
        ConstraintGrid::empty(geometry, Alphabet::for_size(2).unwrap()).unwrap()
    }

    #[test]
    fn test_exhaustion_is_not_an_error() {
        let solver = PuzzleSolver::new();
        let grid = unsolvable_2x2();
        assert!(grid.is_valid());
        assert!(!grid.is_end_state());

        let mut search = solver.search(grid, SolutionQuota::AtMost(1));
        assert!(search.next().is_none());
        assert!(search.exhausted());
        assert!(search.stats().iterations() <= 4);

        assert_eq!(solver.solve(unsolvable_2x2()).unwrap(), None);
    }

    #[test]
    fn test_solves_sparse_9x9_to_the_reference_grid() {
        testing::assert_solves_to_reference(
            Geometry::square(9).unwrap(),
            Alphabet::for_size(9).unwrap(),
            &fixtures::HARD_9X9,
        );
    }

    #[test]
    fn test_solves_easy_9x9_to_the_reference_grid() {
        testing::assert_solves_to_reference(
            Geometry::square(9).unwrap(),
            Alphabet::for_size(9).unwrap(),
            &fixtures::EASY_9X9,
        );
    }

    #[test]
    fn test_solves_12x12_with_rectangular_regions() {
        testing::assert_solves_to_reference(
            Geometry::rectangular(3, 4).unwrap(),
            Alphabet::for_size(12).unwrap(),
            &fixtures::TWELVE_3X4,
        );
    }

    #[test]
    fn test_solution_replay_with_reduced_strategies() {
        // Restricting propagation to the kill cascade plus hidden singles
        // forces the engine to do real branching even on an easy puzzle.
        let geometry = Geometry::square(9).unwrap();
        let alphabet = Alphabet::for_size(9).unwrap();
        let mut grid = ConstraintGrid::empty(geometry, alphabet)
            .unwrap()
            .with_strategies(vec![Box::new(crate::strategy::HiddenSingle::new())]);
        grid.place_givens(fixtures::EASY_9X9.givens).unwrap();
        assert!(!grid.is_end_state());

        let solver = PuzzleSolver::new();
        let moves = solver.solve(grid.clone()).unwrap().expect("solvable");
        assert!(!moves.is_empty());
        for m in &moves {
            grid.apply(*m, Propagation::Full).unwrap();
        }
        assert!(grid.is_end_state());
        assert_eq!(
            grid.canonical_state(),
            testing::rendered(fixtures::EASY_9X9.solution)
        );
    }
}
