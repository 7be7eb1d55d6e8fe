//! Constraint-propagation strategies.
//!
//! Each strategy inspects a [`ConstraintGrid`] for one kind of forced
//! deduction and applies the first instance it finds. The grid's
//! propagation pipeline runs the configured strategies in order after every
//! move, restarting from the first whenever one makes progress, until a
//! full pass finds nothing; the grid is then at a fixed point.

use std::fmt::Debug;

use crate::{error::PuzzleError, grid::ConstraintGrid};

pub use self::{
    hidden_pair::HiddenPair, hidden_single::HiddenSingle, locked_candidates::LockedCandidates,
};

mod hidden_pair;
mod hidden_single;
mod locked_candidates;

/// Returns the full strategy set, cheapest deduction first.
#[must_use]
pub fn all_strategies() -> Vec<BoxedStrategy> {
    vec![
        Box::new(HiddenSingle::new()),
        Box::new(LockedCandidates::new()),
        Box::new(HiddenPair::new()),
    ]
}

/// A constraint-propagation strategy.
///
/// Strategies are stateless; everything they deduce comes from the grid
/// they are applied to.
pub trait Strategy: Debug {
    /// Returns the name of the strategy.
    fn name(&self) -> &'static str;

    /// Returns a boxed clone of the strategy.
    fn clone_box(&self) -> BoxedStrategy;

    /// Applies the strategy's first finding, if any.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - A deduction was found and the grid changed
    /// * `Ok(false)` - Nothing to deduce; calling again without an
    ///   intervening move keeps returning `false`
    ///
    /// # Errors
    ///
    /// Returns an error if a deduction's cascade uncovers a contradiction.
    fn apply(&self, grid: &mut ConstraintGrid) -> Result<bool, PuzzleError>;
}

/// A boxed strategy.
pub type BoxedStrategy = Box<dyn Strategy>;

impl Clone for BoxedStrategy {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
