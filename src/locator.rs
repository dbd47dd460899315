//! Spatial proximity indices ("locators") over n-dimensional vectors.
//!
//! A locator owns a copy of every vector inserted into it, hands out dense
//! sequential indices in insertion order, and answers radius-bounded proximity
//! queries under the L2 metric. Two interchangeable strategies implement the
//! same [`Locator`] contract: an exhaustive linear scan and a hashed uniform
//! grid. Callers pick one through [`LocatorParams`] and stay strategy-agnostic
//! from then on.

mod bruteforce;
mod hashed_grid;

pub use bruteforce::BruteForceLocator;
pub use hashed_grid::HashGridLocator;

use crate::na::DVector;
use serde::{Deserialize, Serialize};

/// Which index structure a locator should be backed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Linear scan over all stored vectors; O(N) per query. The correctness
    /// baseline, and the better choice for small N or high dimensionality.
    BruteForce,

    /// Uniform grid hashed by integer cell coordinates; per-query cost tracks
    /// the local point density instead of N for well distributed data.
    HashGrid,
}

/// Construction parameters for a locator instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocatorParams {
    pub strategy: Strategy,

    /// Edge length of a grid cell (hashed-grid strategy only). Queries are
    /// cheapest when the cell size is on the order of the query radius, so a
    /// radius query touches only a few cells per axis.
    pub cell_size: f64,
}

impl Default for LocatorParams {
    fn default() -> Self {
        Self {
            strategy: Strategy::HashGrid,
            cell_size: 0.05,
        }
    }
}

impl LocatorParams {
    pub fn new(strategy: Strategy, cell_size: f64) -> Self {
        Self {
            strategy,
            cell_size,
        }
    }

    /// Build an empty locator with these parameters.
    pub fn build(&self) -> Box<dyn Locator> {
        match self.strategy {
            Strategy::BruteForce => Box::new(BruteForceLocator::new()),
            Strategy::HashGrid => Box::new(HashGridLocator::new(self.cell_size)),
        }
    }
}

/// Incremental spatial index with radius-bounded proximity queries.
///
/// Stored vectors receive dense sequential indices starting at 0, in insertion
/// order. All vectors inserted into one instance must share a single
/// dimensionality, fixed by the first insertion. Distances are L2; queries
/// report squared distances to avoid needless square roots.
pub trait Locator: Send + Sync {
    /// Drop all stored vectors, returning the index to its empty state.
    fn reset(&mut self);

    /// Append one vector, assigning it the next sequential index.
    ///
    /// Panics if the vector's dimensionality differs from vectors already
    /// stored; there are no other error conditions.
    fn add(&mut self, point: &DVector<f64>);

    /// Append a range of vectors in order.
    fn add_all(&mut self, points: &[DVector<f64>]) {
        for p in points {
            self.add(p);
        }
    }

    /// Number of stored vectors.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The vector stored at `index`. Panics if `index` was never assigned;
    /// that is a caller programming error, not a recoverable condition.
    fn get(&self, index: usize) -> &DVector<f64>;

    /// Any single stored vector with L2 distance ≤ `radius` from `query`,
    /// together with its squared distance. Implementations may short-circuit
    /// on the first hit; the result is not guaranteed to be the closest.
    fn find_any_within_radius(&self, query: &DVector<f64>, radius: f64) -> Option<(usize, f64)>;

    /// Every stored vector within `radius` of `query`, unordered, with
    /// squared distances. An empty result is a valid outcome.
    fn find_all_within_radius(&self, query: &DVector<f64>, radius: f64) -> Vec<(usize, f64)>;

    /// The single nearest stored vector within `radius`, resolved by exact
    /// squared-distance comparison. Ties go to the first candidate reached in
    /// the scan order, which is deterministic for a fixed insertion order.
    fn find_closest_within_radius(&self, query: &DVector<f64>, radius: f64)
    -> Option<(usize, f64)>;
}
