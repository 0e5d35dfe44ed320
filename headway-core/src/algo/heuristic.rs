//! Lower-bound estimators for the path search. The search is polymorphic
//! over a single capability: estimate the remaining seconds between two
//! positions. Estimates must never exceed the true cost.

use geo::{Distance, Euclidean, Point};

use crate::config::HeuristicKind;

/// Network-wide top speed used by the straight-line estimate, in m/s.
pub const TRANSIT_TOP_SPEED: f64 = 55.0 / 3.6;

pub trait Heuristic: Send + Sync {
    /// Lower bound in whole seconds on the travel time from `from` to `to`.
    fn estimate(&self, from: Point, to: Point) -> u32;
}

/// Straight-line distance over the fastest vehicle in the network. No
/// itinerary can beat flying to the destination at top speed, so the
/// estimate is admissible.
#[derive(Debug, Clone, Copy)]
pub struct EuclideanTime {
    pub top_speed: f64,
}

impl Default for EuclideanTime {
    fn default() -> Self {
        EuclideanTime {
            top_speed: TRANSIT_TOP_SPEED,
        }
    }
}

impl Heuristic for EuclideanTime {
    fn estimate(&self, from: Point, to: Point) -> u32 {
        (Euclidean::distance(from, to) / self.top_speed).round() as u32
    }
}

/// The trivial lower bound; reduces the search to plain Dijkstra.
#[derive(Debug, Clone, Copy, Default)]
pub struct Zero;

impl Heuristic for Zero {
    fn estimate(&self, _from: Point, _to: Point) -> u32 {
        0
    }
}

impl HeuristicKind {
    /// Materialize the configured estimator.
    #[must_use]
    pub fn build(self) -> Box<dyn Heuristic> {
        match self {
            HeuristicKind::Euclidean => Box::new(EuclideanTime::default()),
            HeuristicKind::Zero => Box::new(Zero),
        }
    }
}
