pub mod heuristic;
pub mod search;

pub use heuristic::{EuclideanTime, Heuristic, Zero};
pub use search::{search, PathNode, PathStep, SearchOptions, SearchOrigin};

use std::cmp::Ordering;

/// `MinScored<K>` holds a score and a key in a pair for use with a
/// `BinaryHeap`.
///
/// It compares in reverse order so the heap acts as a min-heap, and breaks
/// equal scores on the (reversed) key, which makes the pop order fully
/// deterministic. This implementation is based on the one in the `petgraph`
/// crate.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct MinScored<K>(pub u32, pub K);

impl<K: Ord> PartialOrd for MinScored<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for MinScored<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.cmp(&self.0).then_with(|| other.1.cmp(&self.1))
    }
}
