/*!
# Headway

**Headway** plans multimodal journeys (walking + scheduled public transit)
between two points of a metropolitan area. Given an origin and a destination
it returns up to `k` alternative itineraries, each an ordered sequence of
walking and transit segments with stops, geometries and time estimates.

The transit network is a directed graph whose nodes are stops and whose edges
are either rides (one hop on a line between consecutive stops) or short
walking transfers generated offline from stop proximity. Waiting is modelled
with each line's mean headway rather than a timetable: boarding a new line
charges its headway once. The search runs A* over `(stop, incoming line)`
states, and alternatives are produced by re-running it while forbidding the
lines already used.

All geometry is expected in a meter-accurate projection (the reference
deployment uses EPSG:3857); transform geographic coordinates before handing
them to the planner.

# Example
```ignore
use geo::Point;
use headway_core::prelude::*;

let tables = NetworkTables { stops, lines };
let config = Config::default();

let index = StopIndex::new(&tables.stops)?;
let graph = TransitGraph::build(tables, &index, &config)?;
let streets = StreetGraph::from_parts(street_nodes, street_edges)?;

let planner = Planner::new(graph, index, streets, config);
for (itinerary, total_seconds) in planner.plan(origin, destination)? {
    println!("{} segments, {total_seconds} s", itinerary.segments.len());
}
```
*/

use thiserror::Error;

pub mod algo;
pub mod config;
pub mod connectors;
pub mod graph;
pub mod itinerary;
pub mod model;
pub mod planner;
pub mod prelude;
pub mod segmenter;
pub mod shapes;
pub mod streets;

/// Error type for network construction and query validation.
///
/// An unreachable destination is not an error: searches return `None` and
/// [`planner::Planner::plan`] returns an empty list. Data inconsistencies
/// found while assembling an itinerary degrade in place (unknown hop deltas,
/// untrimmed geometry) instead of failing the whole query.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("stop not found: {0}")]
    UnknownStop(String),
    #[error("line not found: {0}")]
    UnknownLine(String),
    #[error("spatial index has no entries")]
    EmptyIndex,
    #[error("street edge references missing node {0}")]
    MissingStreetNode(usize),
}
