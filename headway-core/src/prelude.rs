//! Convenience re-exports of the planner surface.

pub use crate::algo::heuristic::{EuclideanTime, Heuristic, Zero};
pub use crate::algo::search::{search, PathNode, PathStep, SearchOptions, SearchOrigin};
pub use crate::config::{Config, HeuristicKind};
pub use crate::connectors::StopIndex;
pub use crate::graph::{GraphEdge, LineTag, TransitGraph};
pub use crate::itinerary::{Itinerary, RideSegment, Segment, WalkSegment};
pub use crate::model::{Line, ModeClass, NetworkTables, Stop};
pub use crate::planner::Planner;
pub use crate::segmenter::Segmenter;
pub use crate::streets::{StreetGraph, WalkingRouter};
pub use crate::Error;
