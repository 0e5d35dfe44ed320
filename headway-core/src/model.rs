//! External-collaborator tables the planner consumes: stops and lines in a
//! meter-accurate projection. GTFS parsing and normalization happen upstream;
//! these types are what arrives here. Validation is performed when the
//! [`TransitGraph`](crate::graph::TransitGraph) is built.

use geo::{LineString, Point};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// A transit stop. Immutable once the graph is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    /// Stable string identity.
    pub stop_id: String,
    /// Display name.
    pub name: String,
    /// Position in the metric projection.
    pub geometry: Point,
}

/// Kind of service a line provides, in the order the feed encodes it.
/// Serialized as its numeric tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum ModeClass {
    Train = 0,
    Brt = 1,
    Tram = 2,
    Bus = 3,
}

/// One directed transit line (a GTFS shape): an ordered run of stops with
/// scheduled per-hop travel times, a mean headway and presentation metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Stable string identity.
    pub line_id: String,
    /// Ordered stop identifiers; length >= 2, no repeats.
    pub stop_ids: Vec<String>,
    /// Scheduled seconds between consecutive stops; `stop_ids.len() - 1` entries.
    pub hop_seconds: Vec<u32>,
    /// Mean interval between vehicles in seconds; strictly positive.
    pub headway: u32,
    pub short_name: String,
    pub long_name: String,
    /// Direction headsign shown on the vehicle.
    pub headsign: String,
    pub mode: ModeClass,
    /// Presentation color as `#rrggbb`.
    pub color: String,
    /// Full line geometry in the metric projection.
    pub geometry: LineString,
}

impl Line {
    /// Position of `stop_id` within this line's stop sequence.
    #[must_use]
    pub fn stop_offset(&self, stop_id: &str) -> Option<usize> {
        self.stop_ids.iter().position(|s| s == stop_id)
    }
}

/// The full network handed over by the ingestion collaborators.
#[derive(Debug, Clone, Default)]
pub struct NetworkTables {
    pub stops: Vec<Stop>,
    pub lines: Vec<Line>,
}
