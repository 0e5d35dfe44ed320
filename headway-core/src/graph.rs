/*!
The directed transit multigraph. Nodes are stops; edges are either *rides*
(one hop on a line between consecutive stops, carrying the scheduled travel
time and the line's mean headway) or *walking transfers* (short inter-stop
walks generated from stop proximity, headway zero). Two lines connecting the
same stop pair produce parallel edges.

Built once from the collaborator tables and read-only afterwards, so
concurrent queries need no locking.
*/

use std::collections::BTreeSet;
use std::ops::Deref;

use geo::Point;
use hashbrown::HashMap;
use itertools::Itertools;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rayon::prelude::*;
use tracing::info;

use crate::config::Config;
use crate::connectors::StopIndex;
use crate::model::{Line, NetworkTables, Stop};
use crate::Error;

/// How a traveller arrived at a stop: not yet departed, on foot, or riding
/// a specific line. The search keys its states on this, because arriving at
/// the same stop on different lines leads to different transfer penalties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LineTag {
    /// Initial origin state; never appears on an edge.
    None,
    /// Arrived on foot.
    Walk,
    /// Arrived riding this line.
    Line(String),
}

impl LineTag {
    /// The line identifier, if this tag names a real line.
    #[must_use]
    pub fn as_line(&self) -> Option<&str> {
        match self {
            LineTag::Line(id) => Some(id),
            _ => None,
        }
    }
}

/// One hop on a transit line between consecutive stops.
#[derive(Debug, Clone, PartialEq)]
pub struct RideEdge {
    pub line_id: String,
    /// Scheduled seconds between the two stops.
    pub travel_time: u32,
    /// The line's mean headway in seconds; strictly positive.
    pub headway: u32,
}

/// A short inter-stop walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkEdge {
    pub travel_time: u32,
}

/// Edge payload of the transit graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEdge {
    Ride(RideEdge),
    Transfer(WalkEdge),
}

impl GraphEdge {
    #[must_use]
    pub fn travel_time(&self) -> u32 {
        match self {
            GraphEdge::Ride(ride) => ride.travel_time,
            GraphEdge::Transfer(walk) => walk.travel_time,
        }
    }

    /// Mean headway of the edge's line; zero on walking transfers.
    #[must_use]
    pub fn headway(&self) -> u32 {
        match self {
            GraphEdge::Ride(ride) => ride.headway,
            GraphEdge::Transfer(_) => 0,
        }
    }

    #[must_use]
    pub fn line_id(&self) -> Option<&str> {
        match self {
            GraphEdge::Ride(ride) => Some(&ride.line_id),
            GraphEdge::Transfer(_) => None,
        }
    }

    /// The arrival tag a traveller gets by taking this edge.
    #[must_use]
    pub fn line_tag(&self) -> LineTag {
        match self {
            GraphEdge::Ride(ride) => LineTag::Line(ride.line_id.clone()),
            GraphEdge::Transfer(_) => LineTag::Walk,
        }
    }
}

/// The transit network: a petgraph `DiGraph` over stops plus the lookup
/// tables the search and segmenter need.
#[derive(Debug, Clone)]
pub struct TransitGraph {
    graph: DiGraph<Stop, GraphEdge>,
    node_ids: HashMap<String, NodeIndex>,
    lines: HashMap<String, Line>,
    stop_lines: HashMap<String, BTreeSet<String>>,
}

impl TransitGraph {
    /// Build the graph from the collaborator tables: one ride edge per
    /// consecutive stop pair of every line, then symmetric walking transfers
    /// between all stop pairs closer than the walking threshold. The stop
    /// index enumerates transfer candidates; `config` fixes the threshold
    /// and the transfer walking speed.
    pub fn build(tables: NetworkTables, index: &StopIndex, config: &Config) -> Result<Self, Error> {
        let NetworkTables { stops, lines } = tables;

        let mut graph = DiGraph::new();
        let mut node_ids: HashMap<String, NodeIndex> = HashMap::with_capacity(stops.len());
        for stop in stops {
            let stop_id = stop.stop_id.clone();
            let node = graph.add_node(stop);
            if node_ids.insert(stop_id.clone(), node).is_some() {
                return Err(Error::InvalidData(format!("duplicate stop id {stop_id}")));
            }
        }

        let mut line_table: HashMap<String, Line> = HashMap::with_capacity(lines.len());
        let mut stop_lines: HashMap<String, BTreeSet<String>> = HashMap::new();
        let mut ride_edges = 0usize;
        for line in lines {
            validate_line(&line)?;
            for stop_id in &line.stop_ids {
                if !node_ids.contains_key(stop_id.as_str()) {
                    return Err(Error::UnknownStop(stop_id.clone()));
                }
                stop_lines
                    .entry(stop_id.clone())
                    .or_default()
                    .insert(line.line_id.clone());
            }
            for (hop, (from, to)) in line.stop_ids.iter().tuple_windows().enumerate() {
                let edge = GraphEdge::Ride(RideEdge {
                    line_id: line.line_id.clone(),
                    travel_time: line.hop_seconds[hop],
                    headway: line.headway,
                });
                graph.add_edge(node_ids[from.as_str()], node_ids[to.as_str()], edge);
                ride_edges += 1;
            }
            let line_id = line.line_id.clone();
            if line_table.insert(line_id.clone(), line).is_some() {
                return Err(Error::InvalidData(format!("duplicate line id {line_id}")));
            }
        }

        let transfers = transfer_candidates(&graph, &node_ids, index, config);
        let transfer_edges = transfers.len() * 2;
        for (u, v, travel_time) in transfers {
            let edge = GraphEdge::Transfer(WalkEdge { travel_time });
            graph.add_edge(u, v, edge.clone());
            graph.add_edge(v, u, edge);
        }

        info!(
            stops = graph.node_count(),
            ride_edges, transfer_edges, "transit graph built"
        );

        Ok(TransitGraph {
            graph,
            node_ids,
            lines: line_table,
            stop_lines,
        })
    }

    #[must_use]
    pub fn node_index(&self, stop_id: &str) -> Option<NodeIndex> {
        self.node_ids.get(stop_id).copied()
    }

    #[must_use]
    pub fn stop(&self, node: NodeIndex) -> &Stop {
        &self.graph[node]
    }

    #[must_use]
    pub fn stop_by_id(&self, stop_id: &str) -> Option<&Stop> {
        self.node_index(stop_id).map(|node| &self.graph[node])
    }

    #[must_use]
    pub fn stop_position(&self, stop_id: &str) -> Option<Point> {
        self.stop_by_id(stop_id).map(|stop| stop.geometry)
    }

    #[must_use]
    pub fn line(&self, line_id: &str) -> Option<&Line> {
        self.lines.get(line_id)
    }

    /// Identifiers of the lines serving `stop_id` (derived during build).
    #[must_use]
    pub fn lines_at(&self, stop_id: &str) -> Option<&BTreeSet<String>> {
        self.stop_lines.get(stop_id)
    }

    /// Identifiers of every stop in the network, in unspecified order.
    pub fn stop_ids(&self) -> impl Iterator<Item = &str> {
        self.node_ids.keys().map(String::as_str)
    }

    /// Outgoing edges of a stop, parallels included.
    pub fn outgoing(&self, stop_id: &str) -> Option<impl Iterator<Item = (&Stop, &GraphEdge)>> {
        let node = self.node_index(stop_id)?;
        let graph = &self.graph;
        Some(
            graph
                .edges(node)
                .map(move |edge| (&graph[edge.target()], edge.weight())),
        )
    }

    /// All (possibly parallel) edges from `from` to `to`.
    #[must_use]
    pub fn edges_between(&self, from: &str, to: &str) -> Vec<&GraphEdge> {
        match (self.node_index(from), self.node_index(to)) {
            (Some(u), Some(v)) => self.edges_between_nodes(u, v),
            _ => Vec::new(),
        }
    }

    pub(crate) fn edges_between_nodes(&self, u: NodeIndex, v: NodeIndex) -> Vec<&GraphEdge> {
        self.graph
            .edges_connecting(u, v)
            .map(|edge| edge.weight())
            .collect()
    }
}

/// Read-only access to the inner `DiGraph`; the graph is never mutated
/// after [`TransitGraph::build`], so no `DerefMut` is provided.
impl Deref for TransitGraph {
    type Target = DiGraph<Stop, GraphEdge>;

    fn deref(&self) -> &Self::Target {
        &self.graph
    }
}

fn validate_line(line: &Line) -> Result<(), Error> {
    if line.stop_ids.len() < 2 {
        return Err(Error::InvalidData(format!(
            "line {} needs at least two stops",
            line.line_id
        )));
    }
    if line.hop_seconds.len() + 1 != line.stop_ids.len() {
        return Err(Error::InvalidData(format!(
            "line {} has {} stops but {} hop times",
            line.line_id,
            line.stop_ids.len(),
            line.hop_seconds.len()
        )));
    }
    if line.headway == 0 {
        return Err(Error::InvalidData(format!(
            "line {} has zero headway",
            line.line_id
        )));
    }
    if !line.stop_ids.iter().all_unique() {
        return Err(Error::InvalidData(format!(
            "line {} visits a stop twice",
            line.line_id
        )));
    }
    Ok(())
}

/// Enumerate unordered stop pairs within walking range, in parallel. Each
/// pair is reported once (`from < to`) and materialized in both directions
/// by the caller, which keeps the transfer edges symmetric.
fn transfer_candidates(
    graph: &DiGraph<Stop, GraphEdge>,
    node_ids: &HashMap<String, NodeIndex>,
    index: &StopIndex,
    config: &Config,
) -> Vec<(NodeIndex, NodeIndex, u32)> {
    let max_distance = config.max_walk_distance();
    let nodes: Vec<NodeIndex> = graph.node_indices().collect();
    nodes
        .par_iter()
        .flat_map_iter(|&u| {
            let from = &graph[u];
            index
                .within(from.geometry, max_distance)
                .into_iter()
                .filter(|(id, _)| id.as_str() > from.stop_id.as_str())
                .filter_map(|(id, distance)| {
                    let v = *node_ids.get(id.as_str())?;
                    let travel_time = (distance / config.walk_speed_transfer).round() as u32;
                    Some((u, v, travel_time))
                })
                .collect::<Vec<_>>()
        })
        .collect()
}
