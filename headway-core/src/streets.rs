/*!
Pedestrian street network and point-to-point walking routes. The network
itself comes from an external collaborator as a node/edge list (nodes are
positions in the metric projection, edges carry their length in meters);
this module wraps it in an undirected petgraph with an R-tree for the
"nearest node to a point" primitive, and routes between arbitrary points by
snapping both endpoints onto the network.
*/

use geo::{line_string, Coord, Distance, Euclidean, LineString, Point};
use petgraph::algo::astar;
use petgraph::graph::{NodeIndex, UnGraph};
use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::config::Config;
use crate::Error;

type IndexedNode = GeomWithData<Point, NodeIndex>;

/// The walkable street network: undirected, edge weights are lengths in
/// meters. Built once; read-only afterwards.
#[derive(Debug, Clone)]
pub struct StreetGraph {
    graph: UnGraph<Point, f64>,
    tree: RTree<IndexedNode>,
}

impl StreetGraph {
    /// Assemble the network from a node list and `(from, to, length_meters)`
    /// edges indexing into it.
    pub fn from_parts(nodes: Vec<Point>, edges: Vec<(usize, usize, f64)>) -> Result<Self, Error> {
        let mut graph = UnGraph::new_undirected();
        let indices: Vec<NodeIndex> = nodes.into_iter().map(|p| graph.add_node(p)).collect();

        for (from, to, length) in edges {
            let u = *indices.get(from).ok_or(Error::MissingStreetNode(from))?;
            let v = *indices.get(to).ok_or(Error::MissingStreetNode(to))?;
            if !length.is_finite() || length < 0.0 {
                return Err(Error::InvalidData(format!(
                    "street edge {from}-{to} has invalid length {length}"
                )));
            }
            graph.add_edge(u, v, length);
        }

        let tree = RTree::bulk_load(
            graph
                .node_indices()
                .map(|node| IndexedNode::new(graph[node], node))
                .collect(),
        );
        Ok(StreetGraph { graph, tree })
    }

    /// An empty network; every walking route degrades to a straight line.
    #[must_use]
    pub fn empty() -> Self {
        StreetGraph {
            graph: UnGraph::new_undirected(),
            tree: RTree::new(),
        }
    }

    /// Nearest network node to `point`, with its position.
    #[must_use]
    pub fn nearest_node(&self, point: Point) -> Option<(NodeIndex, Point)> {
        self.tree
            .nearest_neighbor(&point)
            .map(|found| (found.data, *found.geom()))
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub(crate) fn inner(&self) -> &UnGraph<Point, f64> {
        &self.graph
    }
}

/// Routes walks between two arbitrary points: snap each endpoint to its
/// nearest street node, take the shortest path by length between the snapped
/// nodes, and join it to the true endpoints with off-graph stubs. Stubs are
/// walked at the slow speed, the on-graph part at the transfer speed. When
/// both endpoints snap to the same node, or no path connects them, the route
/// degrades to a straight line at the slow speed.
#[derive(Debug, Clone, Copy)]
pub struct WalkingRouter<'a> {
    streets: &'a StreetGraph,
    fast_speed: f64,
    slow_speed: f64,
}

impl<'a> WalkingRouter<'a> {
    #[must_use]
    pub fn new(streets: &'a StreetGraph, config: &Config) -> Self {
        WalkingRouter {
            streets,
            fast_speed: config.walk_speed_transfer,
            slow_speed: config.walk_speed_slow,
        }
    }

    /// Walking polyline and duration in whole seconds from `from` to `to`.
    #[must_use]
    pub fn route(&self, from: Point, to: Point) -> (LineString, u32) {
        let Some((snap_from, from_pos)) = self.streets.nearest_node(from) else {
            return self.straight(from, to);
        };
        let Some((snap_to, to_pos)) = self.streets.nearest_node(to) else {
            return self.straight(from, to);
        };
        if snap_from == snap_to {
            return self.straight(from, to);
        }

        let graph = self.streets.inner();
        let Some((length, nodes)) = astar(
            graph,
            snap_from,
            |node| node == snap_to,
            |edge| *edge.weight(),
            |_| 0.0,
        ) else {
            return self.straight(from, to);
        };

        let seconds = round_secs(Euclidean::distance(from, from_pos), self.slow_speed)
            + round_secs(length, self.fast_speed)
            + round_secs(Euclidean::distance(to_pos, to), self.slow_speed);

        let mut coords: Vec<Coord> = Vec::with_capacity(nodes.len() + 2);
        push_dedup(&mut coords, from.into());
        for node in nodes {
            push_dedup(&mut coords, graph[node].into());
        }
        push_dedup(&mut coords, to.into());

        (LineString::new(coords), seconds)
    }

    fn straight(&self, from: Point, to: Point) -> (LineString, u32) {
        let seconds = round_secs(Euclidean::distance(from, to), self.slow_speed);
        (line_string![from.into(), to.into()], seconds)
    }
}

fn round_secs(distance: f64, speed: f64) -> u32 {
    (distance / speed).round() as u32
}

fn push_dedup(coords: &mut Vec<Coord>, coord: Coord) {
    if coords.last() != Some(&coord) {
        coords.push(coord);
    }
}
