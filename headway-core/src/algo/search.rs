/*!
The multimodal shortest-path engine: best-first search over
`(stop, incoming line)` states. Arriving at the same stop on different lines
is kept as distinct states because the transfer penalty downstream depends
on how you got there. Switching between two real lines charges the boarded
edge's headway once, approximating the mean wait for the next vehicle;
continuing on the same line, stepping off to walk, or boarding after a walk
costs nothing extra.

The implementation follows the classic Dijkstra shape from the [`petgraph`]
crate, extended with the expanded state space, an admissible heuristic, a
forbidden-line filter and deterministic `(priority, stop, line)` pop order.
*/

use std::collections::BinaryHeap;

use hashbrown::hash_map::Entry::{Occupied, Vacant};
use hashbrown::{HashMap, HashSet};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use crate::algo::heuristic::Heuristic;
use crate::algo::MinScored;
use crate::graph::{GraphEdge, LineTag, TransitGraph};
use crate::Error;

/// Node of a reconstructed path. The origin and destination anchors are
/// sentinels; they never exist in the transit graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathNode {
    Origin,
    Destination,
    Stop(String),
}

impl PathNode {
    /// The stop identifier, unless this is a sentinel.
    #[must_use]
    pub fn as_stop(&self) -> Option<&str> {
        match self {
            PathNode::Stop(id) => Some(id),
            _ => None,
        }
    }
}

/// One entry of a raw path: where the traveller is and how they arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStep {
    pub node: PathNode,
    pub line: LineTag,
}

/// Where a search starts.
#[derive(Debug, Clone, Copy)]
pub enum SearchOrigin<'a> {
    /// A real stop. Every first edge charges its headway on top of the
    /// travel time, modelling the initial boarding wait.
    Stop(&'a str),
    /// An abstract origin anchor connected to each listed stop by a walk of
    /// the given duration in seconds. Must be non-empty.
    Virtual(&'a [(String, u32)]),
}

#[derive(Debug, Clone, Copy)]
pub struct SearchOptions<'a> {
    /// Lines the search must not ride. Walking is never forbidden.
    pub forbidden_lines: Option<&'a HashSet<String>>,
    /// Deprioritize just-transferred branches by `2 × penalty` in the queue.
    /// Stored costs are unaffected; disable when comparing against a
    /// reference shortest path.
    pub transfer_nudge: bool,
}

impl Default for SearchOptions<'_> {
    fn default() -> Self {
        SearchOptions {
            forbidden_lines: None,
            transfer_nudge: true,
        }
    }
}

type StateKey = (NodeIndex, LineTag);
type Queue = BinaryHeap<MinScored<(String, LineTag, NodeIndex)>>;

/// Cheapest path from `origin` to the stop `destination`.
///
/// Returns the traversed `(stop, incoming line)` sequence — starting at the
/// origin stop or sentinel, ending at the destination stop — together with
/// its cost in seconds, or `None` when no path exists under the forbidden
/// set. Unknown stop identifiers are the caller's error.
pub fn search(
    graph: &TransitGraph,
    origin: SearchOrigin<'_>,
    destination: &str,
    heuristic: &dyn Heuristic,
    options: &SearchOptions<'_>,
) -> Result<Option<(Vec<PathStep>, u32)>, Error> {
    let destination_node = graph
        .node_index(destination)
        .ok_or_else(|| Error::UnknownStop(destination.to_string()))?;
    let destination_pos = graph.stop(destination_node).geometry;

    let mut scores: HashMap<StateKey, u32> = HashMap::new();
    let mut previous: HashMap<StateKey, Option<StateKey>> = HashMap::new();
    let mut queue: Queue = BinaryHeap::new();

    let origin_step = match origin {
        SearchOrigin::Stop(stop_id) => {
            let source = graph
                .node_index(stop_id)
                .ok_or_else(|| Error::UnknownStop(stop_id.to_string()))?;
            for edge in graph.edges(source) {
                let weight = edge.weight();
                if is_forbidden(options, weight) {
                    continue;
                }
                // initial boarding wait
                let cost = weight.travel_time() + weight.headway();
                let key = (edge.target(), weight.line_tag());
                let estimate = heuristic.estimate(graph.stop(edge.target()).geometry, destination_pos);
                offer(graph, &mut scores, &mut previous, &mut queue, key, cost, None, cost + estimate);
            }
            PathStep {
                node: PathNode::Stop(stop_id.to_string()),
                line: LineTag::None,
            }
        }
        SearchOrigin::Virtual(entries) => {
            for (stop_id, walk_seconds) in entries {
                let node = graph
                    .node_index(stop_id)
                    .ok_or_else(|| Error::UnknownStop(stop_id.clone()))?;
                let key = (node, LineTag::Walk);
                let estimate = heuristic.estimate(graph.stop(node).geometry, destination_pos);
                offer(
                    graph,
                    &mut scores,
                    &mut previous,
                    &mut queue,
                    key,
                    *walk_seconds,
                    None,
                    *walk_seconds + estimate,
                );
            }
            PathStep {
                node: PathNode::Origin,
                line: LineTag::None,
            }
        }
    };

    let mut arrival: Option<LineTag> = None;
    while let Some(MinScored(_, (_, line, node))) = queue.pop() {
        if node == destination_node {
            arrival = Some(line);
            break;
        }
        let current = (node, line);
        let current_cost = scores[&current];

        for edge in graph.edges(node) {
            let weight = edge.weight();
            if is_forbidden(options, weight) {
                continue;
            }
            let penalty = transfer_penalty(&current.1, weight);
            let cost = current_cost + weight.travel_time() + penalty;
            let key = (edge.target(), weight.line_tag());
            if scores.get(&key).is_none_or(|&best| cost < best) {
                let mut priority =
                    cost + heuristic.estimate(graph.stop(edge.target()).geometry, destination_pos);
                if options.transfer_nudge {
                    priority += 2 * penalty;
                }
                offer(
                    graph,
                    &mut scores,
                    &mut previous,
                    &mut queue,
                    key,
                    cost,
                    Some(current.clone()),
                    priority,
                );
            }
        }
    }

    let Some(arrival_line) = arrival else {
        return Ok(None);
    };
    let total = scores[&(destination_node, arrival_line.clone())];

    let mut steps = Vec::new();
    let mut cursor = Some((destination_node, arrival_line));
    while let Some(key) = cursor {
        steps.push(PathStep {
            node: PathNode::Stop(graph.stop(key.0).stop_id.clone()),
            line: key.1.clone(),
        });
        cursor = previous.get(&key).cloned().flatten();
    }
    steps.push(origin_step);
    steps.reverse();

    Ok(Some((steps, total)))
}

/// Record `cost` for `key` if it improves on the best known, remember the
/// predecessor and enqueue the state.
#[allow(clippy::too_many_arguments)]
fn offer(
    graph: &TransitGraph,
    scores: &mut HashMap<StateKey, u32>,
    previous: &mut HashMap<StateKey, Option<StateKey>>,
    queue: &mut Queue,
    key: StateKey,
    cost: u32,
    prior: Option<StateKey>,
    priority: u32,
) {
    match scores.entry(key.clone()) {
        Occupied(mut ent) => {
            if cost < *ent.get() {
                ent.insert(cost);
            } else {
                return;
            }
        }
        Vacant(ent) => {
            ent.insert(cost);
        }
    }
    let (node, line) = key.clone();
    previous.insert(key, prior);
    queue.push(MinScored(priority, (graph.stop(node).stop_id.clone(), line, node)));
}

/// Waiting cost of taking `edge` after arriving the way `arrived` says:
/// the boarded line's headway when switching between two real lines,
/// nothing otherwise.
fn transfer_penalty(arrived: &LineTag, edge: &GraphEdge) -> u32 {
    match (arrived, edge) {
        (LineTag::Line(current), GraphEdge::Ride(ride)) if *current != ride.line_id => ride.headway,
        _ => 0,
    }
}

fn is_forbidden(options: &SearchOptions<'_>, edge: &GraphEdge) -> bool {
    match (options.forbidden_lines, edge.line_id()) {
        (Some(forbidden), Some(line_id)) => forbidden.contains(line_id),
        _ => false,
    }
}
