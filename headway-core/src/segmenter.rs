/*!
Folds a raw `(stop, incoming line)` path into a presentation itinerary.
The path is scanned left to right and split wherever the incoming line
changes; the junction stop closes the outgoing group and opens the next one,
so consecutive segments share it. Ride groups are materialized from the
authoritative line table and the graph edges; walk groups are re-routed over
the pedestrian network so they get realistic polylines instead of the
straight inter-stop abstraction the search worked on.

Data inconsistencies degrade in place: a hop the line table cannot confirm
gets a `None` delta, a failed trim keeps the full line polyline, and a ride
on a line missing from the table is dropped (its neighbours merge).
*/

use geo::Point;
use tracing::warn;

use crate::algo::search::{PathNode, PathStep};
use crate::config::Config;
use crate::graph::{GraphEdge, LineTag, TransitGraph};
use crate::itinerary::{Itinerary, RideSegment, Segment, WalkSegment};
use crate::shapes;
use crate::streets::{StreetGraph, WalkingRouter};

/// Borrowing view that turns raw paths into [`Itinerary`] values. Holds no
/// per-query state, so one instance serves a whole planning loop.
pub struct Segmenter<'a> {
    graph: &'a TransitGraph,
    walker: WalkingRouter<'a>,
}

impl<'a> Segmenter<'a> {
    #[must_use]
    pub fn new(graph: &'a TransitGraph, streets: &'a StreetGraph, config: &Config) -> Self {
        Segmenter {
            graph,
            walker: WalkingRouter::new(streets, config),
        }
    }

    /// Build the itinerary for `path`. `origin` and `destination` are the
    /// user's true query points; the path's sentinel anchors resolve to
    /// them.
    #[must_use]
    pub fn itinerary(&self, path: &[PathStep], origin: Point, destination: Point) -> Itinerary {
        let mut segments = Vec::new();

        for (tag, nodes) in group_by_line(path) {
            let segment = match tag {
                LineTag::None => None,
                LineTag::Walk => self
                    .walk_segment(&nodes, origin, destination)
                    .map(Segment::Walk),
                LineTag::Line(line_id) => self.ride_segment(&line_id, &nodes).map(Segment::Ride),
            };
            if let Some(segment) = segment {
                segments.push(segment);
            }
        }

        Itinerary {
            segments: merge_walks(segments),
        }
    }

    fn walk_segment(
        &self,
        nodes: &[PathNode],
        origin: Point,
        destination: Point,
    ) -> Option<WalkSegment> {
        let (from, from_name) = self.resolve(nodes.first()?, origin, destination)?;
        let (to, to_name) = self.resolve(nodes.last()?, origin, destination)?;
        if from == to {
            // zero-length hop, e.g. an origin placed exactly on a stop
            return None;
        }
        let (geometry, duration) = self.walker.route(from, to);
        Some(WalkSegment {
            from,
            to,
            from_name,
            to_name,
            duration,
            geometry,
        })
    }

    fn resolve(&self, node: &PathNode, origin: Point, destination: Point) -> Option<(Point, String)> {
        match node {
            PathNode::Origin => Some((origin, "Origin".to_string())),
            PathNode::Destination => Some((destination, "Destination".to_string())),
            PathNode::Stop(stop_id) => match self.graph.stop_by_id(stop_id) {
                Some(stop) => Some((stop.geometry, stop.name.clone())),
                None => {
                    warn!(stop_id = stop_id.as_str(), "path references a stop missing from the graph");
                    None
                }
            },
        }
    }

    fn ride_segment(&self, line_id: &str, nodes: &[PathNode]) -> Option<RideSegment> {
        let stop_ids: Vec<String> = nodes
            .iter()
            .filter_map(|node| node.as_stop().map(ToString::to_string))
            .collect();
        if stop_ids.len() < 2 {
            return None;
        }
        let Some(line) = self.graph.line(line_id) else {
            warn!(line_id, "path rides a line missing from the tables");
            return None;
        };

        let stop_names = stop_ids
            .iter()
            .map(|id| {
                self.graph
                    .stop_by_id(id)
                    .map_or_else(|| id.clone(), |stop| stop.name.clone())
            })
            .collect();

        // Per-hop deltas come from the line table and only when the two
        // stops are adjacent in it; anything else stays unknown.
        let mut hop_seconds = Vec::with_capacity(stop_ids.len() - 1);
        let mut duration = 0u32;
        let mut headways = Vec::new();
        for pair in stop_ids.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);

            let delta = match (line.stop_offset(from), line.stop_offset(to)) {
                (Some(at), Some(next)) if next == at + 1 => Some(line.hop_seconds[at]),
                _ => {
                    warn!(line_id, from = from.as_str(), to = to.as_str(), "hop is not adjacent in its line");
                    None
                }
            };
            hop_seconds.push(delta);

            let edges = self.graph.edges_between(from, to);
            let chosen = edges
                .iter()
                .find(|edge| edge.line_id() == Some(line_id))
                .or_else(|| edges.first());
            match chosen {
                Some(GraphEdge::Ride(ride)) => {
                    duration += ride.travel_time;
                    headways.push(ride.headway);
                }
                Some(GraphEdge::Transfer(walk)) => duration += walk.travel_time,
                None => warn!(line_id, from = from.as_str(), to = to.as_str(), "no graph edge backs this hop"),
            }
        }

        let first = self.graph.stop_position(&stop_ids[0]);
        let last = self.graph.stop_position(stop_ids.last().unwrap());
        let geometry = match (first, last) {
            (Some(first), Some(last)) => shapes::trim_between(&line.geometry, first, last)
                .unwrap_or_else(|| {
                    warn!(line_id, "trimming failed, keeping the full line shape");
                    line.geometry.clone()
                }),
            _ => line.geometry.clone(),
        };

        Some(RideSegment {
            line_id: line.line_id.clone(),
            short_name: line.short_name.clone(),
            long_name: line.long_name.clone(),
            headsign: line.headsign.clone(),
            mode: line.mode,
            color: line.color.clone(),
            stop_ids,
            stop_names,
            hop_seconds,
            duration,
            headway: median(headways),
            geometry,
        })
    }
}

/// Split the path into runs sharing one incoming line. The junction entry is
/// duplicated: it ends one run and starts the next.
fn group_by_line(path: &[PathStep]) -> Vec<(LineTag, Vec<PathNode>)> {
    let mut groups: Vec<(LineTag, Vec<PathNode>)> = Vec::new();

    for step in path {
        if let Some((tag, nodes)) = groups.last_mut() {
            if *tag == step.line {
                nodes.push(step.node.clone());
                continue;
            }
        }
        let mut nodes = Vec::new();
        if let Some(junction) = groups.last().and_then(|(_, done)| done.last()) {
            nodes.push(junction.clone());
        }
        nodes.push(step.node.clone());
        groups.push((step.line.clone(), nodes));
    }

    groups
}

fn merge_walks(segments: Vec<Segment>) -> Vec<Segment> {
    let mut merged: Vec<Segment> = Vec::new();

    for segment in segments {
        match (merged.last_mut(), segment) {
            (Some(Segment::Walk(previous)), Segment::Walk(next)) => {
                previous.to = next.to;
                previous.to_name = next.to_name;
                previous.duration += next.duration;
                match (previous.geometry.0.last(), next.geometry.0.first()) {
                    (Some(last), Some(first)) if last == first => {
                        previous.geometry.0.extend(next.geometry.0.iter().skip(1));
                    }
                    _ => previous.geometry.0.extend_from_slice(&next.geometry.0),
                }
            }
            (_, segment) => merged.push(segment),
        }
    }

    merged
}

fn median(mut values: Vec<u32>) -> u32 {
    if values.is_empty() {
        return 0;
    }
    values.sort_unstable();
    let middle = values.len() / 2;
    if values.len() % 2 == 1 {
        values[middle]
    } else {
        (values[middle - 1] + values[middle]) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::StopIndex;
    use crate::model::{Line, ModeClass, NetworkTables, Stop};
    use geo::line_string;

    fn stop(id: &str, x: f64, y: f64) -> Stop {
        Stop {
            stop_id: id.to_string(),
            name: format!("Stop {id}"),
            geometry: Point::new(x, y),
        }
    }

    fn line(id: &str, stops: &[&str], hops: &[u32], headway: u32, shape: geo::LineString) -> Line {
        Line {
            line_id: id.to_string(),
            stop_ids: stops.iter().map(ToString::to_string).collect(),
            hop_seconds: hops.to_vec(),
            headway,
            short_name: id.to_string(),
            long_name: format!("Line {id}"),
            headsign: "Terminal".to_string(),
            mode: ModeClass::Tram,
            color: "#2e7d32".to_string(),
            geometry: shape,
        }
    }

    fn graph() -> TransitGraph {
        let stops = vec![
            stop("A", 0.0, 0.0),
            stop("B", 1000.0, 0.0),
            stop("X", 2000.0, 0.0),
            stop("Y", 2000.0, 150.0),
            stop("F", 3000.0, 150.0),
        ];
        let lines = vec![
            line(
                "L1",
                &["A", "B", "X"],
                &[120, 120],
                180,
                line_string![(x: 0.0, y: 0.0), (x: 2000.0, y: 0.0)],
            ),
            line(
                "L2",
                &["Y", "F"],
                &[100],
                200,
                line_string![(x: 2000.0, y: 150.0), (x: 3000.0, y: 150.0)],
            ),
        ];
        let index = StopIndex::new(&stops).unwrap();
        TransitGraph::build(NetworkTables { stops, lines }, &index, &Config::default()).unwrap()
    }

    fn step(node: PathNode, line: LineTag) -> PathStep {
        PathStep { node, line }
    }

    fn on(line_id: &str) -> LineTag {
        LineTag::Line(line_id.to_string())
    }

    fn at(stop_id: &str) -> PathNode {
        PathNode::Stop(stop_id.to_string())
    }

    #[test]
    fn groups_duplicate_the_junction_stop() {
        let path = vec![
            step(PathNode::Origin, LineTag::None),
            step(at("A"), LineTag::Walk),
            step(at("B"), on("L1")),
            step(at("X"), on("L1")),
            step(at("Y"), LineTag::Walk),
        ];
        let groups = group_by_line(&path);
        assert_eq!(groups.len(), 4);
        assert_eq!(groups[1].1, vec![PathNode::Origin, at("A")]);
        assert_eq!(groups[2].0, on("L1"));
        assert_eq!(groups[2].1, vec![at("A"), at("B"), at("X")]);
        assert_eq!(groups[3].1, vec![at("X"), at("Y")]);
    }

    #[test]
    fn single_ride_path_yields_one_ride_segment() {
        let graph = graph();
        let config = Config::default();
        let streets = StreetGraph::empty();
        let segmenter = Segmenter::new(&graph, &streets, &config);

        // origin and destination placed exactly on the terminal stops
        let path = vec![
            step(PathNode::Origin, LineTag::None),
            step(at("A"), LineTag::Walk),
            step(at("B"), on("L1")),
            step(at("X"), on("L1")),
            step(PathNode::Destination, LineTag::Walk),
        ];
        let itinerary =
            segmenter.itinerary(&path, Point::new(0.0, 0.0), Point::new(2000.0, 0.0));

        assert_eq!(itinerary.segments.len(), 1);
        let Segment::Ride(ride) = &itinerary.segments[0] else {
            panic!("expected a ride");
        };
        assert_eq!(ride.stop_ids, ["A", "B", "X"]);
        assert_eq!(ride.stop_names[0], "Stop A");
        assert_eq!(ride.hop_seconds, [Some(120), Some(120)]);
        assert_eq!(ride.duration, 240);
        assert_eq!(ride.headway, 180);
    }

    #[test]
    fn walking_transfer_becomes_a_routed_walk() {
        let graph = graph();
        let config = Config::default();
        let streets = StreetGraph::from_parts(
            vec![Point::new(2000.0, 0.0), Point::new(2000.0, 150.0)],
            vec![(0, 1, 150.0)],
        )
        .unwrap();
        let segmenter = Segmenter::new(&graph, &streets, &config);

        let path = vec![
            step(PathNode::Origin, LineTag::None),
            step(at("A"), LineTag::Walk),
            step(at("B"), on("L1")),
            step(at("X"), on("L1")),
            step(at("Y"), LineTag::Walk),
            step(at("F"), on("L2")),
            step(PathNode::Destination, LineTag::Walk),
        ];
        let itinerary =
            segmenter.itinerary(&path, Point::new(0.0, 0.0), Point::new(3000.0, 150.0));

        assert_eq!(itinerary.segments.len(), 3);
        let Segment::Walk(transfer) = &itinerary.segments[1] else {
            panic!("expected the middle segment to be a walk");
        };
        assert_eq!(transfer.from_name, "Stop X");
        assert_eq!(transfer.to_name, "Stop Y");
        assert_eq!(
            transfer.duration,
            (150.0 / config.walk_speed_transfer).round() as u32
        );
    }

    #[test]
    fn leading_walk_starts_at_the_true_origin() {
        let graph = graph();
        let config = Config::default();
        let streets = StreetGraph::empty();
        let segmenter = Segmenter::new(&graph, &streets, &config);

        let path = vec![
            step(PathNode::Origin, LineTag::None),
            step(at("A"), LineTag::Walk),
            step(at("B"), on("L1")),
        ];
        let origin = Point::new(-80.0, 60.0);
        let itinerary = segmenter.itinerary(&path, origin, Point::new(1000.0, 0.0));

        let Segment::Walk(access) = &itinerary.segments[0] else {
            panic!("expected a leading walk");
        };
        assert_eq!(access.from, origin);
        assert_eq!(access.from_name, "Origin");
        assert_eq!(access.to_name, "Stop A");
        // straight-line fallback at the slow speed (empty street network)
        assert_eq!(access.duration, (100.0 / config.walk_speed_slow).round() as u32);
    }

    #[test]
    fn non_adjacent_hop_keeps_unknown_delta() {
        let graph = graph();
        let config = Config::default();
        let streets = StreetGraph::empty();
        let segmenter = Segmenter::new(&graph, &streets, &config);

        // synthetic path that skips B; the table cannot confirm the hop
        let path = vec![
            step(at("A"), LineTag::None),
            step(at("X"), on("L1")),
        ];
        let itinerary =
            segmenter.itinerary(&path, Point::new(0.0, 0.0), Point::new(2000.0, 0.0));

        let Segment::Ride(ride) = &itinerary.segments[0] else {
            panic!("expected a ride");
        };
        assert_eq!(ride.hop_seconds, [None]);
        assert_eq!(ride.duration, 0);
    }

    #[test]
    fn dropped_ride_merges_its_walk_neighbours() {
        let graph = graph();
        let config = Config::default();
        let streets = StreetGraph::empty();
        let segmenter = Segmenter::new(&graph, &streets, &config);

        // the middle line does not exist in the tables
        let path = vec![
            step(PathNode::Origin, LineTag::None),
            step(at("A"), LineTag::Walk),
            step(at("B"), on("GHOST")),
            step(at("X"), LineTag::Walk),
        ];
        let itinerary =
            segmenter.itinerary(&path, Point::new(-100.0, 0.0), Point::new(2000.0, 0.0));

        assert_eq!(itinerary.segments.len(), 1);
        let Segment::Walk(walk) = &itinerary.segments[0] else {
            panic!("expected a single merged walk");
        };
        assert_eq!(walk.from_name, "Origin");
        assert_eq!(walk.to_name, "Stop X");
    }

    #[test]
    fn trimmed_ride_geometry_ends_at_its_stops() {
        let graph = graph();
        let config = Config::default();
        let streets = StreetGraph::empty();
        let segmenter = Segmenter::new(&graph, &streets, &config);

        let path = vec![
            step(at("A"), LineTag::None),
            step(at("B"), on("L1")),
        ];
        let itinerary =
            segmenter.itinerary(&path, Point::new(0.0, 0.0), Point::new(1000.0, 0.0));

        let Segment::Ride(ride) = &itinerary.segments[0] else {
            panic!("expected a ride");
        };
        let last = ride.geometry.0.last().unwrap();
        assert!(approx::abs_diff_eq!(last.x, 1000.0, epsilon = 1.0));
        assert!(approx::abs_diff_eq!(last.y, 0.0, epsilon = 1.0));
    }
}
