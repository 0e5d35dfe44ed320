//! Toy-network fixtures shared by the integration tests. Coordinates are
//! plain meters; stops sit 1 km apart unless a scenario needs otherwise, so
//! no accidental walking transfers appear (the default threshold is ~417 m).

#![allow(dead_code)]

use geo::{Coord, LineString, Point};
use headway_core::prelude::*;

pub fn stop(id: &str, x: f64, y: f64) -> Stop {
    Stop {
        stop_id: id.to_string(),
        name: format!("Stop {id}"),
        geometry: Point::new(x, y),
    }
}

pub fn line(id: &str, stops: &[&str], hops: &[u32], headway: u32, shape: &[(f64, f64)]) -> Line {
    Line {
        line_id: id.to_string(),
        stop_ids: stops.iter().map(ToString::to_string).collect(),
        hop_seconds: hops.to_vec(),
        headway,
        short_name: id.to_string(),
        long_name: format!("Line {id}"),
        headsign: "Terminal".to_string(),
        mode: ModeClass::Bus,
        color: "#1565c0".to_string(),
        geometry: LineString::new(shape.iter().map(|&(x, y)| Coord { x, y }).collect()),
    }
}

pub fn transit_graph(stops: Vec<Stop>, lines: Vec<Line>, config: &Config) -> TransitGraph {
    let index = StopIndex::new(&stops).unwrap();
    TransitGraph::build(NetworkTables { stops, lines }, &index, config).unwrap()
}

pub fn planner(stops: Vec<Stop>, lines: Vec<Line>, streets: StreetGraph) -> Planner {
    let config = Config::default();
    let index = StopIndex::new(&stops).unwrap();
    let graph = TransitGraph::build(NetworkTables { stops, lines }, &index, &config).unwrap();
    Planner::new(graph, index, streets, config)
}

pub fn ride_lines(itinerary: &Itinerary) -> Vec<String> {
    itinerary.lines_used()
}

pub fn rides(itinerary: &Itinerary) -> Vec<&RideSegment> {
    itinerary
        .segments
        .iter()
        .filter_map(|segment| match segment {
            Segment::Ride(ride) => Some(ride),
            Segment::Walk(_) => None,
        })
        .collect()
}
