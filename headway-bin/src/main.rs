use std::time::Instant;

use geo::{Coord, LineString, Point};
use headway_core::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let config = Config::default();
    let tables = demo_network();

    let instant = Instant::now();
    let index = StopIndex::new(&tables.stops)?;
    let graph = TransitGraph::build(tables, &index, &config)?;
    let streets = demo_streets()?;
    let planner = Planner::new(graph, index, streets, config);
    println!("Network build time: {:?}", instant.elapsed());

    // a block south-west of the first stop, to a corner past the last one
    let origin = Point::new(-150.0, -80.0);
    let destination = Point::new(3080.0, 200.0);

    let instant = Instant::now();
    let alternatives = planner.plan(origin, destination)?;
    println!("Planning time: {:?}", instant.elapsed());

    if alternatives.is_empty() {
        println!("No itinerary found");
        return Ok(());
    }

    for (rank, (itinerary, total)) in alternatives.iter().enumerate() {
        println!("Option {}: ~{} min", rank + 1, total.div_ceil(60));
        for segment in &itinerary.segments {
            match segment {
                Segment::Walk(walk) => println!(
                    "  walk  {} -> {} ({} s)",
                    walk.from_name, walk.to_name, walk.duration
                ),
                Segment::Ride(ride) => println!(
                    "  {:>5} {} -> {} ({} s riding, every ~{} s)",
                    ride.short_name,
                    ride.stop_names.first().map_or("?", String::as_str),
                    ride.stop_names.last().map_or("?", String::as_str),
                    ride.duration,
                    ride.headway
                ),
            }
        }
    }

    println!("{}", alternatives[0].0.to_geojson());

    Ok(())
}

/// Two transit lines joined by a short walk, plus a slower direct bus, so
/// the planner has a real alternative to offer.
fn demo_network() -> NetworkTables {
    let stops = vec![
        stop("A", "Plaza Mayor", 0.0, 0.0),
        stop("B", "Mercado", 1000.0, 0.0),
        stop("X", "Estacion Norte", 2000.0, 0.0),
        stop("Y", "Estacion Sur", 2000.0, 150.0),
        stop("F", "Universidad", 3000.0, 150.0),
        stop("G", "Periferico", 1500.0, 900.0),
    ];
    let lines = vec![
        Line {
            line_id: "T1".to_string(),
            stop_ids: ids(&["A", "B", "X"]),
            hop_seconds: vec![120, 120],
            headway: 180,
            short_name: "T1".to_string(),
            long_name: "Tren Ligero 1".to_string(),
            headsign: "Estacion Norte".to_string(),
            mode: ModeClass::Tram,
            color: "#7b1fa2".to_string(),
            geometry: polyline(&[(0.0, 0.0), (1000.0, 0.0), (2000.0, 0.0)]),
        },
        Line {
            line_id: "C2".to_string(),
            stop_ids: ids(&["Y", "F"]),
            hop_seconds: vec![100],
            headway: 240,
            short_name: "C2".to_string(),
            long_name: "Corredor 2".to_string(),
            headsign: "Universidad".to_string(),
            mode: ModeClass::Brt,
            color: "#1565c0".to_string(),
            geometry: polyline(&[(2000.0, 150.0), (3000.0, 150.0)]),
        },
        Line {
            line_id: "B7".to_string(),
            stop_ids: ids(&["A", "G", "F"]),
            hop_seconds: vec![300, 300],
            headway: 600,
            short_name: "B7".to_string(),
            long_name: "Ruta 7".to_string(),
            headsign: "Universidad".to_string(),
            mode: ModeClass::Bus,
            color: "#2e7d32".to_string(),
            geometry: polyline(&[(0.0, 0.0), (1500.0, 900.0), (3000.0, 150.0)]),
        },
    ];
    NetworkTables { stops, lines }
}

/// A few sidewalk segments around the transfer corner.
fn demo_streets() -> Result<StreetGraph, Error> {
    StreetGraph::from_parts(
        vec![
            Point::new(0.0, 0.0),
            Point::new(2000.0, 0.0),
            Point::new(2000.0, 150.0),
            Point::new(3000.0, 150.0),
        ],
        vec![(0, 1, 2000.0), (1, 2, 150.0), (2, 3, 1000.0)],
    )
}

fn stop(id: &str, name: &str, x: f64, y: f64) -> Stop {
    Stop {
        stop_id: id.to_string(),
        name: name.to_string(),
        geometry: Point::new(x, y),
    }
}

fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(ToString::to_string).collect()
}

fn polyline(coords: &[(f64, f64)]) -> LineString {
    LineString::new(coords.iter().map(|&(x, y)| Coord { x, y }).collect())
}
