/*!
Presentation-ready itineraries: an ordered list of mode-homogeneous
segments, each a walk or a ride on one line. Ride segments carry the line's
display metadata so an itinerary renders without the network tables in hand.
*/

use geo::{LineString, Point};
use geojson::{Feature, FeatureCollection, Geometry, Value};
use itertools::Itertools;
use serde_json::map::Map;

use crate::model::ModeClass;

/// A contiguous ride on one line.
#[derive(Debug, Clone, PartialEq)]
pub struct RideSegment {
    pub line_id: String,
    pub short_name: String,
    pub long_name: String,
    pub headsign: String,
    pub mode: ModeClass,
    /// Presentation color as `#rrggbb`.
    pub color: String,
    /// Traversed stops in travel order; a contiguous run of the line's
    /// stop sequence.
    pub stop_ids: Vec<String>,
    pub stop_names: Vec<String>,
    /// Scheduled seconds per hop; `None` when the authoritative line table
    /// could not confirm the hop.
    pub hop_seconds: Vec<Option<u32>>,
    /// Total ride time in seconds.
    pub duration: u32,
    /// Median headway of the traversed edges in seconds.
    pub headway: u32,
    /// Line polyline trimmed to the traversed portion.
    pub geometry: LineString,
}

/// A walk between two positions.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkSegment {
    pub from: Point,
    pub to: Point,
    pub from_name: String,
    pub to_name: String,
    pub duration: u32,
    pub geometry: LineString,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Ride(RideSegment),
    Walk(WalkSegment),
}

impl Segment {
    #[must_use]
    pub fn duration(&self) -> u32 {
        match self {
            Segment::Ride(ride) => ride.duration,
            Segment::Walk(walk) => walk.duration,
        }
    }

    /// Expected wait before this segment; zero for walks.
    #[must_use]
    pub fn headway(&self) -> u32 {
        match self {
            Segment::Ride(ride) => ride.headway,
            Segment::Walk(_) => 0,
        }
    }

    #[must_use]
    pub fn geometry(&self) -> &LineString {
        match self {
            Segment::Ride(ride) => &ride.geometry,
            Segment::Walk(walk) => &walk.geometry,
        }
    }
}

/// One journey option, segments in travel order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Itinerary {
    pub segments: Vec<Segment>,
}

impl Itinerary {
    /// Sum of segment durations in seconds, waits excluded.
    #[must_use]
    pub fn duration(&self) -> u32 {
        self.segments.iter().map(Segment::duration).sum()
    }

    /// Estimated door-to-door seconds: travel plus the mean wait at every
    /// boarding.
    #[must_use]
    pub fn total_time(&self) -> u32 {
        self.duration() + self.segments.iter().map(Segment::headway).sum::<u32>()
    }

    /// Transit lines in travel order, first occurrence only.
    #[must_use]
    pub fn lines_used(&self) -> Vec<String> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Ride(ride) => Some(ride.line_id.clone()),
                Segment::Walk(_) => None,
            })
            .unique()
            .collect()
    }

    /// Whole journey as one polyline, de-duplicating junction points.
    #[must_use]
    pub fn combined_geometry(&self) -> LineString {
        let mut combined = Vec::new();

        for segment in &self.segments {
            let geometry = segment.geometry();
            match (combined.last(), geometry.0.first()) {
                // Skip duplicate point at segment boundary
                (Some(last), Some(first)) if last == first => {
                    combined.extend(geometry.0.iter().skip(1));
                }
                _ => combined.extend_from_slice(&geometry.0),
            }
        }

        LineString::new(combined)
    }

    /// The itinerary as a `FeatureCollection` with one feature per segment.
    #[must_use]
    pub fn to_geojson(&self) -> geojson::GeoJson {
        let mut features = vec![];

        for segment in &self.segments {
            let mut properties = Map::new();
            match segment {
                Segment::Ride(ride) => {
                    properties.insert("mode".to_string(), "ride".into());
                    properties.insert("line_id".to_string(), ride.line_id.clone().into());
                    properties.insert("short_name".to_string(), ride.short_name.clone().into());
                    properties.insert("long_name".to_string(), ride.long_name.clone().into());
                    properties.insert("headsign".to_string(), ride.headsign.clone().into());
                    properties.insert("mode_class".to_string(), (ride.mode as u8).into());
                    properties.insert("color".to_string(), ride.color.clone().into());
                    properties.insert("duration".to_string(), ride.duration.into());
                    properties.insert("headway".to_string(), ride.headway.into());
                    properties.insert("stops".to_string(), ride.stop_ids.clone().into());
                    properties.insert("stop_names".to_string(), ride.stop_names.clone().into());
                }
                Segment::Walk(walk) => {
                    properties.insert("mode".to_string(), "walk".into());
                    properties.insert("from_name".to_string(), walk.from_name.clone().into());
                    properties.insert("to_name".to_string(), walk.to_name.clone().into());
                    properties.insert("duration".to_string(), walk.duration.into());
                }
            }

            features.push(Feature {
                geometry: Some(geometry_to_geojson(segment.geometry())),
                properties: Some(properties),
                id: None,
                bbox: None,
                foreign_members: None,
            });
        }

        geojson::GeoJson::FeatureCollection(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }
}

fn geometry_to_geojson(geometry: &LineString<f64>) -> Geometry {
    let coords: Vec<Vec<f64>> = geometry
        .coords()
        .map(|coord| vec![coord.x, coord.y])
        .collect();

    Geometry::new(Value::LineString(coords))
}
