//! Spatial index over stop positions. Answers the two queries the planner
//! and the graph builder need: the single nearest stop to a point, and the
//! exact set of stops within a radius. Also resolves the *boarding set* for
//! a query origin: the candidate stops a traveller could walk to first.

use geo::{Distance, Euclidean, Point};
use rstar::primitives::GeomWithData;
use rstar::RTree;

use crate::config::Config;
use crate::model::Stop;
use crate::Error;

type IndexedStop = GeomWithData<Point, String>;

/// R-tree over stop geometries, built once at startup and read-only after.
#[derive(Debug, Clone)]
pub struct StopIndex {
    tree: RTree<IndexedStop>,
}

impl StopIndex {
    /// Bulk-load the index from the stops table.
    pub fn new(stops: &[Stop]) -> Result<Self, Error> {
        if stops.is_empty() {
            return Err(Error::EmptyIndex);
        }
        let entries = stops
            .iter()
            .map(|stop| IndexedStop::new(stop.geometry, stop.stop_id.clone()))
            .collect();
        Ok(StopIndex {
            tree: RTree::bulk_load(entries),
        })
    }

    /// The stop closest to `point` and its distance in meters. Ties are
    /// broken by lexicographically smaller `stop_id`.
    pub fn nearest(&self, point: Point) -> Result<(String, f64), Error> {
        let mut candidates = self.tree.nearest_neighbor_iter_with_distance_2(&point);
        let (first, best_d2) = candidates.next().ok_or(Error::EmptyIndex)?;

        let mut best = first;
        for (candidate, d2) in candidates {
            if d2 > best_d2 {
                break;
            }
            if candidate.data < best.data {
                best = candidate;
            }
        }
        Ok((best.data.clone(), best_d2.sqrt()))
    }

    /// All stops within `radius` meters of `point`, with their distances,
    /// sorted by distance then `stop_id`. The index candidates are
    /// post-filtered with a true Euclidean check.
    #[must_use]
    pub fn within(&self, point: Point, radius: f64) -> Vec<(String, f64)> {
        let mut found: Vec<(String, f64)> = self
            .tree
            .locate_within_distance(point, radius * radius)
            .map(|stop| (stop.data.clone(), Euclidean::distance(point, *stop.geom())))
            .filter(|(_, distance)| *distance <= radius)
            .collect();
        found.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .expect("stop distances are finite")
                .then_with(|| a.0.cmp(&b.0))
        });
        found
    }

    /// Candidate stops for boarding near `origin`: the nearest stop plus
    /// every stop within the walking threshold, each paired with its walk
    /// duration in whole seconds. When nothing lies within the threshold the
    /// set degrades to the single nearest stop.
    pub fn boarding_set(&self, origin: Point, config: &Config) -> Result<Vec<(String, u32)>, Error> {
        let (nearest_id, nearest_distance) = self.nearest(origin)?;
        let mut candidates = self.within(origin, config.max_walk_distance());
        if !candidates.iter().any(|(id, _)| *id == nearest_id) {
            candidates.push((nearest_id, nearest_distance));
        }
        Ok(candidates
            .into_iter()
            .map(|(id, distance)| {
                let seconds = (distance / config.walk_speed_transfer).round() as u32;
                (id, seconds)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(id: &str, x: f64, y: f64) -> Stop {
        Stop {
            stop_id: id.to_string(),
            name: id.to_string(),
            geometry: Point::new(x, y),
        }
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(matches!(StopIndex::new(&[]), Err(Error::EmptyIndex)));
    }

    #[test]
    fn nearest_returns_closest_stop() {
        let index =
            StopIndex::new(&[stop("A", 0.0, 0.0), stop("B", 100.0, 0.0), stop("C", 0.0, 500.0)])
                .unwrap();
        let (id, distance) = index.nearest(Point::new(90.0, 0.0)).unwrap();
        assert_eq!(id, "B");
        assert!(approx::abs_diff_eq!(distance, 10.0, epsilon = 1e-9));
    }

    #[test]
    fn nearest_tie_breaks_on_stop_id() {
        let index = StopIndex::new(&[stop("B", 10.0, 0.0), stop("A", -10.0, 0.0)]).unwrap();
        let (id, _) = index.nearest(Point::new(0.0, 0.0)).unwrap();
        assert_eq!(id, "A");
    }

    #[test]
    fn within_is_exact_and_sorted() {
        let index = StopIndex::new(&[
            stop("far", 1000.0, 0.0),
            stop("mid", 300.0, 0.0),
            stop("near", 100.0, 0.0),
        ])
        .unwrap();
        let found = index.within(Point::new(0.0, 0.0), 400.0);
        let ids: Vec<&str> = found.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["near", "mid"]);
    }

    #[test]
    fn boarding_set_falls_back_to_nearest_stop() {
        let config = Config::default();
        let index = StopIndex::new(&[stop("A", 5000.0, 0.0), stop("B", 9000.0, 0.0)]).unwrap();
        let set = index.boarding_set(Point::new(0.0, 0.0), &config).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].0, "A");
        assert_eq!(set[0].1, (5000.0 / config.walk_speed_transfer).round() as u32);
    }

    #[test]
    fn boarding_set_collects_all_stops_in_threshold() {
        let config = Config::default();
        let index = StopIndex::new(&[
            stop("A", 50.0, 0.0),
            stop("B", 200.0, 0.0),
            stop("C", 2000.0, 0.0),
        ])
        .unwrap();
        let set = index.boarding_set(Point::new(0.0, 0.0), &config).unwrap();
        let ids: Vec<&str> = set.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["A", "B"]);
    }
}
