/*!
Query orchestration. A `Planner` owns the immutable network (transit graph,
stop index, street graph) plus the configuration, and answers point-to-point
queries with up to `max_alternatives` itineraries. Alternatives come from
re-running the search while forbidding one line used by each previous
answer, which forces structurally different routes. Everything it holds is
read-only after construction, so one planner serves concurrent queries.
*/

use geo::Point;
use hashbrown::HashSet;
use tracing::debug;

use crate::algo::heuristic::Heuristic;
use crate::algo::search::{search, PathNode, PathStep, SearchOptions, SearchOrigin};
use crate::config::Config;
use crate::connectors::StopIndex;
use crate::graph::{LineTag, TransitGraph};
use crate::itinerary::Itinerary;
use crate::segmenter::Segmenter;
use crate::streets::StreetGraph;
use crate::Error;

pub struct Planner {
    graph: TransitGraph,
    index: StopIndex,
    streets: StreetGraph,
    config: Config,
    heuristic: Box<dyn Heuristic>,
}

impl Planner {
    #[must_use]
    pub fn new(graph: TransitGraph, index: StopIndex, streets: StreetGraph, config: Config) -> Self {
        let heuristic = config.heuristic.build();
        Planner {
            graph,
            index,
            streets,
            config,
            heuristic,
        }
    }

    #[must_use]
    pub fn graph(&self) -> &TransitGraph {
        &self.graph
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Plan up to `max_alternatives` journeys from `origin` to
    /// `destination` (both in the metric projection), sorted by ascending
    /// estimated door-to-door time. Empty when the destination's stop is
    /// unreachable from every boarding candidate.
    pub fn plan(&self, origin: Point, destination: Point) -> Result<Vec<(Itinerary, u32)>, Error> {
        let boarding = self.index.boarding_set(origin, &self.config)?;
        let (drop_off, _) = self.index.nearest(destination)?;
        debug!(
            candidates = boarding.len(),
            drop_off = drop_off.as_str(),
            "resolved query anchors"
        );

        let segmenter = Segmenter::new(&self.graph, &self.streets, &self.config);
        let mut forbidden: HashSet<String> = HashSet::new();
        let mut results = Vec::new();

        for round in 0..self.config.max_alternatives {
            let options = SearchOptions {
                forbidden_lines: Some(&forbidden),
                ..SearchOptions::default()
            };
            let outcome = search(
                &self.graph,
                SearchOrigin::Virtual(&boarding),
                &drop_off,
                self.heuristic.as_ref(),
                &options,
            )?;
            let Some((mut raw, cost)) = outcome else {
                break;
            };
            // the final walk from the drop-off stop to the true destination
            raw.push(PathStep {
                node: PathNode::Destination,
                line: LineTag::Walk,
            });

            let itinerary = segmenter.itinerary(&raw, origin, destination);
            let total = itinerary.total_time();
            debug!(round, cost, total, "alternative found");

            let fresh = itinerary
                .lines_used()
                .into_iter()
                .find(|line| !forbidden.contains(line));
            results.push((itinerary, total));
            match fresh {
                Some(line) => {
                    forbidden.insert(line);
                }
                // nothing left to forbid, further rounds would repeat
                None => break,
            }
        }

        results.sort_by_key(|(_, total)| *total);
        Ok(results)
    }

    /// Raw search between two stops, exposed for testing and diagnostics.
    pub fn plan_stop_to_stop(
        &self,
        source: &str,
        destination: &str,
    ) -> Result<Option<(Vec<PathStep>, u32)>, Error> {
        search(
            &self.graph,
            SearchOrigin::Stop(source),
            destination,
            self.heuristic.as_ref(),
            &SearchOptions::default(),
        )
    }
}
