use serde::{Deserialize, Serialize};

/// Planner configuration. All speeds are in meters per second, all durations
/// in whole seconds. Defaults match the reference deployment: 5 km/h for
/// walking transfers, 3 km/h for off-graph stubs, a 300 s transfer walking
/// threshold and up to 3 alternatives per query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Walking speed used for inter-stop transfer edges and boarding walks.
    pub walk_speed_transfer: f64,
    /// Walking speed used off the pedestrian graph (end stubs, fallbacks).
    pub walk_speed_slow: f64,
    /// Upper bound on walk-transfer duration in seconds.
    pub max_walk_seconds: u32,
    /// Maximum number of alternative itineraries per query.
    pub max_alternatives: usize,
    /// Lower-bound estimator used by the path search.
    pub heuristic: HeuristicKind,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            walk_speed_transfer: 5.0 / 3.6,
            walk_speed_slow: 3.0 / 3.6,
            max_walk_seconds: 300,
            max_alternatives: 3,
            heuristic: HeuristicKind::default(),
        }
    }
}

impl Config {
    /// Largest distance in meters a walking transfer may cover.
    #[must_use]
    pub fn max_walk_distance(&self) -> f64 {
        f64::from(self.max_walk_seconds) * self.walk_speed_transfer
    }
}

/// Which admissible heuristic the search uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeuristicKind {
    /// Straight-line distance over the network-wide top speed (55 km/h).
    #[default]
    Euclidean,
    /// Always zero; reduces the search to plain Dijkstra.
    Zero,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_walk_threshold_is_five_minutes_at_transfer_speed() {
        let config = Config::default();
        assert!(approx::abs_diff_eq!(
            config.max_walk_distance(),
            300.0 * 5.0 / 3.6,
            epsilon = 1e-9
        ));
    }

    #[test]
    fn config_roundtrips_through_json() {
        let config = Config {
            max_alternatives: 5,
            heuristic: HeuristicKind::Zero,
            ..Config::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.max_alternatives, 5);
        assert_eq!(back.heuristic, HeuristicKind::Zero);
    }

    #[test]
    fn heuristic_kind_serializes_lowercase() {
        let json = serde_json::to_string(&HeuristicKind::Euclidean).unwrap();
        assert_eq!(json, "\"euclidean\"");
    }
}
