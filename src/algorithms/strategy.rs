use derive_more::Display;
use ordered_float::OrderedFloat;
use thiserror::Error;

use crate::search::Value;

/// How the frontier ranks nodes. Lower values are expanded first.
#[derive(Copy, Clone, Debug, Display, Default, PartialEq, Eq, Hash)]
pub enum Strategy {
    #[display("breadth-first")]
    #[default]
    BreadthFirst,
    /// Iterative deepening.
    #[display("depth-first")]
    DepthFirst,
    #[display("uniform-cost")]
    UniformCost,
    #[display("greedy")]
    Greedy,
    #[display("a-star")]
    AStar,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::BreadthFirst,
        Strategy::DepthFirst,
        Strategy::UniformCost,
        Strategy::Greedy,
        Strategy::AStar,
    ];

    /// Ranks a node from its depth, path cost and heuristic estimate.
    ///
    /// ```
    /// use ordered_float::OrderedFloat;
    ///
    /// use maze_search::algorithms::strategy::Strategy;
    ///
    /// assert_eq!(Strategy::BreadthFirst.value(3, 7.0, 2.0), OrderedFloat(3.0));
    /// assert_eq!(Strategy::DepthFirst.value(3, 7.0, 2.0), OrderedFloat(-3.0));
    /// assert_eq!(Strategy::UniformCost.value(3, 7.0, 2.0), OrderedFloat(7.0));
    /// assert_eq!(Strategy::Greedy.value(3, 7.0, 2.0), OrderedFloat(2.0));
    /// assert_eq!(Strategy::AStar.value(3, 7.0, 2.0), OrderedFloat(9.0));
    /// ```
    #[inline(always)]
    pub fn value(self, depth: usize, cost: f64, heuristic: f64) -> Value {
        OrderedFloat(match self {
            Strategy::BreadthFirst => depth as f64,
            Strategy::DepthFirst => -(depth as f64),
            Strategy::UniformCost => cost,
            Strategy::Greedy => heuristic,
            Strategy::AStar => cost + heuristic,
        })
    }

    /// Whether the search runs as a sequence of depth-bounded passes.
    pub fn is_iterative(self) -> bool {
        self == Strategy::DepthFirst
    }

    /// Whether the heuristic affects the ranking.
    pub fn is_informed(self) -> bool {
        matches!(self, Strategy::Greedy | Strategy::AStar)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown strategy '{0}', expected one of breadth-first, depth-first, uniform-cost, greedy, a-star")]
pub struct StrategyParseError(String);

impl std::str::FromStr for Strategy {
    type Err = StrategyParseError;

    /// Accepts the kebab-case names and the short upper-case ones
    /// (`BREADTH`, `DEPTH`, `UNIFORM`, `GREEDY`, `A`), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breadth-first" | "breadth" | "bfs" => Ok(Strategy::BreadthFirst),
            "depth-first" | "depth" | "dfs" => Ok(Strategy::DepthFirst),
            "uniform-cost" | "uniform" | "ucs" => Ok(Strategy::UniformCost),
            "greedy" => Ok(Strategy::Greedy),
            "a-star" | "astar" | "a*" | "a" | "'a" => Ok(Strategy::AStar),
            _ => Err(StrategyParseError(s.to_string())),
        }
    }
}
