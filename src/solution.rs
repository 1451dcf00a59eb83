//! Route representation and reporting.
//!
//! A route is a sequence of place indices. An open route visits every place
//! once; a closed route repeats its start at the end. Every improvement stage
//! produces a fresh `Solution` so earlier stages stay inspectable.

use crate::instance::Place;
use crate::matrix::DistanceMatrix;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A route together with its evaluated length
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// Visiting order as place indices
    pub route: Vec<usize>,
    /// Total route length in kilometers
    pub distance: f64,
    /// Whether the route returns to its start
    pub closed: bool,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Number of iterations (if applicable)
    pub iterations: Option<usize>,
}

impl Solution {
    /// Create a solution from a route, evaluating its length.
    pub fn from_route(matrix: &DistanceMatrix, route: Vec<usize>, algorithm: &str) -> Self {
        let distance = matrix.route_length(&route);
        let closed = is_closed_route(&route);

        Solution {
            route,
            distance,
            closed,
            algorithm: algorithm.to_string(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    pub fn len(&self) -> usize {
        self.route.len()
    }

    pub fn is_empty(&self) -> bool {
        self.route.is_empty()
    }

    /// Ordered `(order, name)` stops, 1-based.
    pub fn itinerary<'a>(&self, places: &'a [Place]) -> Vec<Stop<'a>> {
        self.route
            .iter()
            .enumerate()
            .map(|(i, &idx)| Stop {
                order: i + 1,
                name: &places[idx].name,
            })
            .collect()
    }

    /// True when both routes hold the same multiset of indices.
    pub fn is_permutation_of(&self, other: &[usize]) -> bool {
        same_multiset(&self.route, other)
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Distance: {:.2} km", self.distance)?;
        writeln!(f, "  Closed: {}", self.closed)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        if let Some(iter) = self.iterations {
            writeln!(f, "  Iterations: {}", iter)?;
        }
        writeln!(f, "  Route: {:?}", self.route)
    }
}

/// One line of the reported itinerary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stop<'a> {
    pub order: usize,
    pub name: &'a str,
}

/// A route is closed when it has at least two entries and ends where it starts.
pub fn is_closed_route(route: &[usize]) -> bool {
    route.len() >= 2 && route.first() == route.last()
}

/// Append the start index so the route returns to its origin.
pub fn close_route(mut route: Vec<usize>) -> Vec<usize> {
    if let Some(&start) = route.first() {
        route.push(start);
    }
    route
}

pub(crate) fn same_multiset(a: &[usize], b: &[usize]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut counts: HashMap<usize, isize> = HashMap::new();
    for &x in a {
        *counts.entry(x).or_insert(0) += 1;
    }
    for &x in b {
        *counts.entry(x).or_insert(0) -= 1;
    }
    counts.values().all(|&c| c == 0)
}
