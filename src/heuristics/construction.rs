use crate::error::{Result, TourError};
use crate::matrix::DistanceMatrix;
use crate::solution::Solution;
use ordered_float::OrderedFloat;

pub trait ConstructionHeuristic {
    fn construct(&self, matrix: &DistanceMatrix) -> Result<Solution>;
    fn name(&self) -> &str;
}

/// Nearest Neighbor Heuristic
///
/// Builds an open route by repeatedly moving to the closest unvisited place.
/// Equidistant candidates are resolved in favour of the lowest index.
pub struct NearestNeighbor {
    pub start: usize,
}

impl NearestNeighbor {
    pub fn new(start: usize) -> Self {
        NearestNeighbor { start }
    }

    /// Build a greedy route over every index of `matrix`, starting at `start`.
    ///
    /// An empty matrix yields an empty route.
    pub fn build(matrix: &DistanceMatrix, start: usize) -> Result<Vec<usize>> {
        let n = matrix.len();
        if n == 0 {
            return Ok(Vec::new());
        }
        if start >= n {
            return Err(TourError::InvalidIndex { index: start, len: n });
        }

        let mut visited = vec![false; n];
        visited[start] = true;
        let mut route = Vec::with_capacity(n);
        route.push(start);

        let mut current = start;
        while let Some(next) = Self::find_nearest(matrix, current, &visited) {
            route.push(next);
            visited[next] = true;
            current = next;
        }

        Ok(route)
    }

    fn find_nearest(matrix: &DistanceMatrix, current: usize, visited: &[bool]) -> Option<usize> {
        let row = matrix.row(current);
        (0..row.len())
            .filter(|&n| !visited[n])
            .min_by_key(|&n| (OrderedFloat(row[n]), n))
    }
}

impl ConstructionHeuristic for NearestNeighbor {
    fn construct(&self, matrix: &DistanceMatrix) -> Result<Solution> {
        let start = std::time::Instant::now();

        let route = Self::build(matrix, self.start)?;

        let mut solution = Solution::from_route(matrix, route, self.name());
        solution.computation_time = start.elapsed().as_secs_f64();
        Ok(solution)
    }

    fn name(&self) -> &str {
        "NearestNeighbor"
    }
}
