//! Pairwise distance table and route evaluation.

use crate::geo::haversine_distance;
use crate::instance::Place;

/// Symmetric N×N table of great-circle distances in kilometers.
///
/// Built once from a list of places and read-only afterwards. Lookups use
/// plain slice indexing: an out-of-range index is a caller bug and panics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceMatrix {
    data: Vec<Vec<f64>>,
}

impl DistanceMatrix {
    /// Compute the matrix, evaluating each unordered pair once and mirroring it.
    pub fn build(places: &[Place]) -> Self {
        let n = places.len();
        let mut data = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in i + 1..n {
                let d = haversine_distance(places[i].lat, places[i].lon, places[j].lat, places[j].lon);
                data[i][j] = d;
                data[j][i] = d;
            }
        }

        DistanceMatrix { data }
    }

    /// Wrap an explicit table. Used for synthetic instances in tests.
    pub fn from_rows(data: Vec<Vec<f64>>) -> Self {
        debug_assert!(data.iter().all(|row| row.len() == data.len()));
        DistanceMatrix { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Distance between places `i` and `j`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.data[i][j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i]
    }

    /// Sum of consecutive leg lengths. Routes of length 0 or 1 have length 0.
    ///
    /// No closing leg is added: a closed route carries its return explicitly.
    pub fn route_length(&self, route: &[usize]) -> f64 {
        route
            .windows(2)
            .map(|leg| self.distance(leg[0], leg[1]))
            .sum()
    }
}

/// Length of `route` under `matrix`.
pub fn route_length(route: &[usize], matrix: &DistanceMatrix) -> f64 {
    matrix.route_length(route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;

    fn random_places(n: usize, seed: u64) -> Vec<Place> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..n)
            .map(|i| Place::new(format!("P{}", i), rng.gen_range(-60.0..60.0), rng.gen_range(-170.0..170.0)))
            .collect()
    }

    #[test]
    fn test_matrix_is_symmetric_with_zero_diagonal() {
        let places = random_places(25, 3);
        let matrix = DistanceMatrix::build(&places);

        assert_eq!(matrix.len(), 25);
        for i in 0..matrix.len() {
            assert_eq!(matrix.distance(i, i), 0.0);
            for j in 0..matrix.len() {
                assert_eq!(matrix.distance(i, j), matrix.distance(j, i));
                assert!(matrix.distance(i, j) >= 0.0);
            }
        }
    }

    #[test]
    fn test_matrix_matches_haversine() {
        let places = random_places(5, 11);
        let matrix = DistanceMatrix::build(&places);
        let expected = haversine_distance(places[1].lat, places[1].lon, places[4].lat, places[4].lon);
        assert_eq!(matrix.distance(1, 4), expected);
    }

    #[test]
    fn test_empty_matrix() {
        let matrix = DistanceMatrix::build(&[]);
        assert!(matrix.is_empty());
        assert_eq!(matrix.route_length(&[]), 0.0);
        assert_eq!(matrix, DistanceMatrix::default());
    }

    #[test]
    fn test_route_length() {
        let matrix = DistanceMatrix::from_rows(vec![
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 4.0],
            vec![2.0, 4.0, 0.0],
        ]);

        assert_eq!(matrix.route_length(&[]), 0.0);
        assert_eq!(matrix.route_length(&[2]), 0.0);
        assert_eq!(matrix.route_length(&[0, 1, 2]), 5.0);
        assert_eq!(route_length(&[0, 1, 2, 0], &matrix), 7.0);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_lookup_panics() {
        let matrix = DistanceMatrix::from_rows(vec![vec![0.0]]);
        matrix.route_length(&[0, 3]);
    }
}
