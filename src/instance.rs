//! Module for loading and representing a set of places to tour.
//!
//! Places come from a comma-separated file of `name,lat,lon` rows with an
//! optional header. Rows with unusable coordinates are skipped with a warning;
//! only an entirely empty result is fatal.

use crate::error::{Result, TourError};
use crate::matrix::DistanceMatrix;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// A named geographic point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Display label (not required to be unique)
    pub name: String,
    /// Latitude in degrees, [-90, 90]
    pub lat: f64,
    /// Longitude in degrees, [-180, 180]
    pub lon: f64,
}

impl Place {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Place { name: name.into(), lat, lon }
    }
}

/// An ordered set of places together with its distance matrix.
///
/// Indices into `places` are the identity used by every routing component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourInstance {
    /// Name of the instance (file stem when loaded from disk)
    pub name: String,
    /// Places in file order
    pub places: Vec<Place>,
    /// Precomputed haversine distances
    #[serde(skip)]
    pub distance_matrix: DistanceMatrix,
}

impl TourInstance {
    pub fn new(name: impl Into<String>, places: Vec<Place>) -> Self {
        let distance_matrix = DistanceMatrix::build(&places);
        TourInstance {
            name: name.into(),
            places,
            distance_matrix,
        }
    }

    /// Load places from a CSV file.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TourError::InputNotFound(path.to_path_buf()),
            _ => TourError::Io(e),
        })?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let places = read_places(file).map_err(|e| match e {
            TourError::InputEmpty(_) => TourError::InputEmpty(path.display().to_string()),
            other => other,
        })?;

        Ok(Self::new(name, places))
    }

    /// Load places from any CSV source.
    pub fn from_reader<R: Read>(name: impl Into<String>, reader: R) -> Result<Self> {
        let name = name.into();
        let places = read_places(reader).map_err(|e| match e {
            TourError::InputEmpty(_) => TourError::InputEmpty(name.clone()),
            other => other,
        })?;
        Ok(Self::new(name, places))
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Get the distance between two places
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.distance_matrix.distance(i, j)
    }

    /// Resolve a starting place by name.
    ///
    /// Case-insensitive exact match first, then the first place whose name
    /// contains `query`.
    pub fn find_start(&self, query: &str) -> Result<usize> {
        let needle = query.to_lowercase();

        if let Some(idx) = self.places.iter().position(|p| p.name.to_lowercase() == needle) {
            return Ok(idx);
        }

        if let Some(idx) = self.places.iter().position(|p| p.name.to_lowercase().contains(&needle)) {
            log::warn!("Using '{}' as it partially matches '{}'", self.places[idx].name, query);
            return Ok(idx);
        }

        Err(TourError::StartNotFound(query.to_string()))
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let n = self.len();
        let mut total = 0.0;
        let mut pairs = 0usize;
        let mut max_distance = 0.0f64;
        for i in 0..n {
            for j in i + 1..n {
                let d = self.distance(i, j);
                total += d;
                pairs += 1;
                max_distance = max_distance.max(d);
            }
        }
        let avg_distance = if pairs > 0 { total / pairs as f64 } else { 0.0 };

        let mut min_lat = f64::INFINITY;
        let mut max_lat = f64::NEG_INFINITY;
        let mut min_lon = f64::INFINITY;
        let mut max_lon = f64::NEG_INFINITY;
        for place in &self.places {
            min_lat = min_lat.min(place.lat);
            max_lat = max_lat.max(place.lat);
            min_lon = min_lon.min(place.lon);
            max_lon = max_lon.max(place.lon);
        }

        InstanceStatistics {
            name: self.name.clone(),
            num_places: n,
            avg_distance,
            max_distance,
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }
}

/// Parse `name,lat,lon` records, skipping a header and malformed rows.
fn read_places<R: Read>(reader: R) -> Result<Vec<Place>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut places = Vec::new();
    let mut first = true;

    for record in reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                log::warn!("Skipping unreadable line {}: {}", line, e);
                continue;
            }
        };
        let is_first = std::mem::replace(&mut first, false);

        if record.len() < 3 {
            log::debug!("Ignoring line {} with {} field(s)", line_of(&record), record.len());
            continue;
        }

        match parse_place(&record) {
            Ok(place) => places.push(place),
            Err(_) if is_first && !has_numeric_coordinates(&record) => {
                log::debug!("Treating first line as header: {:?}", record);
            }
            Err(e) => {
                log::warn!("Skipping invalid line: {}", e);
            }
        }
    }

    if places.is_empty() {
        return Err(TourError::InputEmpty("input".to_string()));
    }

    log::debug!("Parsed {} places", places.len());
    Ok(places)
}

/// A header row carries column titles where the coordinates would be.
fn has_numeric_coordinates(record: &StringRecord) -> bool {
    record[1].parse::<f64>().is_ok() || record[2].parse::<f64>().is_ok()
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

fn parse_place(record: &StringRecord) -> Result<Place> {
    let line = line_of(record);
    let coordinate = |idx: usize, label: &str, bound: f64| -> Result<f64> {
        let raw = &record[idx];
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() && v.abs() <= bound => Ok(v),
            Ok(v) => Err(TourError::malformed_row(line, format!("{} {} out of range", label, v))),
            Err(_) => Err(TourError::malformed_row(line, format!("invalid {} '{}'", label, raw))),
        }
    };

    let lat = coordinate(1, "latitude", 90.0)?;
    let lon = coordinate(2, "longitude", 180.0)?;
    Ok(Place::new(&record[0], lat, lon))
}

/// Statistics about a set of places
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub num_places: usize,
    pub avg_distance: f64,
    pub max_distance: f64,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Places: {}", self.num_places)?;
        writeln!(f, "  Latitude: {:.4} .. {:.4}", self.min_lat, self.max_lat)?;
        writeln!(f, "  Longitude: {:.4} .. {:.4}", self.min_lon, self.max_lon)?;
        writeln!(f, "  Avg distance: {:.2} km", self.avg_distance)?;
        writeln!(f, "  Max distance: {:.2} km", self.max_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARIS: &str = "\
Name,Lat,Lon
Eiffel Tower,48.8584,2.2945
Louvre Museum,48.8606,2.3376
Notre-Dame,48.8530,2.3499
Arc de Triomphe,48.8738,2.2950
";

    #[test]
    fn test_reads_places_and_skips_header() {
        let instance = TourInstance::from_reader("paris", PARIS.as_bytes()).unwrap();

        assert_eq!(instance.len(), 4);
        assert_eq!(instance.places[0], Place::new("Eiffel Tower", 48.8584, 2.2945));
        assert_eq!(instance.places[3].name, "Arc de Triomphe");
        assert_eq!(instance.distance_matrix.len(), 4);
    }

    #[test]
    fn test_headerless_file() {
        let data = "A,1.0,2.0\nB,3.0,4.0\n";
        let instance = TourInstance::from_reader("plain", data.as_bytes()).unwrap();
        assert_eq!(instance.len(), 2);
        assert_eq!(instance.places[0].name, "A");
    }

    #[test]
    fn test_malformed_row_is_skipped() {
        let data = "\
Name,Lat,Lon
A,1.0,2.0
B,not-a-number,4.0
C,5.0,
D,95.0,0.0
short,1.0
E,7.0,8.0
";
        let instance = TourInstance::from_reader("mixed", data.as_bytes()).unwrap();
        let names: Vec<&str> = instance.places.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "E"]);
    }

    #[test]
    fn test_bad_first_data_row_is_not_a_header() {
        let data = "A,95.0,0.0\nB,abc,2.0\nC,3.0,4.0\n";
        let instance = TourInstance::from_reader("plain", data.as_bytes()).unwrap();
        assert_eq!(instance.len(), 1);
        assert_eq!(instance.places[0].name, "C");

        assert!(!has_numeric_coordinates(&StringRecord::from(vec!["Name", "Lat", "Lon"])));
        assert!(has_numeric_coordinates(&StringRecord::from(vec!["A", "95.0", "0.0"])));
        assert!(has_numeric_coordinates(&StringRecord::from(vec!["B", "abc", "2.0"])));
    }

    #[test]
    fn test_extra_columns_and_whitespace() {
        let data = "name,lat,lon,notes\n  Museum , 10.5 , -3.25 , open late\n";
        let instance = TourInstance::from_reader("extra", data.as_bytes()).unwrap();
        assert_eq!(instance.places, vec![Place::new("Museum", 10.5, -3.25)]);
    }

    #[test]
    fn test_empty_input_is_fatal() {
        let err = TourInstance::from_reader("empty", "Name,Lat,Lon\nX,abc,def\n".as_bytes()).unwrap_err();
        assert!(matches!(err, TourError::InputEmpty(ref name) if name == "empty"));

        let err = TourInstance::from_reader("blank", "".as_bytes()).unwrap_err();
        assert!(matches!(err, TourError::InputEmpty(_)));
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("city-tour-definitely-missing.csv");
        let err = TourInstance::from_csv(&path).unwrap_err();
        assert!(matches!(err, TourError::InputNotFound(p) if p == path));
    }

    #[test]
    fn test_from_csv_uses_file_stem() {
        let path = std::env::temp_dir().join(format!("city-tour-{}-paris.csv", std::process::id()));
        std::fs::write(&path, PARIS).unwrap();
        let instance = TourInstance::from_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(instance.name.ends_with("-paris"));
        assert_eq!(instance.len(), 4);
    }

    #[test]
    fn test_find_start() {
        let instance = TourInstance::from_reader("paris", PARIS.as_bytes()).unwrap();

        assert_eq!(instance.find_start("eiffel tower").unwrap(), 0);
        assert_eq!(instance.find_start("NOTRE-DAME").unwrap(), 2);
        assert_eq!(instance.find_start("louvre").unwrap(), 1);
        // "tr" is contained in several names; the first in file order wins
        assert_eq!(instance.find_start("tr").unwrap(), 2);
        assert!(matches!(
            instance.find_start("Sacré-Cœur"),
            Err(TourError::StartNotFound(ref q)) if q == "Sacré-Cœur"
        ));
    }

    #[test]
    fn test_exact_match_beats_substring() {
        let places = vec![
            Place::new("Park Gate", 0.0, 0.0),
            Place::new("Park", 1.0, 1.0),
        ];
        let instance = TourInstance::new("parks", places);
        assert_eq!(instance.find_start("park").unwrap(), 1);
    }

    #[test]
    fn test_statistics() {
        let instance = TourInstance::from_reader("paris", PARIS.as_bytes()).unwrap();
        let stats = instance.statistics();

        assert_eq!(stats.num_places, 4);
        assert!(stats.max_distance >= stats.avg_distance);
        assert_eq!(stats.min_lat, 48.8530);
        assert_eq!(stats.max_lon, 2.3499);
        assert!(stats.to_string().contains("Places: 4"));
    }
}
