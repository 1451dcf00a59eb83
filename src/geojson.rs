//! GeoJSON export of a planned route.
//!
//! The collection holds one `LineString` through every stop in route order,
//! followed by one `Point` per stop carrying `name` and 1-based `order`.
//! Coordinates are `[lon, lat]`.

use crate::error::Result;
use crate::instance::Place;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    LineString { coordinates: Vec<[f64; 2]> },
    Point { coordinates: [f64; 2] },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub properties: Map<String, Value>,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

/// Build the feature collection for `route` over `places`.
pub fn route_to_geojson(places: &[Place], route: &[usize]) -> FeatureCollection {
    let position = |idx: usize| [places[idx].lon, places[idx].lat];

    let mut features = Vec::with_capacity(route.len() + 1);
    features.push(Feature {
        properties: Map::new(),
        geometry: Geometry::LineString {
            coordinates: route.iter().map(|&idx| position(idx)).collect(),
        },
    });

    for (i, &idx) in route.iter().enumerate() {
        let mut properties = Map::new();
        properties.insert("name".to_string(), Value::from(places[idx].name.as_str()));
        properties.insert("order".to_string(), Value::from(i + 1));
        features.push(Feature {
            properties,
            geometry: Geometry::Point {
                coordinates: position(idx),
            },
        });
    }

    FeatureCollection { features }
}

/// Write `collection` as indented JSON.
pub fn write_geojson<P: AsRef<Path>>(path: P, collection: &FeatureCollection) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, collection)?;
    writer.flush()?;
    Ok(())
}
