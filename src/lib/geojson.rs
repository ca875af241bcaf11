use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: (f64, f64),
    },
    LineString {
        coordinates: Vec<(f64, f64)>,
    },
    Polygon {
        coordinates: Vec<Vec<(f64, f64)>>,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum Entity {
    Feature {
        properties: BTreeMap<String, String>,
        geometry: Geometry,
    },
    FeatureCollection {
        features: Vec<Entity>,
    },
}
