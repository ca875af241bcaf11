use geo::prelude::*;
use geo_types::{Coordinate, Point};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Converts haversine meters into the kilometers shown in mission tables.
pub const DISTANCE_SCALE: f64 = 1. / 1000.;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        GeoPoint { lon, lat }
    }

    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from(coordinates: (f64, f64)) -> Self {
        GeoPoint {
            lon: coordinates.0,
            lat: coordinates.1,
        }
    }
}

impl From<&(f64, f64)> for GeoPoint {
    fn from(coordinates: &(f64, f64)) -> Self {
        (*coordinates).into()
    }
}

impl From<GeoPoint> for (f64, f64) {
    fn from(point: GeoPoint) -> Self {
        (point.lon, point.lat)
    }
}

impl From<GeoPoint> for [f64; 2] {
    fn from(point: GeoPoint) -> Self {
        [point.lon, point.lat]
    }
}

impl From<Point<f64>> for GeoPoint {
    fn from(point: Point<f64>) -> Self {
        GeoPoint {
            lon: point.x(),
            lat: point.y(),
        }
    }
}

impl From<Coordinate<f64>> for GeoPoint {
    fn from(coordinate: Coordinate<f64>) -> Self {
        GeoPoint {
            lon: coordinate.x,
            lat: coordinate.y,
        }
    }
}

/// Great-circle length between two points in route planning units.
///
/// Every distance in a mission (live sketch, finished line, recomputed
/// insertion legs) goes through this function so totals stay consistent.
///
/// # Example
///
/// ```
/// use mission_planner::geo::{distance, GeoPoint};
///
/// let a = GeoPoint::new(12.97, 12.97);
/// assert_eq!(distance(a, a), 0.);
/// ```
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    a.to_point().haversine_distance(&b.to_point()) * DISTANCE_SCALE
}

/// Pairwise leg lengths of a polyline, one fewer than the number of points.
pub fn leg_distances(points: &[GeoPoint]) -> Vec<f64> {
    points
        .iter()
        .tuple_windows()
        .map(|(&a, &b)| distance(a, b))
        .collect()
}

pub fn midpoint(a: GeoPoint, b: GeoPoint) -> GeoPoint {
    GeoPoint {
        lon: a.lon + (b.lon - a.lon) / 2.,
        lat: a.lat + (b.lat - a.lat) / 2.,
    }
}

/// Rotation of a direction marker placed on the segment a -> b. Zero points
/// north, angles grow clockwise.
pub fn bearing(a: GeoPoint, b: GeoPoint) -> f64 {
    let dx = b.lon - a.lon;
    let dy = b.lat - a.lat;
    -dy.atan2(dx) + FRAC_PI_2
}
