use super::geo::{bearing, midpoint, GeoPoint};
use super::geojson::{Entity, Geometry};
use super::route::{Route, RouteEntry};
use super::view::rows;
use itertools::Itertools;
use serde_json::to_string;
use std::collections::BTreeMap;
use std::error::Error;
use std::io::Write;

const STROKE: &str = "#3b82f6";
const SOLID: &str = "none";
const DASHED: &str = "6 4";

pub trait Output {
    fn write_geojson(&self, writer: &mut dyn Write) -> Result<(), Box<dyn Error>>;
    fn write_json_lines(&self, writer: &mut dyn Write) -> Result<(), Box<dyn Error>>;
    fn write_table(&self, writer: &mut dyn Write) -> Result<(), Box<dyn Error>>;
}

fn properties(pairs: &[(&str, String)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

fn coordinates(points: &[GeoPoint]) -> Vec<(f64, f64)> {
    points.iter().map(|&point| point.into()).collect()
}

fn line_feature(role: &str, dash: &str, points: &[GeoPoint]) -> Entity {
    Entity::Feature {
        geometry: Geometry::LineString {
            coordinates: coordinates(points),
        },
        properties: properties(&[
            ("role", role.into()),
            ("stroke", STROKE.into()),
            ("stroke-dasharray", dash.into()),
        ]),
    }
}

fn point_feature(point: GeoPoint, props: BTreeMap<String, String>) -> Entity {
    Entity::Feature {
        geometry: Geometry::Point {
            coordinates: point.into(),
        },
        properties: props,
    }
}

fn direction_markers(points: &[GeoPoint]) -> Vec<Entity> {
    points
        .iter()
        .tuple_windows()
        .map(|(&a, &b)| {
            let props = properties(&[
                ("role", "direction".into()),
                ("rotation", format!("{:.4}", bearing(a, b))),
            ]);
            point_feature(midpoint(a, b), props)
        })
        .collect()
}

/// Geometry-add requests for the map: solid lines along consecutive
/// waypoints with a direction marker per leg, dashed polygon outlines and
/// dashed connectors.
pub fn features(route: &Route) -> Vec<Entity> {
    let mut features = vec![];

    let runs = route
        .entries()
        .iter()
        .group_by(|entry| matches!(entry, RouteEntry::Waypoint { .. }));
    for (is_waypoint, run) in &runs {
        if !is_waypoint {
            continue;
        }
        let points: Vec<GeoPoint> = run.map(RouteEntry::anchor).collect();
        if points.len() >= 2 {
            features.push(line_feature("route", SOLID, &points));
            features.extend(direction_markers(&points));
        }
    }

    let flat_offsets = route
        .entries()
        .iter()
        .scan(0, |offset, entry| {
            let current = *offset;
            *offset += entry.point_count();
            Some(current)
        })
        .collect::<Vec<_>>();
    for (index, entry) in route.entries().iter().enumerate() {
        let label = format!("{:02}", index);
        match entry {
            RouteEntry::Waypoint { position } => {
                let props = properties(&[
                    ("role", "waypoint".into()),
                    ("label", label),
                    ("index", flat_offsets[index].to_string()),
                ]);
                features.push(point_feature(*position, props));
            }
            RouteEntry::PolygonGroup { perimeter, .. } => {
                let mut ring = coordinates(perimeter);
                ring.push(perimeter[0].into());
                features.push(Entity::Feature {
                    geometry: Geometry::Polygon {
                        coordinates: vec![ring],
                    },
                    properties: properties(&[
                        ("role", "polygon".into()),
                        ("label", label),
                        ("stroke", STROKE.into()),
                        ("stroke-dasharray", DASHED.into()),
                    ]),
                });
            }
        }
    }

    for connector in route.connectors() {
        features.push(line_feature(
            "connector",
            DASHED,
            &[connector.from, connector.to],
        ));
    }

    features
}

impl Output for Route {
    fn write_geojson(&self, writer: &mut dyn Write) -> Result<(), Box<dyn Error>> {
        let feature_collection = Entity::FeatureCollection {
            features: features(self),
        };
        let string = to_string(&feature_collection)?;
        writeln!(writer, "{}", string)?;
        Ok(())
    }

    fn write_json_lines(&self, writer: &mut dyn Write) -> Result<(), Box<dyn Error>> {
        for row in rows(self) {
            let json = to_string(&row)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    fn write_table(&self, writer: &mut dyn Write) -> Result<(), Box<dyn Error>> {
        for row in rows(self) {
            writeln!(writer, "{}", row)?;
        }
        writeln!(writer, "total {:.1}", self.total_distance())?;
        Ok(())
    }
}

#[cfg(test)]
mod features {
    use super::*;
    use crate::insertion::{insert_polygon, InsertionRequest};

    fn role_count(features: &[Entity], role: &str) -> usize {
        features
            .iter()
            .filter(|feature| match feature {
                Entity::Feature { properties, .. } => {
                    properties.get("role").map(String::as_str) == Some(role)
                }
                _ => false,
            })
            .count()
    }

    fn route() -> Route {
        let route = Route::from_waypoints(&[
            GeoPoint::new(0., 0.),
            GeoPoint::new(1., 0.),
            GeoPoint::new(2., 0.),
        ]);
        let polygon = vec![
            GeoPoint::new(1., 1.),
            GeoPoint::new(2., 1.),
            GeoPoint::new(2., 2.),
        ];
        insert_polygon(&route, &InsertionRequest::after(0), &polygon).unwrap()
    }

    #[test]
    fn plain_route() {
        let route = Route::from_waypoints(&[
            GeoPoint::new(0., 0.),
            GeoPoint::new(1., 0.),
            GeoPoint::new(1., 1.),
        ]);
        let features = features(&route);
        assert_eq!(role_count(&features, "route"), 1);
        assert_eq!(role_count(&features, "direction"), 2);
        assert_eq!(role_count(&features, "waypoint"), 3);
        assert_eq!(role_count(&features, "polygon"), 0);
    }

    #[test]
    fn route_with_polygon() {
        let features = features(&route());
        // [A] polygon [B, C]: only the second run forms a line
        assert_eq!(role_count(&features, "route"), 1);
        assert_eq!(role_count(&features, "direction"), 1);
        assert_eq!(role_count(&features, "polygon"), 1);
        assert_eq!(role_count(&features, "connector"), 2);
    }

    #[test]
    fn polygon_ring_is_closed() {
        let features = features(&route());
        let ring = features
            .iter()
            .find_map(|feature| match feature {
                Entity::Feature {
                    geometry: Geometry::Polygon { coordinates },
                    ..
                } => Some(coordinates[0].clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn table_output() {
        let mut out = Vec::new();
        route().write_table(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.trim().split('\n').collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("00"));
        assert!(lines[1].contains("[+]"));
        assert!(lines[4].starts_with("total"));
    }
}
