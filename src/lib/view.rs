use super::geo::{leg_distances, GeoPoint};
use super::route::{Route, RouteEntry};
use serde::Serialize;
use std::fmt;

const NO_DISTANCE: &str = "--";

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowKind {
    Waypoint,
    PolygonGroup { expanded: bool, vertices: usize },
    PolygonVertex,
}

/// One line of the mission table. `distance` is the leg arriving at
/// `position`, `None` where there is no predecessor.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MissionRow {
    pub entry: usize,
    pub label: String,
    #[serde(flatten)]
    pub kind: RowKind,
    pub position: GeoPoint,
    pub distance: Option<f64>,
}

pub fn format_distance(distance: Option<f64>) -> String {
    match distance {
        Some(distance) => format!("{:.1}", distance),
        None => NO_DISTANCE.to_string(),
    }
}

impl fmt::Display for MissionRow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let marker = match self.kind {
            RowKind::Waypoint => "   ",
            RowKind::PolygonGroup { expanded: true, .. } => "[-]",
            RowKind::PolygonGroup { expanded: false, .. } => "[+]",
            RowKind::PolygonVertex => "  .",
        };
        write!(
            f,
            "{:<5} {} {:.6}, {:.6} {:>8}",
            self.label,
            marker,
            self.position.lon.abs(),
            self.position.lat.abs(),
            format_distance(self.distance)
        )
    }
}

fn leg_before(table: &[f64], flat_index: usize) -> Option<f64> {
    flat_index.checked_sub(1).and_then(|i| table.get(i)).copied()
}

/// Flattens a route into display rows. Collapsed polygon groups take one row,
/// expanded ones are followed by a row per perimeter vertex.
pub fn rows(route: &Route) -> Vec<MissionRow> {
    let table = route.distance_table();
    let mut rows = vec![];
    let mut offset = 0;
    for (entry, route_entry) in route.entries().iter().enumerate() {
        let label = format!("{:02}", entry);
        match route_entry {
            RouteEntry::Waypoint { position } => rows.push(MissionRow {
                entry,
                label,
                kind: RowKind::Waypoint,
                position: *position,
                distance: leg_before(table, offset),
            }),
            RouteEntry::PolygonGroup {
                perimeter,
                expanded,
            } => {
                rows.push(MissionRow {
                    entry,
                    label: label.clone(),
                    kind: RowKind::PolygonGroup {
                        expanded: *expanded,
                        vertices: perimeter.len(),
                    },
                    position: perimeter[0],
                    distance: leg_before(table, offset),
                });
                if *expanded {
                    rows.extend(perimeter.iter().enumerate().map(|(i, &position)| {
                        MissionRow {
                            entry,
                            label: format!("{}.{}", label, i),
                            kind: RowKind::PolygonVertex,
                            position,
                            distance: if i == 0 {
                                None
                            } else {
                                leg_before(table, offset + i)
                            },
                        }
                    }));
                }
            }
        }
        offset += route_entry.point_count();
    }
    rows
}

/// Rows of a polygon that is not part of the route yet. The polygon has no
/// route entry, so every row carries entry 0 and is told apart by its label.
pub fn polygon_preview_rows(vertices: &[GeoPoint]) -> Vec<MissionRow> {
    let distances = leg_distances(vertices);
    vertices
        .iter()
        .enumerate()
        .map(|(i, &position)| MissionRow {
            entry: 0,
            label: format!("{:02}", i),
            kind: RowKind::PolygonVertex,
            position,
            distance: leg_before(&distances, i),
        })
        .collect()
}
