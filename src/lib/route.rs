use super::error::{PlannerError, Result};
use super::geo::{leg_distances, GeoPoint};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum RouteEntry {
    Waypoint {
        position: GeoPoint,
    },
    PolygonGroup {
        perimeter: Vec<GeoPoint>,
        expanded: bool,
    },
}

impl RouteEntry {
    pub fn point_count(&self) -> usize {
        match self {
            RouteEntry::Waypoint { .. } => 1,
            RouteEntry::PolygonGroup { perimeter, .. } => perimeter.len(),
        }
    }

    /// The point other geometry attaches to: the waypoint itself, or the
    /// first vertex of a polygon perimeter.
    pub fn anchor(&self) -> GeoPoint {
        match self {
            RouteEntry::Waypoint { position } => *position,
            RouteEntry::PolygonGroup { perimeter, .. } => perimeter[0],
        }
    }

    pub fn last_point(&self) -> GeoPoint {
        match self {
            RouteEntry::Waypoint { position } => *position,
            RouteEntry::PolygonGroup { perimeter, .. } => perimeter[perimeter.len() - 1],
        }
    }

    fn points(&self) -> &[GeoPoint] {
        match self {
            RouteEntry::Waypoint { position } => std::slice::from_ref(position),
            RouteEntry::PolygonGroup { perimeter, .. } => perimeter.as_slice(),
        }
    }
}

/// Auxiliary segment joining the route to a polygon's start vertex. Drawn on
/// the map but never part of the entry sequence.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Connector {
    pub from: GeoPoint,
    pub to: GeoPoint,
}

/// An ordered mission with its distance table.
///
/// `distances[i]` is the leg from flattened point `i` to `i + 1`. The table is
/// built together with the entries, so a `Route` can only be swapped as a
/// whole; the expansion flag of polygon groups is the only thing that may
/// change in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Route {
    entries: Vec<RouteEntry>,
    distances: Vec<f64>,
    connectors: Vec<Connector>,
}

impl Route {
    pub fn empty() -> Self {
        Route::default()
    }

    pub fn from_waypoints(points: &[GeoPoint]) -> Self {
        let entries = points
            .iter()
            .map(|&position| RouteEntry::Waypoint { position })
            .collect();
        let distances = leg_distances(points);
        Route {
            entries,
            distances,
            connectors: vec![],
        }
    }

    pub(crate) fn from_parts(
        entries: Vec<RouteEntry>,
        distances: Vec<f64>,
        connectors: Vec<Connector>,
    ) -> Self {
        let route = Route {
            entries,
            distances,
            connectors,
        };
        debug_assert_eq!(
            route.distances.len(),
            route.flattened_point_count().saturating_sub(1)
        );
        route
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn entry_at(&self, index: usize) -> Option<&RouteEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn distance_table(&self) -> &[f64] {
        &self.distances
    }

    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    pub fn flattened_point_count(&self) -> usize {
        self.entries.iter().map(RouteEntry::point_count).sum()
    }

    /// Flattened index of the first point of an entry.
    pub fn flat_offset(&self, entry_index: usize) -> usize {
        self.entries
            .iter()
            .take(entry_index)
            .map(RouteEntry::point_count)
            .sum()
    }

    pub fn flatten(&self) -> Vec<GeoPoint> {
        self.entries
            .iter()
            .flat_map(|entry| entry.points().iter().copied())
            .collect()
    }

    pub fn total_distance(&self) -> f64 {
        self.distances.iter().sum()
    }

    pub fn set_expanded(&mut self, entry_index: usize, value: bool) -> Result<()> {
        match self.entries.get_mut(entry_index) {
            Some(RouteEntry::PolygonGroup { expanded, .. }) => {
                *expanded = value;
                Ok(())
            }
            Some(RouteEntry::Waypoint { .. }) => Ok(()),
            None => Err(PlannerError::MissingEntry {
                index: entry_index,
                entries: self.entries.len(),
            }),
        }
    }

    pub fn toggle_expanded(&mut self, entry_index: usize) -> Result<()> {
        let expanded = match self.entries.get(entry_index) {
            Some(RouteEntry::PolygonGroup { expanded, .. }) => *expanded,
            Some(RouteEntry::Waypoint { .. }) => return Ok(()),
            None => {
                return Err(PlannerError::MissingEntry {
                    index: entry_index,
                    entries: self.entries.len(),
                })
            }
        };
        self.set_expanded(entry_index, !expanded)
    }
}
