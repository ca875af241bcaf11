use super::error::{PlannerError, Result};
use super::geo::{distance, leg_distances, GeoPoint};
use super::route::{Connector, Route, RouteEntry};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MIN_POLYGON_VERTICES: usize = 3;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Before,
    After,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertionRequest {
    pub target_index: usize,
    pub side: Side,
}

impl InsertionRequest {
    pub fn before(target_index: usize) -> Self {
        InsertionRequest {
            target_index,
            side: Side::Before,
        }
    }

    pub fn after(target_index: usize) -> Self {
        InsertionRequest {
            target_index,
            side: Side::After,
        }
    }
}

fn validate(route: &Route, request: &InsertionRequest, perimeter: &[GeoPoint]) -> Result<()> {
    if perimeter.len() < MIN_POLYGON_VERTICES {
        return Err(PlannerError::InvalidGeometry {
            vertices: perimeter.len(),
        });
    }
    if request.target_index >= route.len() {
        return Err(PlannerError::StaleInsertionRequest {
            target_index: request.target_index,
            entries: route.len(),
        });
    }
    Ok(())
}

fn get_connectors(route: &Route, request: &InsertionRequest, start: GeoPoint) -> Vec<Connector> {
    let target = request.target_index;
    let anchor = |index: usize| route.entries()[index].anchor();
    match request.side {
        Side::Before if target == 0 => vec![Connector {
            from: start,
            to: anchor(0),
        }],
        Side::Before => vec![
            Connector {
                from: anchor(target - 1),
                to: start,
            },
            Connector {
                from: anchor(target),
                to: start,
            },
        ],
        Side::After => {
            let mut connectors = vec![Connector {
                from: anchor(target),
                to: start,
            }];
            if target + 1 < route.len() {
                connectors.push(Connector {
                    from: start,
                    to: anchor(target + 1),
                });
            }
            connectors
        }
    }
}

/// Splices a polygon detour into `route` and returns the resulting route.
///
/// The polygon becomes a collapsed `PolygonGroup` directly before or after the
/// targeted entry. Legs entirely before or after the splice are copied from
/// the old distance table, the legs into and out of the polygon are computed
/// fresh, and the polygon's own perimeter legs are appended in between.
///
/// The input route is never modified: on error the caller keeps the route it
/// already has, on success it swaps in the returned one.
///
/// # Example
///
/// ```
/// use mission_planner::geo::GeoPoint;
/// use mission_planner::insertion::{insert_polygon, InsertionRequest};
/// use mission_planner::route::Route;
///
/// let route = Route::from_waypoints(&[GeoPoint::new(0., 0.), GeoPoint::new(1., 0.)]);
/// let polygon = vec![
///     GeoPoint::new(0., 1.),
///     GeoPoint::new(1., 1.),
///     GeoPoint::new(1., 2.),
/// ];
/// let route = insert_polygon(&route, &InsertionRequest::after(0), &polygon).unwrap();
/// assert_eq!(route.flattened_point_count(), 5);
/// assert_eq!(route.distance_table().len(), 4);
/// assert_eq!(route.connectors().len(), 2);
/// ```
pub fn insert_polygon(
    route: &Route,
    request: &InsertionRequest,
    perimeter: &[GeoPoint],
) -> Result<Route> {
    if let Err(err) = validate(route, request, perimeter) {
        debug!(?request, vertices = perimeter.len(), "rejected polygon insertion: {}", err);
        return Err(err);
    }

    let insert_at = match request.side {
        Side::Before => request.target_index,
        Side::After => request.target_index + 1,
    };
    let start = perimeter[0];
    let end = perimeter[perimeter.len() - 1];

    let mut entries = route.entries().to_vec();
    entries.insert(
        insert_at,
        RouteEntry::PolygonGroup {
            perimeter: perimeter.to_vec(),
            expanded: false,
        },
    );

    let mut connectors = route.connectors().to_vec();
    connectors.extend(get_connectors(route, request, start));

    // flattened index of the first point after the splice, in the old route
    let split = route.flat_offset(insert_at);
    let old = route.distance_table();
    let mut distances = Vec::with_capacity(old.len() + perimeter.len() + 1);
    if split > 0 {
        let previous = route.entries()[insert_at - 1].last_point();
        distances.extend_from_slice(&old[..split - 1]);
        distances.push(distance(previous, start));
    }
    distances.extend(leg_distances(perimeter));
    if let Some(next) = route.entry_at(insert_at) {
        distances.push(distance(end, next.anchor()));
        distances.extend(old.iter().skip(split));
    }

    debug!(
        insert_at,
        vertices = perimeter.len(),
        legs = distances.len(),
        "spliced polygon into route"
    );
    Ok(Route::from_parts(entries, distances, connectors))
}
