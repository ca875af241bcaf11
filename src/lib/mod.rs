//! Composes maritime missions out of a sketched route and polygon detours.
//!
//! An operator draws a line of waypoints, then picks a waypoint and sketches a
//! polygon to be spliced in before or after it. The [`planner::MissionPlanner`]
//! feeds the sketch through a [`session::DrawSession`], hands finished polygons
//! to [`insertion::insert_polygon`] and swaps in the resulting
//! [`route::Route`], whose distance table always matches its points.

pub use self::error::{PlannerError, Result};
pub use self::geo::{distance, GeoPoint};
pub use self::insertion::{insert_polygon, InsertionRequest, Side};
pub use self::planner::{MissionPlanner, PlannerConfig};
pub use self::route::{Connector, Route, RouteEntry};

pub mod error;
pub mod geo;
pub mod geojson;
pub mod insertion;
pub mod output;
pub mod planner;
pub mod route;
pub mod script;
pub mod session;
pub mod view;
