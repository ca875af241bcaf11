use super::error::{PlannerError, Result};
use super::geo::GeoPoint;
use super::insertion::{insert_polygon, InsertionRequest};
use super::route::Route;
use super::session::{
    DrawKind, DrawMode, DrawSession, FinishedDraw, LiveUpdate, SessionObserver,
};
use super::view::{polygon_preview_rows, rows, MissionRow};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlannerConfig {
    /// Stage finished polygons until the operator imports or discards them,
    /// instead of splicing them into the route right away.
    pub confirm_polygon_import: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingImport {
    pub request: InsertionRequest,
    pub perimeter: Vec<GeoPoint>,
}

/// Operator-facing entry point: owns the route, the sketch in progress and a
/// polygon waiting for confirmation.
///
/// Every mutation either swaps in a complete new `Route` or leaves the old
/// one in place, so readers never observe a half-built mission.
pub struct MissionPlanner {
    config: PlannerConfig,
    route: Route,
    session: DrawSession,
    pending: Option<PendingImport>,
}

impl Default for MissionPlanner {
    fn default() -> Self {
        MissionPlanner::new(PlannerConfig::default())
    }
}

impl MissionPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        MissionPlanner {
            config,
            route: Route::empty(),
            session: DrawSession::new(),
            pending: None,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn distance_table(&self) -> &[f64] {
        self.route.distance_table()
    }

    pub fn rows(&self) -> Vec<MissionRow> {
        rows(&self.route)
    }

    /// Rows of the polygon being sketched, or of the one awaiting import.
    pub fn polygon_rows(&self) -> Vec<MissionRow> {
        match &self.pending {
            Some(pending) => polygon_preview_rows(&pending.perimeter),
            None if self.session.request().is_some() => {
                polygon_preview_rows(self.session.live_vertices())
            }
            None => vec![],
        }
    }

    pub fn session(&self) -> &DrawSession {
        &self.session
    }

    pub fn pending_import(&self) -> Option<&PendingImport> {
        self.pending.as_ref()
    }

    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver>) {
        self.session.subscribe(observer);
    }

    /// Starts a new sketch, dropping any sketch in progress. The route is
    /// only replaced once the new sketch is finished.
    pub fn start_draw(&mut self, kind: DrawKind) {
        self.pending = None;
        self.session.start(kind);
    }

    pub fn start_line(&mut self) {
        self.start_draw(DrawKind::Line)
    }

    pub fn start_polygon(&mut self, request: InsertionRequest) {
        self.start_draw(DrawKind::Polygon(request))
    }

    /// The line being sketched, as the route it would become on finish.
    pub fn line_preview(&self) -> Option<Route> {
        match self.session.mode() {
            DrawMode::Line => Some(Route::from_waypoints(self.session.live_vertices())),
            _ => None,
        }
    }

    pub fn add_vertex(&mut self, point: GeoPoint) -> Result<LiveUpdate> {
        self.session.add_vertex(point)
    }

    pub fn move_vertex(&mut self, index: usize, point: GeoPoint) -> Result<LiveUpdate> {
        self.session.move_vertex(index, point)
    }

    pub fn update_vertices(&mut self, points: Vec<GeoPoint>) -> Result<LiveUpdate> {
        self.session.update_vertices(points)
    }

    pub fn finish_draw(&mut self) -> Result<()> {
        match self.session.finish()? {
            FinishedDraw::Line(vertices) => {
                self.route = Route::from_waypoints(&vertices);
                info!(
                    waypoints = self.route.len(),
                    total = self.route.total_distance(),
                    "route finished"
                );
                Ok(())
            }
            FinishedDraw::Polygon { request, perimeter } => {
                if self.config.confirm_polygon_import {
                    debug!(?request, vertices = perimeter.len(), "polygon staged");
                    self.pending = Some(PendingImport { request, perimeter });
                    Ok(())
                } else {
                    self.insert_polygon(&request, &perimeter)
                }
            }
        }
    }

    pub fn cancel_draw(&mut self) -> Result<()> {
        self.session.cancel()
    }

    pub fn insert_polygon(
        &mut self,
        request: &InsertionRequest,
        perimeter: &[GeoPoint],
    ) -> Result<()> {
        let route = insert_polygon(&self.route, request, perimeter)?;
        self.route = route;
        info!(
            entries = self.route.len(),
            points = self.route.flattened_point_count(),
            total = self.route.total_distance(),
            "polygon imported"
        );
        Ok(())
    }

    /// Splices the staged polygon into the route. The staged polygon is
    /// consumed even when the insertion is rejected.
    pub fn import_polygon(&mut self) -> Result<()> {
        let pending = self.pending.take().ok_or(PlannerError::NoPendingImport)?;
        self.insert_polygon(&pending.request, &pending.perimeter)
    }

    pub fn discard_polygon(&mut self) -> Result<()> {
        self.pending.take().ok_or(PlannerError::NoPendingImport)?;
        debug!("staged polygon discarded");
        Ok(())
    }

    pub fn toggle_expanded(&mut self, entry_index: usize) -> Result<()> {
        self.route.toggle_expanded(entry_index)
    }
}
