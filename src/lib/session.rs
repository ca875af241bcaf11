use super::error::{PlannerError, Result};
use super::geo::{leg_distances, GeoPoint};
use super::insertion::InsertionRequest;
use serde::Serialize;
use std::mem;
use tracing::debug;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DrawMode {
    None,
    Line,
    Polygon,
}

/// What the operator asked to sketch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawKind {
    Line,
    Polygon(InsertionRequest),
}

#[derive(Debug, Clone, PartialEq)]
enum DrawState {
    Idle,
    Sketching {
        vertices: Vec<GeoPoint>,
    },
    SketchingPolygon {
        vertices: Vec<GeoPoint>,
        request: InsertionRequest,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FinishedDraw {
    Line(Vec<GeoPoint>),
    Polygon {
        request: InsertionRequest,
        perimeter: Vec<GeoPoint>,
    },
}

/// Snapshot published after every vertex change.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LiveUpdate {
    pub mode: DrawMode,
    pub vertices: Vec<GeoPoint>,
    pub distances: Vec<f64>,
}

pub trait SessionObserver {
    fn live_update(&mut self, update: &LiveUpdate);
}

/// Tracks the geometry the operator is currently sketching.
///
/// Exactly one sketch can be in progress. Starting a new one drops the old
/// one without committing anything.
pub struct DrawSession {
    state: DrawState,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl Default for DrawSession {
    fn default() -> Self {
        DrawSession::new()
    }
}

impl DrawSession {
    pub fn new() -> Self {
        DrawSession {
            state: DrawState::Idle,
            observers: vec![],
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn mode(&self) -> DrawMode {
        match self.state {
            DrawState::Idle => DrawMode::None,
            DrawState::Sketching { .. } => DrawMode::Line,
            DrawState::SketchingPolygon { .. } => DrawMode::Polygon,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state != DrawState::Idle
    }

    pub fn live_vertices(&self) -> &[GeoPoint] {
        match &self.state {
            DrawState::Idle => &[],
            DrawState::Sketching { vertices } => vertices.as_slice(),
            DrawState::SketchingPolygon { vertices, .. } => vertices.as_slice(),
        }
    }

    pub fn live_distances(&self) -> Vec<f64> {
        leg_distances(self.live_vertices())
    }

    pub fn request(&self) -> Option<&InsertionRequest> {
        match &self.state {
            DrawState::SketchingPolygon { request, .. } => Some(request),
            _ => None,
        }
    }

    pub fn start(&mut self, kind: DrawKind) {
        if self.is_active() {
            debug!(mode = ?self.mode(), "dropping unfinished sketch");
        }
        self.state = match kind {
            DrawKind::Line => DrawState::Sketching { vertices: vec![] },
            DrawKind::Polygon(request) => DrawState::SketchingPolygon {
                vertices: vec![],
                request,
            },
        };
        debug!(mode = ?self.mode(), "draw session started");
    }

    pub fn start_line(&mut self) {
        self.start(DrawKind::Line)
    }

    pub fn start_polygon(&mut self, request: InsertionRequest) {
        self.start(DrawKind::Polygon(request))
    }

    fn vertices_mut(&mut self) -> Result<&mut Vec<GeoPoint>> {
        match &mut self.state {
            DrawState::Idle => Err(PlannerError::NoActiveSession),
            DrawState::Sketching { vertices } => Ok(vertices),
            DrawState::SketchingPolygon { vertices, .. } => Ok(vertices),
        }
    }

    fn publish(&mut self) -> LiveUpdate {
        let update = LiveUpdate {
            mode: self.mode(),
            vertices: self.live_vertices().to_vec(),
            distances: self.live_distances(),
        };
        for observer in self.observers.iter_mut() {
            observer.live_update(&update);
        }
        update
    }

    pub fn add_vertex(&mut self, point: GeoPoint) -> Result<LiveUpdate> {
        self.vertices_mut()?.push(point);
        Ok(self.publish())
    }

    pub fn move_vertex(&mut self, index: usize, point: GeoPoint) -> Result<LiveUpdate> {
        let vertices = self.vertices_mut()?;
        let len = vertices.len();
        let vertex = vertices.get_mut(index).ok_or(PlannerError::MissingVertex {
            index,
            vertices: len,
        })?;
        *vertex = point;
        Ok(self.publish())
    }

    /// Replaces the whole sketch, for map libraries that report the complete
    /// geometry on every change.
    pub fn update_vertices(&mut self, points: Vec<GeoPoint>) -> Result<LiveUpdate> {
        *self.vertices_mut()? = points;
        Ok(self.publish())
    }

    pub fn finish(&mut self) -> Result<FinishedDraw> {
        let finished = match mem::replace(&mut self.state, DrawState::Idle) {
            DrawState::Idle => return Err(PlannerError::NoActiveSession),
            DrawState::Sketching { vertices } => FinishedDraw::Line(vertices),
            DrawState::SketchingPolygon { vertices, request } => FinishedDraw::Polygon {
                request,
                perimeter: vertices,
            },
        };
        debug!("draw session finished");
        Ok(finished)
    }

    pub fn cancel(&mut self) -> Result<()> {
        if let DrawState::Idle = mem::replace(&mut self.state, DrawState::Idle) {
            return Err(PlannerError::NoActiveSession);
        }
        debug!("draw session cancelled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<LiveUpdate>>>);

    impl SessionObserver for Recorder {
        fn live_update(&mut self, update: &LiveUpdate) {
            self.0.borrow_mut().push(update.clone());
        }
    }

    fn p(lon: f64, lat: f64) -> GeoPoint {
        GeoPoint::new(lon, lat)
    }

    #[test]
    fn line_session() {
        let mut session = DrawSession::new();
        assert_eq!(session.mode(), DrawMode::None);

        session.start_line();
        assert!(session.is_active());
        assert_eq!(session.mode(), DrawMode::Line);

        session.add_vertex(p(0., 0.)).unwrap();
        let update = session.add_vertex(p(0., 1.)).unwrap();
        assert_eq!(update.mode, DrawMode::Line);
        assert_eq!(update.vertices.len(), 2);
        assert_eq!(update.distances.len(), 1);

        let finished = session.finish().unwrap();
        assert_eq!(finished, FinishedDraw::Line(vec![p(0., 0.), p(0., 1.)]));
        assert!(!session.is_active());
        assert!(session.live_vertices().is_empty());
    }

    #[test]
    fn polygon_session_keeps_request() {
        let mut session = DrawSession::new();
        let request = InsertionRequest::after(2);
        session.start_polygon(request);
        assert_eq!(session.request(), Some(&request));
        for point in &[p(0., 0.), p(1., 0.), p(1., 1.)] {
            session.add_vertex(*point).unwrap();
        }
        match session.finish().unwrap() {
            FinishedDraw::Polygon { request: r, perimeter } => {
                assert_eq!(r, request);
                assert_eq!(perimeter.len(), 3);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(session.request(), None);
    }

    #[test]
    fn observers_see_every_change() {
        let updates = Rc::new(RefCell::new(vec![]));
        let mut session = DrawSession::new();
        session.subscribe(Box::new(Recorder(updates.clone())));

        session.start_line();
        session.add_vertex(p(0., 0.)).unwrap();
        session.add_vertex(p(0., 1.)).unwrap();
        session.move_vertex(1, p(0., 2.)).unwrap();

        let updates = updates.borrow();
        assert_eq!(updates.len(), 3);
        assert_eq!(updates[2].vertices, vec![p(0., 0.), p(0., 2.)]);
        assert_eq!(updates[2].distances, session.live_distances());
    }

    #[test]
    fn starting_again_drops_the_old_sketch() {
        let mut session = DrawSession::new();
        session.start_polygon(InsertionRequest::before(0));
        session.add_vertex(p(3., 3.)).unwrap();

        session.start_line();

        assert_eq!(session.mode(), DrawMode::Line);
        assert!(session.live_vertices().is_empty());
        assert_eq!(session.request(), None);
    }

    #[test]
    fn update_replaces_sketch() {
        let mut session = DrawSession::new();
        session.start_line();
        session.add_vertex(p(5., 5.)).unwrap();
        let update = session
            .update_vertices(vec![p(0., 0.), p(1., 1.), p(2., 2.)])
            .unwrap();
        assert_eq!(update.vertices.len(), 3);
        assert_eq!(update.distances.len(), 2);
    }

    #[test]
    fn cancel_discards_everything() {
        let mut session = DrawSession::new();
        session.start_polygon(InsertionRequest::after(0));
        session.add_vertex(p(1., 1.)).unwrap();
        session.cancel().unwrap();
        assert_eq!(session.mode(), DrawMode::None);
        assert!(session.live_vertices().is_empty());
        assert_eq!(session.request(), None);
    }

    #[test]
    fn idle_session_rejects_events() {
        let mut session = DrawSession::new();
        assert_eq!(session.finish(), Err(PlannerError::NoActiveSession));
        assert_eq!(session.cancel(), Err(PlannerError::NoActiveSession));
        assert_eq!(
            session.add_vertex(p(0., 0.)),
            Err(PlannerError::NoActiveSession)
        );
    }

    #[test]
    fn moving_missing_vertex() {
        let mut session = DrawSession::new();
        session.start_line();
        session.add_vertex(p(0., 0.)).unwrap();
        assert_eq!(
            session.move_vertex(3, p(1., 1.)),
            Err(PlannerError::MissingVertex {
                index: 3,
                vertices: 1
            })
        );
    }

    #[test]
    fn live_update_json() {
        let mut session = DrawSession::new();
        session.start_line();
        let update = session.add_vertex(GeoPoint::new(1., 2.)).unwrap();
        let json = serde_json::to_string(&update).unwrap();
        assert!(json.starts_with(r#"{"mode":"line","vertices":[{"lon":1.0,"lat":2.0}]"#));
    }
}
