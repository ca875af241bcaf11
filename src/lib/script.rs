use super::error::PlannerError;
use super::geo::GeoPoint;
use super::insertion::{InsertionRequest, Side};
use super::planner::MissionPlanner;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::io::BufRead;
use tracing::{debug, warn};

/// A recorded operator or map event.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    StartLine,
    StartPolygon { target: usize, side: Side },
    Vertex { lon: f64, lat: f64 },
    MoveVertex { index: usize, lon: f64, lat: f64 },
    Finish,
    Cancel,
    Import,
    Discard,
    Toggle { entry: usize },
}

/// Parse a script of JSON lines into events
///
/// Every non-empty line holds one event object tagged by its `event` field.
/// Lines starting with `#` are comments.
///
/// # Example
///
/// ```
/// use mission_planner::script::{parse, Event};
///
/// let script = r#"
/// {"event": "start_line"}
/// {"event": "vertex", "lon": 12.9, "lat": 12.9}
/// {"event": "vertex", "lon": 13.1, "lat": 12.8}
/// {"event": "finish"}
/// "#;
/// let events = parse(script.as_bytes()).unwrap();
/// assert_eq!(events.len(), 4);
/// assert_eq!(events[0], Event::StartLine);
/// ```
pub fn parse(reader: impl BufRead) -> Result<Vec<Event>, Box<dyn Error>> {
    let mut events = vec![];
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        events.push(serde_json::from_str(line)?);
    }
    Ok(events)
}

pub fn apply(planner: &mut MissionPlanner, event: &Event) -> Result<(), PlannerError> {
    match *event {
        Event::StartLine => planner.start_line(),
        Event::StartPolygon { target, side } => planner.start_polygon(InsertionRequest {
            target_index: target,
            side,
        }),
        Event::Vertex { lon, lat } => {
            planner.add_vertex(GeoPoint::new(lon, lat))?;
        }
        Event::MoveVertex { index, lon, lat } => {
            planner.move_vertex(index, GeoPoint::new(lon, lat))?;
        }
        Event::Finish => planner.finish_draw()?,
        Event::Cancel => planner.cancel_draw()?,
        Event::Import => planner.import_polygon()?,
        Event::Discard => planner.discard_polygon()?,
        Event::Toggle { entry } => planner.toggle_expanded(entry)?,
    }
    Ok(())
}

/// Applies events in order. Rejected events are logged and skipped, the
/// planner keeps whatever state it had before them. Returns the number of
/// rejected events.
pub fn replay(planner: &mut MissionPlanner, events: &[Event]) -> usize {
    let mut rejected = 0;
    for (index, event) in events.iter().enumerate() {
        debug!(?event, "applying event");
        if let Err(err) = apply(planner, event) {
            warn!(index, "event rejected: {}", err);
            rejected += 1;
        }
    }
    rejected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_events() {
        let script = r#"{"event":"start_polygon","target":1,"side":"after"}
            {"event":"move_vertex","index":0,"lon":1.5,"lat":2.5}

            # comment
            {"event":"toggle","entry":2}"#;
        let events = parse(script.as_bytes()).unwrap();
        assert_eq!(
            events,
            vec![
                Event::StartPolygon {
                    target: 1,
                    side: Side::After
                },
                Event::MoveVertex {
                    index: 0,
                    lon: 1.5,
                    lat: 2.5
                },
                Event::Toggle { entry: 2 },
            ]
        );
    }

    #[test]
    fn parse_rejects_unknown_event() {
        assert!(parse(r#"{"event":"teleport"}"#.as_bytes()).is_err());
    }

    #[test]
    fn replay_skips_rejected_events() {
        let events = vec![
            Event::Finish,
            Event::StartLine,
            Event::Vertex { lon: 0., lat: 0. },
            Event::Vertex { lon: 1., lat: 0. },
            Event::Finish,
            Event::StartPolygon {
                target: 0,
                side: Side::After,
            },
            Event::Vertex { lon: 0., lat: 1. },
            Event::Finish,
        ];
        let mut planner = MissionPlanner::default();
        let rejected = replay(&mut planner, &events);
        // finish without a session, then a two vertex polygon
        assert_eq!(rejected, 2);
        assert_eq!(planner.route().len(), 2);
    }
}
