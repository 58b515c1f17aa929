//! Course definition and waypoint state machine
//!
//! A course is RACING until the last waypoint is rounded, then FINISHED for
//! good. `current_index` only ever moves forward, one waypoint at a time.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Course data as authored (external schema, camelCase keys)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDef {
    #[serde(default)]
    pub name: String,
    pub waypoints: Vec<PointDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_line: Option<StartLineDef>,
    pub start_pos: StartPos,
    /// Star thresholds (ms, inclusive)
    pub gold_time: f64,
    pub silver_time: f64,
    pub bronze_time: f64,
    /// Total stars needed before this course opens
    #[serde(default)]
    pub unlock_stars: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointDef {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartLineDef {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartPos {
    pub x: f32,
    pub y: f32,
    pub heading: f32,
}

impl StartPos {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// A mark to round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub position: Vec2,
    pub radius: f32,
    pub completed: bool,
}

impl Waypoint {
    pub fn new(position: Vec2, radius: f32) -> Self {
        Self {
            position,
            radius,
            completed: false,
        }
    }

    /// Inside the capture circle (boundary counts)
    pub fn contains(&self, point: Vec2) -> bool {
        !self.completed && self.position.distance(point) <= self.radius
    }
}

/// Start line with the pre-start side fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartLine {
    pub p1: Vec2,
    pub p2: Vec2,
    /// Sign of the cross product for points on the pre-start side
    prestart_side: f32,
}

impl StartLine {
    /// `prestart` is any point behind the line (the start position)
    pub fn new(p1: Vec2, p2: Vec2, prestart: Vec2) -> Self {
        let side = Self::side_of(p1, p2, prestart);
        Self {
            p1,
            p2,
            // Start position sitting on the line: treat the far side of a
            // north-facing line (smaller y) as the course side
            prestart_side: if side == 0.0 { 1.0 } else { side.signum() },
        }
    }

    fn side_of(p1: Vec2, p2: Vec2, point: Vec2) -> f32 {
        (p2 - p1).perp_dot(point - p1)
    }

    /// True when the point is strictly across the line from the pre-start side
    pub fn is_course_side(&self, point: Vec2) -> bool {
        if (self.p2 - self.p1).length_squared() <= f32::EPSILON {
            return false;
        }
        let side = Self::side_of(self.p1, self.p2, point);
        side != 0.0 && side.signum() != self.prestart_side
    }
}

/// Notifications from a course update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseEvent {
    /// `index` waypoints of `total` have now been rounded
    WaypointPassed { index: usize, total: usize },
    /// Last waypoint rounded
    Finished,
}

/// Live course state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    waypoints: Vec<Waypoint>,
    current_index: usize,
    start_line: Option<StartLine>,
    finished: bool,
}

impl Course {
    pub fn new(waypoints: Vec<Waypoint>, start_line: Option<StartLine>) -> Self {
        // An empty course has nothing to round
        let finished = waypoints.is_empty();
        Self {
            waypoints,
            current_index: 0,
            start_line,
            finished,
        }
    }

    /// Build from an authored definition using a uniform waypoint radius
    pub fn from_def(def: &CourseDef, waypoint_radius: f32) -> Self {
        let waypoints = def
            .waypoints
            .iter()
            .map(|p| Waypoint::new(Vec2::new(p.x, p.y), waypoint_radius))
            .collect();
        let start_line = def.start_line.map(|l| {
            StartLine::new(
                Vec2::new(l.x1, l.y1),
                Vec2::new(l.x2, l.y2),
                def.start_pos.position(),
            )
        });
        Self::new(waypoints, start_line)
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn start_line(&self) -> Option<&StartLine> {
        self.start_line.as_ref()
    }

    /// Waypoint the boat is sailing for, if any
    pub fn current_target(&self) -> Option<&Waypoint> {
        if self.finished {
            return None;
        }
        self.waypoints.get(self.current_index)
    }

    /// Check the boat against the active waypoint
    pub fn update(&mut self, boat_position: Vec2) -> Vec<CourseEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }

        let total = self.waypoints.len();
        let Some(active) = self.waypoints.get_mut(self.current_index) else {
            return events;
        };
        if !active.contains(boat_position) {
            return events;
        }

        active.completed = true;
        self.current_index += 1;
        events.push(CourseEvent::WaypointPassed {
            index: self.current_index,
            total,
        });

        if self.current_index >= total {
            self.finished = true;
            events.push(CourseEvent::Finished);
        }
        events
    }

    /// On-course-side check against the start line
    pub fn check_ocs(&self, boat_position: Vec2) -> bool {
        self.start_line
            .map(|line| line.is_course_side(boat_position))
            .unwrap_or(false)
    }
}
