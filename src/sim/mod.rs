//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only, injected by the caller or owned by the race
//! - Simulation time passed in, never read from a clock
//! - No rendering, audio or storage dependencies

pub mod autopilot;
pub mod boat;
pub mod course;
pub mod courier;
pub mod physics;
pub mod race;
pub mod wind;

pub use boat::{BoatSnapshot, BoatState, ControlInput, cargo_mass, weight_penalty};
pub use course::{Course, CourseDef, CourseEvent, PointDef, StartLine, StartLineDef, StartPos, Waypoint};
pub use courier::{
    CargoId, CargoItem, CourierEvent, CourierState, DeliveryJobBoard, DockReport, HOME_ISLAND_ID,
    Island, generate_islands,
};
pub use physics::{
    PointOfSail, calculate_boat_speed, calculate_heel_angle, heel_speed_multiplier, point_of_sail,
};
pub use race::{RaceEvent, RaceHud, RacePhase, RaceState, tick};
pub use wind::{WindModel, WindSnapshot};
