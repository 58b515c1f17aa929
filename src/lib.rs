//! WindRunner - wind-driven sailing simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (wind, sail physics, boat, course, courier)
//! - `ghost`: Best-run recording and interpolated replay
//! - `progression`: Best times, stars, unlocks and ghost consistency
//! - `persistence`: Key-value store contract and implementations
//! - `session`: Race flow wiring the sim to progression and ghosts
//! - `tuning`: Data-driven game balance

pub mod courses;
pub mod error;
pub mod ghost;
pub mod persistence;
pub mod progression;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{Error, Result};
pub use progression::Progression;
pub use session::RaceSession;
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Fixed simulation tick (60 Hz, one step per rendered frame)
    pub const SIM_TICK_MS: f64 = 1000.0 / 60.0;

    /// Half-angle of the no-go zone around head-to-wind (degrees)
    pub const NO_GO_ZONE_ANGLE: f32 = 45.0;
    /// Hard cap on boat speed (knots)
    pub const MAX_BOAT_SPEED: f32 = 8.0;

    /// Boat-speed efficiency anchors (relative wind angle in degrees, efficiency)
    pub const SPEED_EFFICIENCY_CURVE: [(f32, f32); 4] =
        [(45.0, 0.5), (90.0, 1.0), (135.0, 0.85), (180.0, 0.6)];

    /// Trim deviation (percentage points) at which trim efficiency reaches zero
    pub const TRIM_TOLERANCE: f32 = 50.0;

    /// Maximum heel (degrees)
    pub const MAX_HEEL: f32 = 45.0;
    /// Degrees of heel per knot of captured wind force at full sail exposure
    pub const HEEL_SENSITIVITY: f32 = 4.0;
    /// Fraction of heel shed at full boat speed
    pub const HEEL_SPEED_DAMPING: f32 = 0.3;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if a >= 360.0 { 0.0 } else { a }
}

/// Angle between heading and wind direction, folded to [0, 180]
#[inline]
pub fn relative_wind_angle(heading: f32, wind_angle: f32) -> f32 {
    let diff = (heading - wind_angle).abs() % 360.0;
    if diff > 180.0 { 360.0 - diff } else { diff }
}

/// Unit vector for a compass heading (0 = screen up, clockwise, y grows down)
#[inline]
pub fn heading_to_vec(heading: f32) -> Vec2 {
    // Compass heading to math angle: 0° north is -90° from the +x axis
    let rad = (heading - 90.0).to_radians();
    Vec2::new(rad.cos(), rad.sin())
}

/// Compass bearing (degrees, [0, 360)) from one point to another
#[inline]
pub fn bearing_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    if d.length_squared() <= f32::EPSILON {
        return 0.0;
    }
    normalize_degrees(d.y.atan2(d.x).to_degrees() + 90.0)
}

/// Signed shortest turn from one compass angle to another, in (-180, 180]
#[inline]
pub fn signed_angle_delta(from: f32, to: f32) -> f32 {
    let mut delta = normalize_degrees(to - from);
    if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_wind_angle_folds() {
        assert_eq!(relative_wind_angle(0.0, 0.0), 0.0);
        assert_eq!(relative_wind_angle(90.0, 0.0), 90.0);
        assert_eq!(relative_wind_angle(270.0, 0.0), 90.0);
        assert_eq!(relative_wind_angle(-30.0, 0.0), 30.0);
        assert_eq!(relative_wind_angle(725.0, 0.0), 5.0);
        assert_eq!(relative_wind_angle(180.0, 0.0), 180.0);
    }

    #[test]
    fn test_heading_to_vec() {
        let north = heading_to_vec(0.0);
        assert!(north.x.abs() < 1e-5);
        assert!((north.y + 1.0).abs() < 1e-5);

        let east = heading_to_vec(90.0);
        assert!((east.x - 1.0).abs() < 1e-5);
        assert!(east.y.abs() < 1e-5);
    }

    #[test]
    fn test_bearing_between() {
        let origin = Vec2::new(100.0, 100.0);
        assert!((bearing_between(origin, Vec2::new(100.0, 0.0)) - 0.0).abs() < 1e-3);
        assert!((bearing_between(origin, Vec2::new(200.0, 100.0)) - 90.0).abs() < 1e-3);
        assert!((bearing_between(origin, Vec2::new(100.0, 200.0)) - 180.0).abs() < 1e-3);
        assert!((bearing_between(origin, Vec2::new(0.0, 100.0)) - 270.0).abs() < 1e-3);
        // Degenerate vector must not produce NaN
        assert_eq!(bearing_between(origin, origin), 0.0);
    }

    #[test]
    fn test_signed_angle_delta() {
        assert!((signed_angle_delta(350.0, 10.0) - 20.0).abs() < 1e-4);
        assert!((signed_angle_delta(10.0, 350.0) + 20.0).abs() < 1e-4);
        assert!((signed_angle_delta(0.0, 180.0) - 180.0).abs() < 1e-4);
    }
}
