//! Idle/demo steering
//!
//! Produces the same normalized controls a player would: steer for the mark,
//! beat upwind on lay lines when the mark is inside the no-go zone, and keep
//! the sail at optimal trim.

use glam::Vec2;

use super::boat::{BoatSnapshot, ControlInput};
use super::physics;
use super::wind::WindSnapshot;
use crate::tuning::BoatTuning;
use crate::{bearing_between, relative_wind_angle, signed_angle_delta};

/// Angle off the wind held when beating (degrees)
pub const BEAT_ANGLE: f32 = 50.0;

/// Controls that sail `boat` toward `target`
pub fn steer(boat: &BoatSnapshot, wind: &WindSnapshot, target: Vec2, tuning: &BoatTuning) -> ControlInput {
    let bearing = bearing_between(boat.position, target);
    let off_wind = signed_angle_delta(wind.angle, bearing);

    let desired = if off_wind.abs() >= BEAT_ANGLE {
        bearing
    } else {
        // Stay on the current tack until the mark can be laid directly
        let tack = match signed_angle_delta(wind.angle, boat.heading) {
            d if d > 0.0 => 1.0,
            d if d < 0.0 => -1.0,
            _ => {
                if off_wind < 0.0 { -1.0 } else { 1.0 }
            }
        };
        wind.angle + tack * BEAT_ANGLE
    };

    let turn = signed_angle_delta(boat.heading, desired);
    let rudder_delta = ratio(turn, tuning.rudder_turn_rate);

    let optimal = physics::optimal_trim(relative_wind_angle(boat.heading, wind.angle));
    let trim_delta = ratio(optimal - boat.sail_trim, tuning.sail_adjust_rate);

    ControlInput {
        rudder_delta,
        trim_delta,
    }
}

fn ratio(delta: f32, rate: f32) -> f32 {
    if rate <= 0.0 {
        return 0.0;
    }
    (delta / rate).clamp(-1.0, 1.0)
}
