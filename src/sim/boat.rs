//! Boat state and per-tick integration

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::courier::{CargoId, CargoItem};
use super::physics::{self, PointOfSail};
use super::wind::WindSnapshot;
use crate::consts::MAX_HEEL;
use crate::heading_to_vec;
use crate::tuning::BoatTuning;

/// Control signals for a single tick, already normalized by the input layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlInput {
    /// -1 = full port turn, +1 = full starboard turn
    pub rudder_delta: f32,
    /// -1 = sheet in, +1 = ease out
    pub trim_delta: f32,
}

/// Relative mass of a boat carrying `cargo_count` items
pub fn cargo_mass(cargo_count: usize, weight_multiplier: f32) -> f32 {
    let mass = 1.0 + cargo_count as f32 * (weight_multiplier - 1.0);
    if mass.is_finite() { mass.max(1.0) } else { 1.0 }
}

/// Speed factor applied for carried cargo (1.0 when empty)
pub fn weight_penalty(cargo_count: usize, weight_multiplier: f32) -> f32 {
    1.0 / cargo_mass(cargo_count, weight_multiplier)
}

/// Everything outside the sim may see of the boat
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoatSnapshot {
    pub position: Vec2,
    pub heading: f32,
    pub speed: f32,
    pub sail_trim: f32,
    pub heel_angle: f32,
    pub cargo_count: usize,
}

/// The player's boat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoatState {
    pub position: Vec2,
    /// Degrees, 0 = north, clockwise. Not wrapped; compare via `relative_wind_angle`.
    pub heading: f32,
    /// Knots (also px per tick)
    pub speed: f32,
    /// 0 (tight) - 100 (loose)
    pub sail_trim: f32,
    /// 0 - 45 degrees
    pub heel_angle: f32,
    cargo: Vec<CargoItem>,
    tuning: BoatTuning,
}

impl BoatState {
    pub fn new(position: Vec2, heading: f32, tuning: &BoatTuning) -> Self {
        Self {
            position,
            heading,
            speed: 0.0,
            sail_trim: tuning.initial_trim.clamp(0.0, 100.0),
            heel_angle: 0.0,
            cargo: Vec::with_capacity(tuning.max_cargo),
            tuning: tuning.clone(),
        }
    }

    pub fn snapshot(&self) -> BoatSnapshot {
        BoatSnapshot {
            position: self.position,
            heading: self.heading,
            speed: self.speed,
            sail_trim: self.sail_trim,
            heel_angle: self.heel_angle,
            cargo_count: self.cargo.len(),
        }
    }

    pub fn cargo(&self) -> &[CargoItem] {
        &self.cargo
    }

    pub fn capacity(&self) -> usize {
        self.tuning.max_cargo
    }

    pub fn is_full(&self) -> bool {
        self.cargo.len() >= self.tuning.max_cargo
    }

    /// Load an item. Returns false, leaving the hold untouched, when full.
    pub fn add_cargo(&mut self, item: CargoItem) -> bool {
        if self.is_full() {
            return false;
        }
        self.cargo.push(item);
        true
    }

    /// Unload an item by id
    pub fn remove_cargo(&mut self, id: CargoId) -> Option<CargoItem> {
        let idx = self.cargo.iter().position(|c| c.id == id)?;
        Some(self.cargo.remove(idx))
    }

    /// Drop every item whose delivery window has closed
    pub fn drop_expired_cargo(&mut self, now_ms: f64) -> Vec<CargoItem> {
        let (expired, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.cargo)
            .into_iter()
            .partition(|c| c.expires_at <= now_ms);
        self.cargo = kept;
        expired
    }

    pub fn point_of_sail(&self, wind: &WindSnapshot) -> PointOfSail {
        physics::point_of_sail(self.heading, wind.angle)
    }

    /// Speed the boat is currently converging on
    pub fn target_speed(&self, wind: &WindSnapshot) -> f32 {
        let base = physics::calculate_boat_speed(self.heading, wind.angle, wind.speed, self.sail_trim);
        let heel_factor = physics::heel_speed_multiplier(self.heel_angle);
        let penalty = weight_penalty(self.cargo.len(), self.tuning.cargo_weight_multiplier);
        base * heel_factor * penalty
    }

    /// Advance one tick
    pub fn tick(&mut self, input: &ControlInput, wind: &WindSnapshot) {
        let t = &self.tuning;

        // Controls
        let rudder = sanitize_unit(input.rudder_delta);
        let trim = sanitize_unit(input.trim_delta);
        self.heading += rudder * t.rudder_turn_rate;
        self.sail_trim = (self.sail_trim + trim * t.sail_adjust_rate).clamp(0.0, 100.0);

        // Heel eases toward the value the rig is being pushed to
        let force = physics::wind_force(self.heading, wind.angle, wind.speed);
        let heel_target = physics::calculate_heel_angle(force, self.sail_trim, self.speed);
        let response = t.heel_response.clamp(0.0, 1.0);
        self.heel_angle = (self.heel_angle + (heel_target - self.heel_angle) * response).clamp(0.0, MAX_HEEL);

        // Inertia: slow to build speed, quicker to lose it
        let target = self.target_speed(wind);
        let (accel, decel) = (t.acceleration, t.deceleration);
        if self.speed < target {
            self.speed = (self.speed + accel).min(target);
        } else if self.speed > target {
            self.speed = (self.speed - decel).max(target);
        }
        self.speed = self.speed.max(0.0);

        self.position += heading_to_vec(self.heading) * self.speed;
    }

    /// Bring the boat to rest (race over, session over)
    pub fn stop(&mut self) {
        self.speed = 0.0;
    }
}

/// Clamp a normalized control to [-1, 1]; NaN counts as no input
fn sanitize_unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_BOAT_SPEED;

    fn cargo(id: CargoId, expires_at: f64) -> CargoItem {
        CargoItem {
            id,
            source_island_id: "home".into(),
            destination_island_id: "island_1".into(),
            payout: 100,
            expires_at,
            description: "Deliver to Nassau".into(),
        }
    }

    fn wind(angle: f32) -> WindSnapshot {
        WindSnapshot { angle, speed: 10.0 }
    }

    #[test]
    fn test_weight_penalty() {
        assert_eq!(cargo_mass(0, 1.2), 1.0);
        assert!((cargo_mass(2, 1.2) - 1.4).abs() < 1e-5);
        assert!((weight_penalty(2, 1.2) - 0.714_285_7).abs() < 1e-4);
        // Degenerate multipliers never blow up
        assert_eq!(weight_penalty(3, 0.0), 1.0);
        assert_eq!(weight_penalty(3, f32::INFINITY), 1.0);
    }

    #[test]
    fn test_controls_are_rate_limited() {
        let tuning = BoatTuning::default();
        let mut boat = BoatState::new(Vec2::ZERO, 0.0, &tuning);
        let input = ControlInput {
            rudder_delta: 5.0,
            trim_delta: -3.0,
        };
        boat.tick(&input, &wind(0.0));
        assert_eq!(boat.heading, tuning.rudder_turn_rate);
        assert_eq!(boat.sail_trim, tuning.initial_trim - tuning.sail_adjust_rate);

        for _ in 0..100 {
            boat.tick(&input, &wind(0.0));
        }
        assert_eq!(boat.sail_trim, 0.0);
    }

    #[test]
    fn test_head_to_wind_goes_nowhere() {
        let mut boat = BoatState::new(Vec2::new(100.0, 100.0), 0.0, &BoatTuning::default());
        for _ in 0..120 {
            boat.tick(&ControlInput::default(), &wind(0.0));
        }
        assert_eq!(boat.speed, 0.0);
        assert_eq!(boat.position, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_accelerates_slowly_decelerates_fast() {
        let tuning = BoatTuning::default();
        let mut boat = BoatState::new(Vec2::ZERO, 90.0, &tuning);
        boat.sail_trim = physics::optimal_trim(90.0);
        boat.tick(&ControlInput::default(), &wind(0.0));
        assert!((boat.speed - tuning.acceleration).abs() < 1e-6);

        for _ in 0..600 {
            boat.tick(&ControlInput::default(), &wind(0.0));
        }
        let cruising = boat.speed;
        assert!(cruising > 0.0 && cruising <= MAX_BOAT_SPEED);
        // Sailing east: x grows, y holds
        assert!(boat.position.x > 0.0);
        assert!(boat.position.y.abs() < 1e-2);

        // Turn head to wind: speed bleeds off at the deceleration rate
        boat.heading = 0.0;
        boat.tick(&ControlInput::default(), &wind(0.0));
        assert!((cruising - boat.speed - tuning.deceleration).abs() < 1e-5);
        for _ in 0..200 {
            boat.tick(&ControlInput::default(), &wind(0.0));
        }
        assert_eq!(boat.speed, 0.0);
    }

    #[test]
    fn test_heel_stays_in_range() {
        let mut boat = BoatState::new(Vec2::ZERO, 120.0, &BoatTuning::default());
        boat.sail_trim = 100.0;
        let gale = WindSnapshot { angle: 0.0, speed: 60.0 };
        for _ in 0..500 {
            boat.tick(&ControlInput::default(), &gale);
            assert!(boat.heel_angle >= 0.0 && boat.heel_angle <= MAX_HEEL);
        }
        assert!(boat.heel_angle > 30.0);
    }

    #[test]
    fn test_cargo_capacity() {
        let tuning = BoatTuning::default();
        let mut boat = BoatState::new(Vec2::ZERO, 0.0, &tuning);
        for id in 0..tuning.max_cargo as CargoId {
            assert!(boat.add_cargo(cargo(id, 1_000.0)));
        }
        assert!(boat.is_full());
        assert!(!boat.add_cargo(cargo(99, 1_000.0)));
        assert_eq!(boat.cargo().len(), tuning.max_cargo);
        assert!(boat.cargo().iter().all(|c| c.id != 99));

        assert_eq!(boat.remove_cargo(1).map(|c| c.id), Some(1));
        assert!(boat.remove_cargo(1).is_none());
        assert!(boat.add_cargo(cargo(99, 1_000.0)));
    }

    #[test]
    fn test_cargo_slows_the_boat() {
        let tuning = BoatTuning::default();
        let mut empty = BoatState::new(Vec2::ZERO, 90.0, &tuning);
        let mut laden = empty.clone();
        laden.add_cargo(cargo(1, 1e9));
        laden.add_cargo(cargo(2, 1e9));
        empty.heel_angle = 20.0;
        laden.heel_angle = 20.0;
        empty.sail_trim = physics::optimal_trim(90.0);
        laden.sail_trim = empty.sail_trim;

        let w = WindSnapshot { angle: 0.0, speed: 5.0 };
        let ratio = laden.target_speed(&w) / empty.target_speed(&w);
        assert!((ratio - 1.0 / 1.4).abs() < 1e-4);
    }

    #[test]
    fn test_drop_expired_cargo() {
        let mut boat = BoatState::new(Vec2::ZERO, 0.0, &BoatTuning::default());
        boat.add_cargo(cargo(1, 500.0));
        boat.add_cargo(cargo(2, 2_000.0));
        let expired = boat.drop_expired_cargo(500.0);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, 1);
        assert_eq!(boat.cargo().len(), 1);
    }
}
