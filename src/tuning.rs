//! Data-driven game balance
//!
//! Every section deserializes with defaults, so a tuning file only needs the
//! values it overrides.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Wind behaviour for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindTuning {
    /// Initial wind direction (degrees, 0 = north)
    pub initial_angle: f32,
    /// Wind speed used by races (knots)
    pub base_speed: f32,
    /// Range for sessions that roll their wind speed (knots)
    pub speed_min: f32,
    pub speed_max: f32,
    /// Delay between shifts (ms)
    pub shift_interval_min_ms: f64,
    pub shift_interval_max_ms: f64,
    /// Shift magnitude (degrees)
    pub shift_amount_min: f32,
    pub shift_amount_max: f32,
    /// Fraction of the remaining angle closed each tick
    pub relax_factor: f32,
    /// Below this gap the angle snaps onto the target
    pub snap_epsilon: f32,
}

impl Default for WindTuning {
    fn default() -> Self {
        Self {
            initial_angle: 0.0,
            base_speed: 10.0,
            speed_min: 5.0,
            speed_max: 15.0,
            shift_interval_min_ms: 30_000.0,
            shift_interval_max_ms: 60_000.0,
            shift_amount_min: 5.0,
            shift_amount_max: 15.0,
            relax_factor: 0.01,
            snap_epsilon: 0.1,
        }
    }
}

/// Boat handling, per simulation tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoatTuning {
    /// Degrees of heading change at full rudder
    pub rudder_turn_rate: f32,
    /// Trim percentage points at full trim input
    pub sail_adjust_rate: f32,
    /// Speed gained per tick while below target
    pub acceleration: f32,
    /// Speed lost per tick while above target
    pub deceleration: f32,
    /// Fraction of the heel gap closed each tick
    pub heel_response: f32,
    /// Hold capacity
    pub max_cargo: usize,
    /// Relative mass added per cargo item is `multiplier - 1`
    pub cargo_weight_multiplier: f32,
    /// Trim on launch
    pub initial_trim: f32,
}

impl Default for BoatTuning {
    fn default() -> Self {
        Self {
            rudder_turn_rate: 2.0,
            sail_adjust_rate: 2.0,
            acceleration: 0.05,
            deceleration: 0.1,
            heel_response: 0.1,
            max_cargo: 3,
            cargo_weight_multiplier: 1.2,
            initial_trim: 50.0,
        }
    }
}

/// Race flow timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceTuning {
    /// Pre-start countdown (ms)
    pub countdown_ms: f64,
    /// Ghost sampling interval (ms, 10 Hz)
    pub ghost_sample_interval_ms: f64,
    /// Allowed disagreement between ghost time and best time (ms)
    pub ghost_time_tolerance_ms: f64,
    /// Default waypoint capture radius (px)
    pub waypoint_radius: f32,
}

impl Default for RaceTuning {
    fn default() -> Self {
        Self {
            countdown_ms: 3_000.0,
            ghost_sample_interval_ms: 100.0,
            ghost_time_tolerance_ms: 2.0,
            waypoint_radius: 50.0,
        }
    }
}

/// Courier economy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourierTuning {
    /// Session length (ms)
    pub session_duration_ms: f64,
    /// Delivery time granted per `distance_unit` of travel (ms)
    pub base_delivery_time_ms: f64,
    /// Distance that earns one `base_delivery_time_ms` (px)
    pub distance_unit: f32,
    /// Extra time to reach the pickup island (ms)
    pub pickup_buffer_ms: f64,
    /// Flat payout per job
    pub base_payout: u32,
    /// Payout per px of distance
    pub payout_per_distance: f32,
    /// Jobs spawned at session start
    pub initial_jobs: usize,
    /// Below this many jobs the board may replenish
    pub min_jobs: usize,
    /// Per-tick chance of a replenishing spawn
    pub replenish_chance: f64,
    /// Docking range beyond the island radius (px)
    pub dock_range: f32,
    /// World size (px)
    pub world_width: f32,
    pub world_height: f32,
    /// Islands to place, including home
    pub island_count: usize,
    /// Minimum centre-to-centre spacing (px)
    pub island_min_distance: f32,
    /// Keep-out margin from the world edge (px)
    pub island_padding: f32,
    /// Placement attempts before giving up
    pub island_attempts: u32,
    pub island_radius: f32,
}

impl Default for CourierTuning {
    fn default() -> Self {
        Self {
            session_duration_ms: 300_000.0,
            base_delivery_time_ms: 60_000.0,
            distance_unit: 500.0,
            pickup_buffer_ms: 30_000.0,
            base_payout: 50,
            payout_per_distance: 0.5,
            initial_jobs: 4,
            min_jobs: 4,
            replenish_chance: 0.01,
            dock_range: 100.0,
            world_width: 12_800.0,
            world_height: 7_200.0,
            island_count: 6,
            island_min_distance: 1_500.0,
            island_padding: 100.0,
            island_attempts: 100,
            island_radius: 40.0,
        }
    }
}

/// Complete tuning set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub wind: WindTuning,
    pub boat: BoatTuning,
    pub race: RaceTuning,
    pub courier: CourierTuning,
}

impl Tuning {
    /// Parse a (possibly partial) tuning document
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning = serde_json::from_str(json)?;
        Ok(tuning)
    }
}
