//! Fixed timestep race tick
//!
//! Advances wind, boat and course in that order. The race clock only runs
//! between the start gun and the finish; pre-start ticks still move the boat
//! so the skipper can manoeuvre behind the line.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boat::{BoatSnapshot, BoatState, ControlInput};
use super::course::{Course, CourseDef, CourseEvent};
use super::physics::PointOfSail;
use super::wind::WindModel;
use crate::tuning::Tuning;

/// Race lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RacePhase {
    /// Countdown running, clock stopped
    PreStart,
    /// Clock running
    Racing,
    /// Last mark rounded (terminal)
    Finished,
}

/// Notifications from a race tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RaceEvent {
    /// Whole seconds left before the gun
    Countdown { seconds: u32 },
    Started,
    /// Boat crossed the start line early
    OverEarly,
    WaypointPassed { index: usize, total: usize },
    Finished { elapsed_ms: f64, ocs: bool },
}

/// Per-frame readout for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaceHud {
    pub wind_angle: f32,
    pub wind_speed: f32,
    pub boat: BoatSnapshot,
    pub point_of_sail: PointOfSail,
    pub elapsed_ms: f64,
    pub waypoint_index: usize,
    pub total_waypoints: usize,
}

/// Complete race state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct RaceState {
    pub seed: u64,
    pub phase: RacePhase,
    pub wind: WindModel,
    pub boat: BoatState,
    pub course: Course,
    /// Session time (ms), including pre-start
    pub time_ms: f64,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Countdown left (ms)
    pub countdown_ms: f64,
    /// Session time of the start gun
    pub started_at: Option<f64>,
    /// Race time at the finish
    pub finish_elapsed_ms: Option<f64>,
    /// On-course-side before the gun
    pub ocs: bool,
    last_countdown: u32,
    rng: Pcg32,
}

impl RaceState {
    pub fn new(def: &CourseDef, tuning: &Tuning, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let wind = WindModel::new(&tuning.wind, &mut rng);
        let boat = BoatState::new(def.start_pos.position(), def.start_pos.heading, &tuning.boat);
        let countdown_ms = tuning.race.countdown_ms.max(0.0);

        Self {
            seed,
            phase: RacePhase::PreStart,
            wind,
            boat,
            course: Course::from_def(def, tuning.race.waypoint_radius),
            time_ms: 0.0,
            time_ticks: 0,
            countdown_ms,
            started_at: None,
            finish_elapsed_ms: None,
            ocs: false,
            last_countdown: 0,
            rng,
        }
    }

    /// Race clock (ms): zero before the gun, frozen after the finish
    pub fn elapsed_ms(&self) -> f64 {
        match (self.phase, self.started_at, self.finish_elapsed_ms) {
            (RacePhase::Finished, _, Some(t)) => t,
            (RacePhase::Racing, Some(start), _) => (self.time_ms - start).max(0.0),
            _ => 0.0,
        }
    }

    pub fn is_clock_running(&self) -> bool {
        self.phase == RacePhase::Racing
    }

    pub fn hud(&self) -> RaceHud {
        let wind = self.wind.snapshot();
        RaceHud {
            wind_angle: wind.angle,
            wind_speed: wind.speed,
            boat: self.boat.snapshot(),
            point_of_sail: self.boat.point_of_sail(&wind),
            elapsed_ms: self.elapsed_ms(),
            waypoint_index: self.course.current_index(),
            total_waypoints: self.course.total(),
        }
    }
}

/// Advance the race by one tick of `dt_ms`
pub fn tick(state: &mut RaceState, input: &ControlInput, dt_ms: f64) -> Vec<RaceEvent> {
    let mut events = Vec::new();
    if state.phase == RacePhase::Finished {
        return events;
    }

    let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
    state.time_ticks += 1;
    state.time_ms += dt_ms;

    state.wind.tick(state.time_ms, &mut state.rng);
    let wind = state.wind.snapshot();
    state.boat.tick(input, &wind);

    match state.phase {
        RacePhase::PreStart => {
            if !state.ocs && state.course.check_ocs(state.boat.position) {
                state.ocs = true;
                log::info!("Over early at t={:.0} ms", state.time_ms);
                events.push(RaceEvent::OverEarly);
            }

            state.countdown_ms -= dt_ms;
            if state.countdown_ms <= 0.0 {
                state.phase = RacePhase::Racing;
                state.started_at = Some(state.time_ms);
                log::info!("Race started (seed {})", state.seed);
                events.push(RaceEvent::Started);
            } else {
                let seconds = (state.countdown_ms / 1000.0).ceil() as u32;
                if seconds != state.last_countdown {
                    state.last_countdown = seconds;
                    events.push(RaceEvent::Countdown { seconds });
                }
            }
        }
        RacePhase::Racing => {
            for event in state.course.update(state.boat.position) {
                match event {
                    CourseEvent::WaypointPassed { index, total } => {
                        events.push(RaceEvent::WaypointPassed { index, total });
                    }
                    CourseEvent::Finished => {
                        let elapsed = state.elapsed_ms();
                        state.phase = RacePhase::Finished;
                        state.finish_elapsed_ms = Some(elapsed);
                        state.boat.stop();
                        log::info!("Race finished in {:.0} ms (ocs: {})", elapsed, state.ocs);
                        events.push(RaceEvent::Finished {
                            elapsed_ms: elapsed,
                            ocs: state.ocs,
                        });
                    }
                }
            }
        }
        RacePhase::Finished => {}
    }

    events
}
