//! Game flow
//!
//! Wires the pure simulation to progression and ghosts:
//! - `RaceSession`: countdown, race, ghost record/replay, result persistence
//! - `CourierSession`: timed delivery run with a persisted high score
//!
//! Neither owns a clock. The caller feeds fixed ticks (`consts::SIM_TICK_MS`)
//! and reacts to the returned events.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::ghost::{GhostFrame, GhostPlayer, GhostRecorder};
use crate::persistence::KeyValueStore;
use crate::progression::Progression;
use crate::sim::{
    self, BoatSnapshot, CargoId, CargoItem, ControlInput, CourierEvent, CourierState, CourseDef,
    DockReport, RaceEvent, RaceHud, RaceState, autopilot,
};
use crate::tuning::{BoatTuning, Tuning};

/// How far behind the line the autopilot waits for the gun
const PRESTART_HOLD_DISTANCE: f32 = 200.0;

/// Everything the presentation layer needs to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Countdown { seconds: u32 },
    RaceStarted,
    OverEarly,
    WaypointPassed { index: usize, total: usize },
    RaceFinished {
        elapsed_ms: f64,
        stars: u8,
        is_new_best: bool,
        /// Over early: no stars, nothing saved
        dsq: bool,
        ghost_saved: bool,
    },
    JobsUpdated { jobs: Vec<CargoItem> },
    Docked { island_id: String },
    Undocked,
    CargoExpired { id: CargoId },
    CourierOver {
        earnings: u64,
        high_score: u64,
        is_new_high: bool,
    },
}

/// Result of a completed race
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaceOutcome {
    pub elapsed_ms: f64,
    pub stars: u8,
    pub is_new_best: bool,
    pub dsq: bool,
    pub ghost_saved: bool,
}

/// One race on one course, replayable via `restart`
#[derive(Debug, Clone)]
pub struct RaceSession<S> {
    course_index: usize,
    def: CourseDef,
    tuning: Tuning,
    race: RaceState,
    recorder: GhostRecorder,
    ghost: Option<GhostPlayer>,
    progression: Progression<S>,
    outcome: Option<RaceOutcome>,
}

impl<S: KeyValueStore> RaceSession<S> {
    /// Set up a race; fails on an unknown course index
    pub fn new(course_index: usize, progression: Progression<S>, tuning: Tuning, seed: u64) -> Result<Self> {
        let mut progression = progression.with_tolerance(tuning.race.ghost_time_tolerance_ms);
        let def = progression.course(course_index)?.clone();
        let ghost = progression.load_ghost(course_index).map(GhostPlayer::new);
        log::info!(
            "Race on '{}' (seed {}, ghost: {})",
            def.name,
            seed,
            if ghost.is_some() { "yes" } else { "no" }
        );

        Ok(Self {
            course_index,
            race: RaceState::new(&def, &tuning, seed),
            recorder: GhostRecorder::new(tuning.race.ghost_sample_interval_ms),
            def,
            tuning,
            ghost,
            progression,
            outcome: None,
        })
    }

    pub fn course_index(&self) -> usize {
        self.course_index
    }

    pub fn course(&self) -> &CourseDef {
        &self.def
    }

    pub fn race(&self) -> &RaceState {
        &self.race
    }

    pub fn hud(&self) -> RaceHud {
        self.race.hud()
    }

    pub fn progression(&self) -> &Progression<S> {
        &self.progression
    }

    pub fn into_progression(self) -> Progression<S> {
        self.progression
    }

    pub fn outcome(&self) -> Option<RaceOutcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn has_ghost(&self) -> bool {
        self.ghost.is_some()
    }

    /// Advance one tick and report what happened
    pub fn update(&mut self, input: &ControlInput, dt_ms: f64) -> Vec<GameEvent> {
        let race_events = sim::tick(&mut self.race, input, dt_ms);

        if self.race.is_clock_running() {
            self.recorder.record(self.race.elapsed_ms(), &self.race.boat.snapshot());
        }

        let mut events = Vec::with_capacity(race_events.len());
        for event in race_events {
            events.push(match event {
                RaceEvent::Countdown { seconds } => GameEvent::Countdown { seconds },
                RaceEvent::Started => GameEvent::RaceStarted,
                RaceEvent::OverEarly => GameEvent::OverEarly,
                RaceEvent::WaypointPassed { index, total } => GameEvent::WaypointPassed { index, total },
                RaceEvent::Finished { elapsed_ms, ocs } => {
                    let outcome = self.finish(elapsed_ms, ocs);
                    GameEvent::RaceFinished {
                        elapsed_ms: outcome.elapsed_ms,
                        stars: outcome.stars,
                        is_new_best: outcome.is_new_best,
                        dsq: outcome.dsq,
                        ghost_saved: outcome.ghost_saved,
                    }
                }
            });
        }
        events
    }

    fn finish(&mut self, elapsed_ms: f64, ocs: bool) -> RaceOutcome {
        let outcome = if ocs {
            log::info!("Disqualified: over the line early");
            self.recorder.reset();
            RaceOutcome {
                elapsed_ms,
                stars: 0,
                is_new_best: false,
                dsq: true,
                ghost_saved: false,
            }
        } else {
            // Final pose, even if it falls between samples
            let boat = self.race.boat.snapshot();
            self.recorder.record_final(elapsed_ms, &boat);

            let result = self.progression.save_race_result(self.course_index, elapsed_ms);
            let ghost = self.recorder.finish(self.course_index, elapsed_ms);
            let ghost_saved = self.progression.save_ghost(self.course_index, &ghost);
            RaceOutcome {
                elapsed_ms,
                stars: result.stars,
                is_new_best: result.is_new_best,
                dsq: false,
                ghost_saved,
            }
        };
        self.outcome = Some(outcome);
        outcome
    }

    /// Ghost pose at the current race time
    pub fn ghost_frame(&mut self) -> Option<GhostFrame> {
        let elapsed = self.race.elapsed_ms();
        self.ghost.as_mut()?.sample(elapsed)
    }

    /// Start over on the same course; any unfinished recording is dropped
    pub fn restart(&mut self, seed: u64) {
        self.race = RaceState::new(&self.def, &self.tuning, seed);
        self.recorder.reset();
        self.outcome = None;
        self.ghost = self.progression.load_ghost(self.course_index).map(GhostPlayer::new);
        log::info!("Race restarted on '{}' (seed {})", self.def.name, seed);
    }

    /// Controls an idle/demo skipper would give this tick
    pub fn autopilot_input(&self) -> ControlInput {
        let boat = self.race.boat.snapshot();
        let wind = self.race.wind.snapshot();
        let target = if self.race.is_clock_running() {
            match self.race.course.current_target() {
                Some(waypoint) => waypoint.position,
                None => return ControlInput::default(),
            }
        } else {
            self.prestart_hold_point()
        };
        autopilot::steer(&boat, &wind, target, &self.tuning.boat)
    }

    /// A point behind the start line, away from the course
    fn prestart_hold_point(&self) -> Vec2 {
        let start = self.def.start_pos.position();
        match self.race.course.start_line() {
            Some(line) => {
                let away = (start - (line.p1 + line.p2) * 0.5).normalize_or_zero();
                start + away * PRESTART_HOLD_DISTANCE
            }
            None => start,
        }
    }
}

/// A timed courier run
#[derive(Debug, Clone)]
pub struct CourierSession<S> {
    state: CourierState,
    rng: Pcg32,
    progression: Progression<S>,
    boat_tuning: BoatTuning,
}

impl<S: KeyValueStore> CourierSession<S> {
    pub fn new(progression: Progression<S>, tuning: &Tuning, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let state = CourierState::new(tuning, &mut rng);
        log::info!(
            "Courier session: {} islands, {} jobs posted",
            state.board.islands().len(),
            state.board.jobs().len()
        );
        Self {
            state,
            rng,
            progression,
            boat_tuning: tuning.boat.clone(),
        }
    }

    pub fn state(&self) -> &CourierState {
        &self.state
    }

    pub fn boat(&self) -> BoatSnapshot {
        self.state.boat()
    }

    pub fn progression(&self) -> &Progression<S> {
        &self.progression
    }

    pub fn into_progression(self) -> Progression<S> {
        self.progression
    }

    pub fn is_over(&self) -> bool {
        !self.state.active
    }

    pub fn update(&mut self, input: &ControlInput, dt_ms: f64) -> Vec<GameEvent> {
        self.state
            .tick(input, dt_ms, &mut self.rng)
            .into_iter()
            .map(|event| match event {
                CourierEvent::JobsUpdated { jobs } => GameEvent::JobsUpdated { jobs },
                CourierEvent::Docked { island_id } => GameEvent::Docked { island_id },
                CourierEvent::Undocked => GameEvent::Undocked,
                CourierEvent::CargoExpired { id } => GameEvent::CargoExpired { id },
                CourierEvent::SessionOver { earnings } => {
                    let is_new_high = self.progression.save_courier_score(earnings);
                    GameEvent::CourierOver {
                        earnings,
                        high_score: self.progression.courier_high_score(),
                        is_new_high,
                    }
                }
            })
            .collect()
    }

    /// Deliver and pick up at the island the boat is docked at
    pub fn interact(&mut self) -> Option<DockReport> {
        self.state.interact()
    }

    /// Steer toward the first destination in the hold, else the nearest job
    pub fn autopilot_input(&self) -> ControlInput {
        let boat = self.state.boat();
        let board = &self.state.board;
        let destination = self
            .state
            .boat
            .cargo()
            .first()
            .and_then(|c| board.island(&c.destination_island_id))
            .or_else(|| {
                board
                    .jobs()
                    .iter()
                    .filter_map(|j| board.island(&j.source_island_id))
                    .min_by(|a, b| {
                        let da = a.position.distance_squared(boat.position);
                        let db = b.position.distance_squared(boat.position);
                        da.total_cmp(&db)
                    })
            });
        match destination {
            Some(island) => autopilot::steer(&boat, &self.state.wind.snapshot(), island.position, &self.boat_tuning),
            None => ControlInput::default(),
        }
    }
}
