//! Progression: best times, stars, unlocks and ghosts
//!
//! Persisted through an injected [`KeyValueStore`]. Every write is guarded by
//! an "improves on the stored value" check, so repeating a call with the same
//! or a worse result is harmless. The stored ghost and the stored best time
//! for a course are kept within a small tolerance of each other.

use serde::{Deserialize, Serialize};

use crate::courses;
use crate::error::Result;
use crate::ghost::GhostData;
use crate::persistence::{KeyValueStore, SessionStore, keys, set_or_warn};
use crate::sim::CourseDef;

/// Default allowed gap between ghost time and best time (ms)
pub const GHOST_TIME_TOLERANCE_MS: f64 = 2.0;

/// Outcome of recording a finished race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceResult {
    pub is_new_best: bool,
    pub stars: u8,
}

/// Stars earned by a time on a course (0-3)
pub fn stars_for_time(course: &CourseDef, time_ms: f64) -> u8 {
    if time_ms <= course.gold_time {
        3
    } else if time_ms <= course.silver_time {
        2
    } else if time_ms <= course.bronze_time {
        1
    } else {
        0
    }
}

fn parse_time(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|t| t.is_finite() && *t > 0.0)
}

fn valid_time(time_ms: f64) -> bool {
    time_ms.is_finite() && time_ms > 0.0
}

/// Progression over a course table and a store
#[derive(Debug, Clone)]
pub struct Progression<S> {
    store: SessionStore<S>,
    courses: Vec<CourseDef>,
    tolerance_ms: f64,
}

impl<S: KeyValueStore> Progression<S> {
    pub fn new(store: S, courses: Vec<CourseDef>) -> Self {
        Self {
            store: SessionStore::new(store),
            courses,
            tolerance_ms: GHOST_TIME_TOLERANCE_MS,
        }
    }

    pub fn with_tolerance(mut self, tolerance_ms: f64) -> Self {
        self.tolerance_ms = tolerance_ms.max(0.0);
        self
    }

    /// Allowed gap between a ghost's time and the best time (ms)
    pub fn tolerance_ms(&self) -> f64 {
        self.tolerance_ms
    }

    pub fn courses(&self) -> &[CourseDef] {
        &self.courses
    }

    pub fn course(&self, index: usize) -> Result<&CourseDef> {
        courses::course(&self.courses, index)
    }

    /// Durable store underneath the session overlay
    pub fn store(&self) -> &S {
        self.store.backing()
    }

    pub fn store_mut(&mut self) -> &mut S {
        self.store.backing_mut()
    }

    pub fn best_time(&self, course_index: usize) -> Option<f64> {
        self.store
            .get(&keys::best_time(course_index))
            .and_then(|raw| parse_time(&raw))
    }

    fn write_best_time(&mut self, course_index: usize, time_ms: f64) {
        set_or_warn(&mut self.store, &keys::best_time(course_index), &time_ms.to_string());
    }

    pub fn stars_for_course(&self, course_index: usize) -> u8 {
        match (self.courses.get(course_index), self.best_time(course_index)) {
            (Some(course), Some(best)) => stars_for_time(course, best),
            _ => 0,
        }
    }

    pub fn total_stars(&self) -> u32 {
        (0..self.courses.len())
            .map(|i| u32::from(self.stars_for_course(i)))
            .sum()
    }

    /// Unknown courses are locked
    pub fn is_course_unlocked(&self, course_index: usize) -> bool {
        match self.courses.get(course_index) {
            Some(course) => self.total_stars() >= course.unlock_stars,
            None => false,
        }
    }

    /// Record a finished (legal) race
    pub fn save_race_result(&mut self, course_index: usize, elapsed_ms: f64) -> RaceResult {
        let improves = valid_time(elapsed_ms)
            && self
                .best_time(course_index)
                .is_none_or(|best| elapsed_ms < best);

        if improves {
            self.write_best_time(course_index, elapsed_ms);
            log::info!("New best on course {}: {:.0} ms", course_index, elapsed_ms);
        }

        RaceResult {
            is_new_best: improves,
            stars: self.stars_for_course(course_index),
        }
    }

    /// Keep `ghost` if it is the fastest run on record. Returns true when stored.
    pub fn save_ghost(&mut self, course_index: usize, ghost: &GhostData) -> bool {
        if !valid_time(ghost.time) {
            return false;
        }
        if let Some(best) = self.best_time(course_index) {
            if ghost.time - best > self.tolerance_ms {
                log::warn!(
                    "Not saving ghost for course {}: {:.0} ms is slower than best {:.0} ms",
                    course_index,
                    ghost.time,
                    best
                );
                return false;
            }
        }
        if let Some(existing) = self.load_ghost(course_index) {
            if ghost.time + self.tolerance_ms >= existing.time {
                return false;
            }
        }

        let json = match serde_json::to_string(ghost) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to encode ghost for course {}: {}", course_index, e);
                return false;
            }
        };
        set_or_warn(&mut self.store, &keys::ghost(course_index), &json);
        log::info!(
            "Saved ghost for course {} ({:.0} ms, {} frames)",
            course_index,
            ghost.time,
            ghost.frames.len()
        );
        true
    }

    /// Stored ghost, if present, parseable and consistent with the best time.
    ///
    /// A ghost slower than the best time is ignored. A ghost faster than the
    /// best time wins and the best time is brought into line with it.
    pub fn load_ghost(&mut self, course_index: usize) -> Option<GhostData> {
        let raw = self.store.get(&keys::ghost(course_index))?;
        let ghost: GhostData = match serde_json::from_str(&raw) {
            Ok(ghost) => ghost,
            Err(e) => {
                log::warn!("Corrupt ghost data for course {}: {}", course_index, e);
                return None;
            }
        };
        if !valid_time(ghost.time) {
            log::warn!("Ghost for course {} has invalid time {}", course_index, ghost.time);
            return None;
        }

        match self.best_time(course_index) {
            Some(best) if ghost.time - best > self.tolerance_ms => {
                log::warn!(
                    "Ignoring ghost for course {}: {:.0} ms is slower than best {:.0} ms",
                    course_index,
                    ghost.time,
                    best
                );
                return None;
            }
            Some(best) if best - ghost.time > self.tolerance_ms => {
                log::warn!(
                    "Best time for course {} ({:.0} ms) behind its ghost; using {:.0} ms",
                    course_index,
                    best,
                    ghost.time
                );
                self.write_best_time(course_index, ghost.time);
            }
            None => self.write_best_time(course_index, ghost.time),
            Some(_) => {}
        }
        Some(ghost)
    }

    pub fn courier_high_score(&self) -> u64 {
        self.store
            .get(keys::COURIER_HIGHSCORE)
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Record courier earnings. Returns true on a new high score.
    pub fn save_courier_score(&mut self, earnings: u64) -> bool {
        if earnings <= self.courier_high_score() {
            return false;
        }
        set_or_warn(&mut self.store, keys::COURIER_HIGHSCORE, &earnings.to_string());
        log::info!("New courier high score: ${}", earnings);
        true
    }
}
