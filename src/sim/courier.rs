//! Courier economy
//!
//! Islands, the delivery job board and the courier session state. Jobs are
//! time-boxed cargo runs between two distinct islands; the board owns a job
//! until it is picked up, then the boat owns it until delivery or expiry.

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::boat::{BoatSnapshot, BoatState, ControlInput};
use super::wind::WindModel;
use crate::tuning::{CourierTuning, Tuning};

pub type CargoId = u32;

/// A delivery job, on the board or in the hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoItem {
    pub id: CargoId,
    pub source_island_id: String,
    pub destination_island_id: String,
    pub payout: u32,
    /// Absolute session time (ms)
    pub expires_at: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Island {
    pub id: String,
    pub name: String,
    pub position: Vec2,
    pub radius: f32,
}

impl Island {
    /// Within docking range of the shore
    pub fn is_within_range(&self, point: Vec2, range: f32) -> bool {
        self.position.distance(point) <= self.radius + range
    }
}

/// Id of the island the courier starts from
pub const HOME_ISLAND_ID: &str = "home";

const ISLAND_NAMES: [&str; 8] = [
    "Tortuga", "Barbados", "Havana", "Nassau", "Cayman", "Jamaica", "Bermuda", "Antigua",
];

/// Scatter islands over the map, home first at the centre.
///
/// Placement is rejection sampled against the minimum spacing, so fewer than
/// `island_count` islands may come back when the map is crowded.
pub fn generate_islands(tuning: &CourierTuning, rng: &mut impl Rng) -> Vec<Island> {
    let mut names = ISLAND_NAMES.to_vec();
    names.shuffle(rng);
    let name_for = |i: usize| {
        names
            .get(i)
            .map(|n| n.to_string())
            .unwrap_or_else(|| format!("Island {i}"))
    };

    let mut islands = vec![Island {
        id: HOME_ISLAND_ID.to_string(),
        name: name_for(0),
        position: Vec2::new(tuning.world_width / 2.0, tuning.world_height / 2.0),
        radius: tuning.island_radius,
    }];

    let pad = tuning.island_padding;
    let (x_lo, x_hi) = (pad, (tuning.world_width - pad).max(pad));
    let (y_lo, y_hi) = (pad, (tuning.world_height - pad).max(pad));

    let mut attempts = 0;
    while islands.len() < tuning.island_count && attempts < tuning.island_attempts {
        attempts += 1;
        let candidate = Vec2::new(rng.random_range(x_lo..=x_hi), rng.random_range(y_lo..=y_hi));
        let clear = islands
            .iter()
            .all(|other| other.position.distance(candidate) >= tuning.island_min_distance);
        if clear {
            let i = islands.len();
            islands.push(Island {
                id: format!("island_{i}"),
                name: name_for(i),
                position: candidate,
                radius: tuning.island_radius,
            });
        }
    }

    log::debug!("Placed {} islands in {} attempts", islands.len(), attempts);
    islands
}

/// Open delivery jobs between a fixed set of islands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryJobBoard {
    islands: Vec<Island>,
    jobs: Vec<CargoItem>,
    next_id: CargoId,
    tuning: CourierTuning,
}

impl DeliveryJobBoard {
    pub fn new(islands: Vec<Island>, tuning: &CourierTuning) -> Self {
        Self {
            islands,
            jobs: Vec::new(),
            next_id: 1,
            tuning: tuning.clone(),
        }
    }

    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    pub fn island(&self, id: &str) -> Option<&Island> {
        self.islands.iter().find(|i| i.id == id)
    }

    pub fn jobs(&self) -> &[CargoItem] {
        &self.jobs
    }

    pub fn jobs_at_island<'a>(&'a self, island_id: &'a str) -> impl Iterator<Item = &'a CargoItem> {
        self.jobs.iter().filter(move |j| j.source_island_id == island_id)
    }

    /// Spawn `count` jobs at once (session start)
    pub fn generate_jobs(&mut self, count: usize, now_ms: f64, rng: &mut impl Rng) {
        for _ in 0..count {
            self.spawn_job(now_ms, rng);
        }
    }

    /// Post one job between two random distinct islands
    pub fn spawn_job(&mut self, now_ms: f64, rng: &mut impl Rng) -> Option<CargoId> {
        if self.islands.len() < 2 {
            return None;
        }

        let n = self.islands.len();
        let source = rng.random_range(0..n);
        let mut dest = rng.random_range(0..n);
        while dest == source {
            dest = rng.random_range(0..n);
        }
        let (source, dest) = (&self.islands[source], &self.islands[dest]);

        let t = &self.tuning;
        let dist = source.position.distance(dest.position);
        let unit = if t.distance_unit > 0.0 { t.distance_unit } else { 1.0 };
        let time_limit = t.base_delivery_time_ms * f64::from(dist / unit);
        let payout = (t.base_payout as f32 + dist * t.payout_per_distance).floor() as u32;

        let id = self.next_id;
        self.next_id += 1;
        let job = CargoItem {
            id,
            source_island_id: source.id.clone(),
            destination_island_id: dest.id.clone(),
            payout,
            expires_at: now_ms + time_limit + t.pickup_buffer_ms,
            description: format!("Deliver to {}", dest.name),
        };
        log::debug!(
            "Job {}: {} -> {} ({:.0} px) pays {}",
            id,
            job.source_island_id,
            job.destination_island_id,
            dist,
            payout
        );
        self.jobs.push(job);
        Some(id)
    }

    /// Expire stale jobs and occasionally top the board up.
    /// Returns true when the job list changed.
    pub fn update(&mut self, now_ms: f64, rng: &mut impl Rng) -> bool {
        let before = self.jobs.len();
        self.jobs.retain(|j| j.expires_at > now_ms);
        let mut changed = self.jobs.len() != before;

        if self.jobs.len() < self.tuning.min_jobs
            && rng.random_bool(self.tuning.replenish_chance.clamp(0.0, 1.0))
        {
            changed |= self.spawn_job(now_ms, rng).is_some();
        }
        changed
    }

    /// Take a job off the board
    pub fn remove_job(&mut self, id: CargoId) -> Option<CargoItem> {
        let idx = self.jobs.iter().position(|j| j.id == id)?;
        Some(self.jobs.remove(idx))
    }

    /// Move a job into the hold if there is room
    pub fn pick_up(&mut self, id: CargoId, boat: &mut BoatState) -> bool {
        if boat.is_full() {
            return false;
        }
        match self.remove_job(id) {
            Some(job) => boat.add_cargo(job),
            None => false,
        }
    }
}

/// Outcome of pressing "interact" while docked
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DockReport {
    /// Items delivered and their payouts
    pub delivered: Vec<(CargoId, u32)>,
    pub picked_up: Option<CargoId>,
    /// A job was waiting but the hold was full
    pub cargo_full: bool,
    /// No job waiting at this island
    pub no_jobs: bool,
}

/// Courier notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CourierEvent {
    JobsUpdated { jobs: Vec<CargoItem> },
    Docked { island_id: String },
    Undocked,
    CargoExpired { id: CargoId },
    SessionOver { earnings: u64 },
}

/// A timed courier session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourierState {
    pub wind: WindModel,
    pub boat: BoatState,
    pub board: DeliveryJobBoard,
    /// Session clock (ms since start)
    pub elapsed_ms: f64,
    pub earnings: u64,
    pub docked_at: Option<String>,
    pub active: bool,
    tuning: CourierTuning,
}

impl CourierState {
    /// Lay out the islands, post the opening jobs and launch from home
    pub fn new(tuning: &Tuning, rng: &mut impl Rng) -> Self {
        let islands = generate_islands(&tuning.courier, rng);
        let home = islands[0].position;
        let mut board = DeliveryJobBoard::new(islands, &tuning.courier);
        board.generate_jobs(tuning.courier.initial_jobs, 0.0, rng);

        Self {
            wind: WindModel::with_random_speed(&tuning.wind, rng),
            boat: BoatState::new(home + Vec2::splat(60.0), 0.0, &tuning.boat),
            board,
            elapsed_ms: 0.0,
            earnings: 0,
            docked_at: None,
            active: true,
            tuning: tuning.courier.clone(),
        }
    }

    pub fn remaining_ms(&self) -> f64 {
        (self.tuning.session_duration_ms - self.elapsed_ms).max(0.0)
    }

    pub fn boat(&self) -> BoatSnapshot {
        self.boat.snapshot()
    }

    /// Advance one tick
    pub fn tick(&mut self, input: &ControlInput, dt_ms: f64, rng: &mut impl Rng) -> Vec<CourierEvent> {
        let mut events = Vec::new();
        if !self.active {
            return events;
        }

        self.elapsed_ms += dt_ms.max(0.0);
        if self.elapsed_ms >= self.tuning.session_duration_ms {
            self.active = false;
            self.boat.stop();
            events.push(CourierEvent::SessionOver {
                earnings: self.earnings,
            });
            return events;
        }

        let now = self.elapsed_ms;
        self.wind.tick(now, rng);
        self.boat.tick(input, &self.wind.snapshot());

        if self.board.update(now, rng) {
            events.push(CourierEvent::JobsUpdated {
                jobs: self.board.jobs().to_vec(),
            });
        }
        for item in self.boat.drop_expired_cargo(now) {
            log::warn!("Cargo {} expired before delivery", item.id);
            events.push(CourierEvent::CargoExpired { id: item.id });
        }

        let docked = self
            .board
            .islands()
            .iter()
            .find(|i| i.is_within_range(self.boat.position, self.tuning.dock_range))
            .map(|i| i.id.clone());
        if docked != self.docked_at {
            events.push(match &docked {
                Some(id) => CourierEvent::Docked { island_id: id.clone() },
                None => CourierEvent::Undocked,
            });
            self.docked_at = docked;
        }

        events
    }

    /// Deliver everything bound for the docked island, then pick up one job
    pub fn interact(&mut self) -> Option<DockReport> {
        if !self.active {
            return None;
        }
        let island_id = self.docked_at.clone()?;
        let mut report = DockReport::default();

        let bound_here: Vec<CargoId> = self
            .boat
            .cargo()
            .iter()
            .filter(|c| c.destination_island_id == island_id)
            .map(|c| c.id)
            .collect();
        for id in bound_here {
            if let Some(item) = self.boat.remove_cargo(id) {
                self.earnings += u64::from(item.payout);
                log::info!("Delivered {} for ${}", item.description, item.payout);
                report.delivered.push((item.id, item.payout));
            }
        }

        let waiting = self.board.jobs_at_island(&island_id).next().map(|j| j.id);
        match waiting {
            Some(id) => {
                if self.board.pick_up(id, &mut self.boat) {
                    report.picked_up = Some(id);
                } else {
                    report.cargo_full = true;
                }
            }
            None => report.no_jobs = true,
        }
        Some(report)
    }
}
