//! WindRunner headless runner
//!
//! Sails a race under autopilot, then a second one against the first run's
//! ghost, then a short courier session. Usage: `windrunner [course] [seed]`.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use windrunner::consts::SIM_TICK_MS;
    use windrunner::persistence::MemoryStore;
    use windrunner::session::{CourierSession, GameEvent};
    use windrunner::{Progression, RaceSession, Settings, Tuning, courses};

    /// Give up on a race after this much simulated time
    const MAX_RACE_MS: f64 = 10.0 * 60_000.0;
    const COURIER_DEMO_MS: f64 = 60_000.0;

    pub fn run() -> windrunner::Result<()> {
        let mut args = std::env::args().skip(1);
        let course_index = args.next().and_then(|a| a.parse().ok()).unwrap_or(0);
        let seed = args.next().and_then(|a| a.parse().ok()).unwrap_or(42);

        let tuning = Tuning::default();
        let mut store = MemoryStore::new();
        let settings = Settings::load(&store);
        settings.save(&mut store);

        let progression = Progression::new(store, courses::builtin());
        let mut session = RaceSession::new(course_index, progression, tuning.clone(), seed)?;
        log::info!("Course {}: {}", course_index, session.course().name);

        sail(&mut session);
        session.restart(seed.wrapping_add(1));
        sail(&mut session);

        let progression = session.into_progression();
        log::info!("Total stars: {}", progression.total_stars());
        for (i, def) in progression.courses().iter().enumerate() {
            log::info!(
                "  {} [{}] best: {:?}, stars: {}",
                def.name,
                if progression.is_course_unlocked(i) { "open" } else { "locked" },
                progression.best_time(i),
                progression.stars_for_course(i)
            );
        }

        courier(progression, &tuning, seed);
        Ok(())
    }

    fn sail(session: &mut RaceSession<MemoryStore>) {
        let mut ghost_lead_logged = false;
        let mut elapsed = 0.0;
        while !session.is_finished() && elapsed < MAX_RACE_MS {
            let input = session.autopilot_input();
            for event in session.update(&input, SIM_TICK_MS) {
                match event {
                    GameEvent::Countdown { seconds } => log::info!("{}...", seconds),
                    GameEvent::RaceStarted => log::info!("Go!"),
                    GameEvent::OverEarly => log::warn!("Over early!"),
                    GameEvent::WaypointPassed { index, total } => {
                        let hud = session.hud();
                        log::info!(
                            "Mark {}/{} at {:.1}s ({}, {:.1} kn)",
                            index,
                            total,
                            hud.elapsed_ms / 1000.0,
                            hud.point_of_sail.as_str(),
                            hud.boat.speed
                        );
                    }
                    GameEvent::RaceFinished {
                        elapsed_ms,
                        stars,
                        is_new_best,
                        dsq,
                        ghost_saved,
                    } => log::info!(
                        "Finished in {:.2}s: {} star(s){}{}{}",
                        elapsed_ms / 1000.0,
                        stars,
                        if is_new_best { ", new best" } else { "" },
                        if dsq { ", DSQ" } else { "" },
                        if ghost_saved { ", ghost saved" } else { "" }
                    ),
                    _ => {}
                }
            }
            elapsed += SIM_TICK_MS;

            if !ghost_lead_logged && session.race().elapsed_ms() >= 10_000.0 {
                if let Some(ghost) = session.ghost_frame() {
                    let gap = session.hud().boat.position.distance(glam::Vec2::new(ghost.x, ghost.y));
                    log::info!("Ghost is {:.0} units away at 10s", gap);
                }
                ghost_lead_logged = true;
            }
        }
        if !session.is_finished() {
            log::warn!("Autopilot gave up after {:.0}s", MAX_RACE_MS / 1000.0);
        }
    }

    fn courier(progression: Progression<MemoryStore>, tuning: &Tuning, seed: u64) {
        let mut session = CourierSession::new(progression, tuning, seed);
        let mut elapsed = 0.0;
        while !session.is_over() && elapsed < COURIER_DEMO_MS {
            let input = session.autopilot_input();
            for event in session.update(&input, SIM_TICK_MS) {
                match event {
                    GameEvent::Docked { island_id } => {
                        log::info!("Docked at {}", island_id);
                        if let Some(report) = session.interact() {
                            log::info!("{:?}", report);
                        }
                    }
                    GameEvent::CargoExpired { id } => log::warn!("Cargo {} expired", id),
                    GameEvent::CourierOver { earnings, high_score, .. } => {
                        log::info!("Session over: ${} (high score ${})", earnings, high_score);
                    }
                    _ => {}
                }
            }
            elapsed += SIM_TICK_MS;
        }
        log::info!(
            "Courier demo ended: ${} earned, {:.0}s left on the clock",
            session.state().earnings,
            session.state().remaining_ms() / 1000.0
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("WindRunner (native) starting...");

    if let Err(e) = headless::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser builds are driven by the host page through the library API
}
