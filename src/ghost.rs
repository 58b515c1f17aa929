//! Ghost recording and replay
//!
//! The recorder samples the boat at a fixed rate while the race clock runs;
//! the player replays a stored run with linear interpolation between samples.
//! Stored as `{courseIndex, time, inputData: [{t, x, y, h, s}]}`.

use serde::{Deserialize, Serialize};

use crate::sim::BoatSnapshot;

/// One recorded sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GhostFrame {
    /// Race time (ms since the gun)
    pub t: f64,
    pub x: f32,
    pub y: f32,
    #[serde(rename = "h", alias = "heading")]
    pub heading: f32,
    #[serde(rename = "s", alias = "sailTrim")]
    pub sail_trim: f32,
}

/// A complete recorded run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GhostData {
    pub course_index: usize,
    /// Finish time (ms)
    pub time: f64,
    #[serde(rename = "inputData", alias = "frames")]
    pub frames: Vec<GhostFrame>,
}

/// Fixed-rate sampler for the live boat
#[derive(Debug, Clone, Default)]
pub struct GhostRecorder {
    frames: Vec<GhostFrame>,
    interval_ms: f64,
    next_sample_at: f64,
}

impl GhostRecorder {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            frames: Vec::new(),
            interval_ms: if interval_ms > 0.0 { interval_ms } else { 100.0 },
            next_sample_at: 0.0,
        }
    }

    pub fn frames(&self) -> &[GhostFrame] {
        &self.frames
    }

    /// Offer the boat state at race time `elapsed_ms`; kept if a sample is due
    pub fn record(&mut self, elapsed_ms: f64, boat: &BoatSnapshot) -> bool {
        if elapsed_ms < self.next_sample_at {
            return false;
        }
        self.frames.push(GhostFrame {
            t: elapsed_ms,
            x: boat.position.x,
            y: boat.position.y,
            heading: boat.heading,
            sail_trim: boat.sail_trim,
        });
        // Schedule on the fixed grid so sampling does not drift with tick jitter
        while self.next_sample_at <= elapsed_ms {
            self.next_sample_at += self.interval_ms;
        }
        true
    }

    /// Always keep the finishing pose, whether or not a sample is due
    pub fn record_final(&mut self, elapsed_ms: f64, boat: &BoatSnapshot) {
        if self.frames.last().is_some_and(|f| f.t == elapsed_ms) {
            return;
        }
        self.frames.push(GhostFrame {
            t: elapsed_ms,
            x: boat.position.x,
            y: boat.position.y,
            heading: boat.heading,
            sail_trim: boat.sail_trim,
        });
    }

    /// Drop everything recorded so far (race aborted)
    pub fn reset(&mut self) {
        self.frames.clear();
        self.next_sample_at = 0.0;
    }

    /// Package the run, leaving the recorder empty
    pub fn finish(&mut self, course_index: usize, time_ms: f64) -> GhostData {
        let frames = std::mem::take(&mut self.frames);
        self.next_sample_at = 0.0;
        GhostData {
            course_index,
            time: time_ms,
            frames,
        }
    }
}

/// Interpolated replay of a stored run
#[derive(Debug, Clone)]
pub struct GhostPlayer {
    data: GhostData,
    index: usize,
}

impl GhostPlayer {
    pub fn new(data: GhostData) -> Self {
        Self { data, index: 0 }
    }

    pub fn data(&self) -> &GhostData {
        &self.data
    }

    /// Ghost pose at race time `elapsed_ms`.
    ///
    /// Position and heading are interpolated; sail trim is taken from the
    /// earlier frame. Past the end the last frame is held.
    pub fn sample(&mut self, elapsed_ms: f64) -> Option<GhostFrame> {
        let frames = &self.data.frames;
        let first = frames.first()?;

        if elapsed_ms < frames[self.index.min(frames.len() - 1)].t {
            // Time went backwards: restart the scan
            self.index = 0;
        }
        if elapsed_ms <= first.t {
            return Some(*first);
        }
        while self.index + 1 < frames.len() && frames[self.index + 1].t <= elapsed_ms {
            self.index += 1;
        }

        let current = frames[self.index];
        let Some(next) = frames.get(self.index + 1) else {
            return Some(current);
        };

        let span = next.t - current.t;
        let alpha = if span > 0.0 {
            ((elapsed_ms - current.t) / span).clamp(0.0, 1.0) as f32
        } else {
            0.0
        };
        Some(GhostFrame {
            t: elapsed_ms,
            x: current.x + (next.x - current.x) * alpha,
            y: current.y + (next.y - current.y) * alpha,
            heading: current.heading + (next.heading - current.heading) * alpha,
            sail_trim: current.sail_trim,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::BoatState;
    use crate::tuning::BoatTuning;
    use glam::Vec2;

    fn frame(t: f64, x: f32, heading: f32, sail_trim: f32) -> GhostFrame {
        GhostFrame {
            t,
            x,
            y: 0.0,
            heading,
            sail_trim,
        }
    }

    fn player() -> GhostPlayer {
        GhostPlayer::new(GhostData {
            course_index: 0,
            time: 200.0,
            frames: vec![
                frame(0.0, 0.0, 0.0, 10.0),
                frame(100.0, 10.0, 20.0, 30.0),
                frame(200.0, 30.0, 40.0, 50.0),
            ],
        })
    }

    #[test]
    fn test_recorder_samples_at_fixed_rate() {
        let mut recorder = GhostRecorder::new(100.0);
        let boat = BoatState::new(Vec2::new(1.0, 2.0), 45.0, &BoatTuning::default()).snapshot();

        let mut t = 0.0;
        while t <= 1_000.0 {
            recorder.record(t, &boat);
            t += 1000.0 / 60.0;
        }
        // Samples at 0, 100, ..., 1000 (the last one lands just under 1000)
        let frames = recorder.frames();
        assert!(frames.len() == 10 || frames.len() == 11);
        for pair in frames.windows(2) {
            let gap = pair[1].t - pair[0].t;
            assert!(gap > 80.0 && gap < 120.0, "gap {gap}");
        }
        assert_eq!(frames[0].heading, 45.0);

        let ghost = recorder.finish(2, 1_000.0);
        assert_eq!(ghost.course_index, 2);
        assert!(recorder.frames().is_empty());
    }

    #[test]
    fn test_recorder_reset() {
        let mut recorder = GhostRecorder::new(100.0);
        let boat = BoatState::new(Vec2::ZERO, 0.0, &BoatTuning::default()).snapshot();
        recorder.record(0.0, &boat);
        recorder.record(150.0, &boat);
        recorder.reset();
        assert!(recorder.frames().is_empty());
        assert!(recorder.record(0.0, &boat));
    }

    #[test]
    fn test_final_pose_between_samples() {
        let mut recorder = GhostRecorder::new(100.0);
        let boat = BoatState::new(Vec2::new(5.0, 6.0), 90.0, &BoatTuning::default()).snapshot();
        recorder.record(0.0, &boat);
        // 50 ms is not due on the 100 ms grid
        assert!(!recorder.record(50.0, &boat));
        recorder.record_final(50.0, &boat);
        // Not duplicated when repeated
        recorder.record_final(50.0, &boat);

        let ghost = recorder.finish(0, 50.0);
        assert_eq!(ghost.frames.len(), 2);
        let last = ghost.frames.last().unwrap();
        assert_eq!(last.t, ghost.time);
        assert_eq!(last.heading, 90.0);
    }

    #[test]
    fn test_player_interpolates() {
        let mut player = player();
        let f = player.sample(50.0).unwrap();
        assert_eq!(f.x, 5.0);
        assert_eq!(f.heading, 10.0);
        // Trim is stepped, not blended
        assert_eq!(f.sail_trim, 10.0);

        let f = player.sample(150.0).unwrap();
        assert_eq!(f.x, 20.0);
        assert_eq!(f.heading, 30.0);
        assert_eq!(f.sail_trim, 30.0);
    }

    #[test]
    fn test_player_holds_last_frame() {
        let mut player = player();
        let f = player.sample(10_000.0).unwrap();
        assert_eq!(f.x, 30.0);
        assert_eq!(f.heading, 40.0);
        assert_eq!(f.sail_trim, 50.0);
    }

    #[test]
    fn test_player_rewinds() {
        let mut player = player();
        player.sample(190.0);
        let f = player.sample(50.0).unwrap();
        assert_eq!(f.x, 5.0);
    }

    #[test]
    fn test_empty_ghost() {
        let mut player = GhostPlayer::new(GhostData {
            course_index: 0,
            time: 0.0,
            frames: Vec::new(),
        });
        assert!(player.sample(10.0).is_none());
    }

    #[test]
    fn test_json_layout() {
        let ghost = GhostData {
            course_index: 1,
            time: 42_000.0,
            frames: vec![frame(0.0, 1.0, 2.0, 3.0)],
        };
        let json = serde_json::to_value(&ghost).unwrap();
        assert_eq!(json["courseIndex"], 1);
        assert_eq!(json["inputData"][0]["h"], 2.0);
        assert_eq!(json["inputData"][0]["s"], 3.0);

        let long_names = r#"{"courseIndex":0,"time":5,"inputData":[{"t":0,"x":1,"y":2,"heading":3,"sailTrim":4}]}"#;
        let parsed: GhostData = serde_json::from_str(long_names).unwrap();
        assert_eq!(parsed.frames[0].sail_trim, 4.0);
    }
}
