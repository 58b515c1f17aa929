//! Sail physics
//!
//! Stateless functions mapping boat and wind state to target speed and heel.
//! Angles are degrees (0 = north, clockwise); sail trim runs 0 (tight) to
//! 100 (loose).

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::relative_wind_angle;

/// Qualitative sailing angle relative to the wind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointOfSail {
    NoGo,
    CloseHauled,
    BeamReach,
    BroadReach,
    Running,
}

impl PointOfSail {
    pub fn as_str(&self) -> &'static str {
        match self {
            PointOfSail::NoGo => "No-Go",
            PointOfSail::CloseHauled => "Close Hauled",
            PointOfSail::BeamReach => "Beam Reach",
            PointOfSail::BroadReach => "Broad Reach",
            PointOfSail::Running => "Running",
        }
    }
}

/// Linear interpolation between two anchor points
#[inline]
fn lerp_segment(x: f32, (x0, y0): (f32, f32), (x1, y1): (f32, f32)) -> f32 {
    let t = ((x - x0) / (x1 - x0)).clamp(0.0, 1.0);
    y0 + (y1 - y0) * t
}

/// Boat-speed efficiency for a relative wind angle (0 inside the no-go zone)
pub fn angle_efficiency(relative_angle: f32) -> f32 {
    if relative_angle < NO_GO_ZONE_ANGLE {
        return 0.0;
    }
    let curve = &SPEED_EFFICIENCY_CURVE;
    for pair in curve.windows(2) {
        if relative_angle <= pair[1].0 {
            return lerp_segment(relative_angle, pair[0], pair[1]);
        }
    }
    curve[curve.len() - 1].1
}

/// Fraction of the true wind captured as heeling force.
///
/// Coarser than [`angle_efficiency`]: zero in the no-go zone, ramps to full
/// capture at a beam reach and holds there.
pub fn force_efficiency(relative_angle: f32) -> f32 {
    if relative_angle < NO_GO_ZONE_ANGLE {
        0.0
    } else {
        ((relative_angle - NO_GO_ZONE_ANGLE) / (90.0 - NO_GO_ZONE_ANGLE)).clamp(0.0, 1.0)
    }
}

/// Trim that extracts the most drive at a relative wind angle
pub fn optimal_trim(relative_angle: f32) -> f32 {
    ((relative_angle - NO_GO_ZONE_ANGLE) / (180.0 - NO_GO_ZONE_ANGLE) * 100.0).clamp(0.0, 100.0)
}

/// Efficiency lost to a trim that is off the optimum
pub fn trim_efficiency(sail_trim: f32, optimal: f32) -> f32 {
    (1.0 - (sail_trim - optimal).abs() / TRIM_TOLERANCE).max(0.0)
}

/// Target boat speed (knots) for the given heading, wind and trim
pub fn calculate_boat_speed(heading: f32, wind_angle: f32, wind_speed: f32, sail_trim: f32) -> f32 {
    let relative = relative_wind_angle(heading, wind_angle);
    if relative < NO_GO_ZONE_ANGLE {
        return 0.0;
    }

    let speed = wind_speed
        * angle_efficiency(relative)
        * trim_efficiency(sail_trim, optimal_trim(relative));

    if speed.is_finite() {
        speed.clamp(0.0, MAX_BOAT_SPEED)
    } else {
        0.0
    }
}

/// Wind force on the rig (knots of captured wind)
pub fn wind_force(heading: f32, wind_angle: f32, wind_speed: f32) -> f32 {
    wind_speed.max(0.0) * force_efficiency(relative_wind_angle(heading, wind_angle))
}

/// Heel angle produced by a wind force at the given trim and boat speed
pub fn calculate_heel_angle(wind_force: f32, sail_trim: f32, boat_speed: f32) -> f32 {
    let sail_exposure = (sail_trim / 100.0).clamp(0.0, 1.0);
    let speed_ratio = (boat_speed / MAX_BOAT_SPEED).clamp(0.0, 1.0);
    let speed_reduction = 1.0 - speed_ratio * HEEL_SPEED_DAMPING;

    let heel = wind_force * sail_exposure * speed_reduction * HEEL_SENSITIVITY;
    if heel.is_finite() {
        heel.clamp(0.0, MAX_HEEL)
    } else {
        0.0
    }
}

/// Speed multiplier for a heel angle.
///
/// Flat 0.7 when sailing too upright, ramps to the 15-25° plateau, then falls
/// off as the boat is overpowered. Continuous at every breakpoint.
pub fn heel_speed_multiplier(heel: f32) -> f32 {
    let heel = heel.clamp(0.0, MAX_HEEL);
    if (15.0..=25.0).contains(&heel) {
        1.0
    } else if heel <= 10.0 {
        0.7
    } else if heel < 15.0 {
        lerp_segment(heel, (10.0, 0.7), (15.0, 1.0))
    } else if heel <= 30.0 {
        lerp_segment(heel, (25.0, 1.0), (30.0, 0.8))
    } else {
        lerp_segment(heel, (30.0, 0.8), (MAX_HEEL, 0.6))
    }
}

/// Classify the relative wind angle
pub fn point_of_sail(heading: f32, wind_angle: f32) -> PointOfSail {
    let relative = relative_wind_angle(heading, wind_angle);
    if relative < NO_GO_ZONE_ANGLE {
        PointOfSail::NoGo
    } else if relative < 90.0 {
        PointOfSail::CloseHauled
    } else if relative < 135.0 {
        PointOfSail::BeamReach
    } else if relative < 160.0 {
        PointOfSail::BroadReach
    } else {
        PointOfSail::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f32 = 1e-4;

    #[test]
    fn test_head_to_wind_is_stopped() {
        for trim in [0.0, 25.0, 50.0, 100.0] {
            assert_eq!(calculate_boat_speed(0.0, 0.0, 10.0, trim), 0.0);
            assert_eq!(calculate_boat_speed(0.0, 0.0, 25.0, trim), 0.0);
        }
    }

    #[test]
    fn test_beam_reach_clamps_to_max_speed() {
        let trim = optimal_trim(90.0);
        assert!((trim - 100.0 / 3.0).abs() < EPS);
        // 10 kn * 1.0 * 1.0 = 10, capped at 8
        assert_eq!(calculate_boat_speed(90.0, 0.0, 10.0, trim), MAX_BOAT_SPEED);
    }

    #[test]
    fn test_efficiency_anchors() {
        assert!((angle_efficiency(45.0) - 0.5).abs() < EPS);
        assert!((angle_efficiency(90.0) - 1.0).abs() < EPS);
        assert!((angle_efficiency(135.0) - 0.85).abs() < EPS);
        assert!((angle_efficiency(180.0) - 0.6).abs() < EPS);
        assert!((angle_efficiency(67.5) - 0.75).abs() < EPS);
        assert_eq!(angle_efficiency(44.9), 0.0);
    }

    #[test]
    fn test_speed_continuous_at_segment_joins() {
        for join in [90.0f32, 135.0] {
            let below = calculate_boat_speed(join - 0.001, 0.0, 6.0, optimal_trim(join));
            let at = calculate_boat_speed(join, 0.0, 6.0, optimal_trim(join));
            let above = calculate_boat_speed(join + 0.001, 0.0, 6.0, optimal_trim(join));
            assert!((below - at).abs() < 1e-2, "jump below {join}");
            assert!((above - at).abs() < 1e-2, "jump above {join}");
        }
    }

    #[test]
    fn test_trim_efficiency() {
        assert_eq!(trim_efficiency(50.0, 50.0), 1.0);
        assert!((trim_efficiency(25.0, 50.0) - 0.5).abs() < EPS);
        assert_eq!(trim_efficiency(100.0, 0.0), 0.0);
    }

    #[test]
    fn test_force_efficiency_distinct_from_speed_curve() {
        assert_eq!(force_efficiency(45.0), 0.0);
        assert!((force_efficiency(67.5) - 0.5).abs() < EPS);
        assert_eq!(force_efficiency(90.0), 1.0);
        assert_eq!(force_efficiency(170.0), 1.0);
        // Speed curve already drives at 0.5 on the no-go boundary
        assert!(angle_efficiency(45.0) > force_efficiency(45.0));
    }

    #[test]
    fn test_heel_angle() {
        // Sail fully eased, stationary: 10 * 1 * 1 * 4 = 40
        assert!((calculate_heel_angle(10.0, 100.0, 0.0) - 40.0).abs() < EPS);
        // Full speed sheds 30% of heel
        assert!((calculate_heel_angle(10.0, 100.0, MAX_BOAT_SPEED) - 28.0).abs() < EPS);
        // Sheeted in tight: no exposure
        assert_eq!(calculate_heel_angle(10.0, 0.0, 0.0), 0.0);
        // Clamped
        assert_eq!(calculate_heel_angle(100.0, 100.0, 0.0), MAX_HEEL);
        assert_eq!(calculate_heel_angle(f32::NAN, 50.0, 0.0), 0.0);
    }

    #[test]
    fn test_heel_multiplier_breakpoints() {
        assert_eq!(heel_speed_multiplier(0.0), 0.7);
        assert_eq!(heel_speed_multiplier(10.0), 0.7);
        assert!((heel_speed_multiplier(12.5) - 0.85).abs() < EPS);
        assert_eq!(heel_speed_multiplier(15.0), 1.0);
        assert_eq!(heel_speed_multiplier(20.0), 1.0);
        assert_eq!(heel_speed_multiplier(25.0), 1.0);
        assert!((heel_speed_multiplier(30.0) - 0.8).abs() < EPS);
        assert!((heel_speed_multiplier(45.0) - 0.6).abs() < EPS);
        assert!((heel_speed_multiplier(60.0) - 0.6).abs() < EPS);
    }

    #[test]
    fn test_point_of_sail() {
        assert_eq!(point_of_sail(0.0, 0.0), PointOfSail::NoGo);
        assert_eq!(point_of_sail(44.0, 0.0), PointOfSail::NoGo);
        assert_eq!(point_of_sail(45.0, 0.0), PointOfSail::CloseHauled);
        assert_eq!(point_of_sail(90.0, 0.0), PointOfSail::BeamReach);
        assert_eq!(point_of_sail(140.0, 0.0), PointOfSail::BroadReach);
        assert_eq!(point_of_sail(180.0, 0.0), PointOfSail::Running);
        assert_eq!(point_of_sail(-100.0, 0.0), PointOfSail::BeamReach);
    }

    proptest! {
        #[test]
        fn prop_no_go_zone_has_no_drive(
            wind in 0.0f32..360.0,
            offset in -44.99f32..44.99,
            speed in 0.0f32..40.0,
            trim in 0.0f32..100.0,
        ) {
            prop_assert_eq!(calculate_boat_speed(wind + offset, wind, speed, trim), 0.0);
        }

        #[test]
        fn prop_speed_within_bounds(
            heading in -720.0f32..720.0,
            wind in 0.0f32..360.0,
            speed in 0.0f32..40.0,
            trim in 0.0f32..100.0,
        ) {
            let v = calculate_boat_speed(heading, wind, speed, trim);
            prop_assert!(v >= 0.0 && v <= MAX_BOAT_SPEED);
        }

        #[test]
        fn prop_heel_multiplier_continuous(heel in 0.0f32..45.0) {
            let a = heel_speed_multiplier(heel);
            let b = heel_speed_multiplier(heel + 0.01);
            prop_assert!((a - b).abs() < 0.01);
            prop_assert!(a >= 0.6 && a <= 1.0);
        }

        #[test]
        fn prop_heel_plateau(heel in 15.0f32..=25.0) {
            prop_assert_eq!(heel_speed_multiplier(heel), 1.0);
        }
    }
}
