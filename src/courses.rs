//! Built-in course table

use crate::error::{Error, Result};
use crate::sim::{CourseDef, PointDef, StartLineDef, StartPos};

fn pts(points: &[(f32, f32)]) -> Vec<PointDef> {
    points.iter().map(|&(x, y)| PointDef { x, y }).collect()
}

/// The shipped courses, easiest first
pub fn builtin() -> Vec<CourseDef> {
    vec![
        CourseDef {
            name: "Triangle Course (Beginner)".into(),
            waypoints: pts(&[(300.0, 500.0), (900.0, 200.0), (900.0, 600.0)]),
            start_line: Some(StartLineDef {
                x1: 200.0,
                y1: 650.0,
                x2: 400.0,
                y2: 650.0,
            }),
            start_pos: StartPos {
                x: 300.0,
                y: 680.0,
                heading: 0.0,
            },
            gold_time: 45_000.0,
            silver_time: 60_000.0,
            bronze_time: 90_000.0,
            unlock_stars: 0,
        },
        CourseDef {
            name: "Windward-Leeward (Intermediate)".into(),
            waypoints: pts(&[(640.0, 100.0), (640.0, 600.0), (640.0, 100.0), (640.0, 600.0)]),
            start_line: Some(StartLineDef {
                x1: 500.0,
                y1: 650.0,
                x2: 780.0,
                y2: 650.0,
            }),
            start_pos: StartPos {
                x: 640.0,
                y: 680.0,
                heading: 0.0,
            },
            gold_time: 90_000.0,
            silver_time: 120_000.0,
            bronze_time: 160_000.0,
            unlock_stars: 2,
        },
        CourseDef {
            name: "Olympic (Advanced)".into(),
            waypoints: pts(&[
                (640.0, 150.0),
                (1000.0, 350.0),
                (280.0, 350.0),
                (640.0, 150.0),
                (640.0, 600.0),
            ]),
            start_line: Some(StartLineDef {
                x1: 500.0,
                y1: 650.0,
                x2: 780.0,
                y2: 650.0,
            }),
            start_pos: StartPos {
                x: 640.0,
                y: 680.0,
                heading: 0.0,
            },
            gold_time: 120_000.0,
            silver_time: 160_000.0,
            bronze_time: 220_000.0,
            unlock_stars: 5,
        },
    ]
}

/// Look a course up, failing fast on a bad index
pub fn course(courses: &[CourseDef], index: usize) -> Result<&CourseDef> {
    courses.get(index).ok_or(Error::UnknownCourse {
        index,
        count: courses.len(),
    })
}

/// Parse a course list in the external JSON schema
pub fn from_json(json: &str) -> Result<Vec<CourseDef>> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_thresholds_are_ordered() {
        for def in builtin() {
            assert!(def.gold_time <= def.silver_time, "{}", def.name);
            assert!(def.silver_time <= def.bronze_time, "{}", def.name);
            assert!(!def.waypoints.is_empty());
        }
    }

    #[test]
    fn test_unknown_course_fails_fast() {
        let courses = builtin();
        assert!(course(&courses, 0).is_ok());
        let err = course(&courses, 7).unwrap_err();
        assert!(matches!(err, Error::UnknownCourse { index: 7, count: 3 }));
    }

    #[test]
    fn test_json_roundtrip_of_table() {
        let json = serde_json::to_string(&builtin()).unwrap();
        assert_eq!(from_json(&json).unwrap(), builtin());
        assert!(from_json("[{}]").is_err());
    }
}
