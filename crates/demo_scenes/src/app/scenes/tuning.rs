use std::env;
use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub(crate) const TUNING_ENV_VAR: &str = "DEMOS_TUNING";
const DEFAULT_TUNING_FILE: &str = "tuning.json";

/// Potions take distinct grid columns and rows, so the shorter axis caps the count.
pub(crate) const MAX_POTION_COUNT: usize = 29;

/// Gameplay constants shared by the demo scenes. Every field is optional in
/// the JSON file and falls back to its default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SceneTuning {
    pub(crate) movement_speed_px_per_ms: f32,
    pub(crate) gravity_speed_px_per_ms: f32,
    pub(crate) interact_lock_ms: u64,
    pub(crate) gravity_lock_ms: u64,
    pub(crate) chest_step_window_ms: u64,
    pub(crate) chest_frame_count: usize,
    pub(crate) swing_ms: u64,
    pub(crate) swing_cooldown_ms: u64,
    pub(crate) swing_extent_degrees: f32,
    pub(crate) clock_rate_degrees_per_second: f32,
    pub(crate) potion_count: usize,
}

impl Default for SceneTuning {
    fn default() -> Self {
        Self {
            movement_speed_px_per_ms: 0.5,
            gravity_speed_px_per_ms: 0.1,
            interact_lock_ms: 400,
            gravity_lock_ms: 400,
            chest_step_window_ms: 2000,
            chest_frame_count: 3,
            swing_ms: 50,
            swing_cooldown_ms: 200,
            swing_extent_degrees: 60.0,
            clock_rate_degrees_per_second: std::f32::consts::TAU * 10.0,
            potion_count: 15,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse tuning file {path} at {field}: {source}")]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid tuning value at {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Loads tuning from `$DEMOS_TUNING`, or `<root>/assets/tuning.json`.
/// A missing default file yields the defaults; a missing explicit file is an
/// error.
pub(crate) fn load_tuning(root: &Path) -> Result<SceneTuning, TuningError> {
    match env::var_os(TUNING_ENV_VAR) {
        Some(explicit) => load_tuning_file(Path::new(&explicit)),
        None => {
            let path = root.join("assets").join(DEFAULT_TUNING_FILE);
            if path.is_file() {
                load_tuning_file(&path)
            } else {
                Ok(SceneTuning::default())
            }
        }
    }
}

pub(crate) fn load_tuning_file(path: &Path) -> Result<SceneTuning, TuningError> {
    let raw = fs::read_to_string(path).map_err(|source| TuningError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let tuning = parse_tuning_json(path, &raw)?;
    validate_tuning(&tuning)?;
    Ok(tuning)
}

fn parse_tuning_json(path: &Path, raw: &str) -> Result<SceneTuning, TuningError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, SceneTuning>(&mut deserializer).map_err(|error| {
        let field = error.path().to_string();
        TuningError::Parse {
            path: path.to_path_buf(),
            field,
            source: error.into_inner(),
        }
    })
}

fn expected_actual(field: &'static str, expected: &str, actual: impl Display) -> TuningError {
    TuningError::Invalid {
        field,
        message: format!("expected {expected}, got {actual}"),
    }
}

pub(crate) fn validate_tuning(tuning: &SceneTuning) -> Result<(), TuningError> {
    let positive_speeds = [
        ("movement_speed_px_per_ms", tuning.movement_speed_px_per_ms),
        ("gravity_speed_px_per_ms", tuning.gravity_speed_px_per_ms),
    ];
    for (field, value) in positive_speeds {
        if !value.is_finite() || value <= 0.0 {
            return Err(expected_actual(field, "finite number > 0", value));
        }
    }

    let finite_angles = [
        ("swing_extent_degrees", tuning.swing_extent_degrees),
        (
            "clock_rate_degrees_per_second",
            tuning.clock_rate_degrees_per_second,
        ),
    ];
    for (field, value) in finite_angles {
        if !value.is_finite() {
            return Err(expected_actual(field, "finite number", value));
        }
    }

    let locks = [
        ("interact_lock_ms", tuning.interact_lock_ms),
        ("gravity_lock_ms", tuning.gravity_lock_ms),
        ("chest_step_window_ms", tuning.chest_step_window_ms),
        ("swing_ms", tuning.swing_ms),
    ];
    for (field, value) in locks {
        if value == 0 {
            return Err(expected_actual(field, "duration > 0 ms", value));
        }
    }

    if tuning.chest_frame_count < 2 {
        return Err(expected_actual(
            "chest_frame_count",
            "at least 2 frames",
            tuning.chest_frame_count,
        ));
    }
    if tuning.potion_count == 0 || tuning.potion_count > MAX_POTION_COUNT {
        return Err(expected_actual(
            "potion_count",
            "1..=29",
            tuning.potion_count,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_tuning(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join(DEFAULT_TUNING_FILE);
        fs::write(&path, body).expect("write tuning");
        path
    }

    #[test]
    fn defaults_are_valid() {
        let tuning = SceneTuning::default();
        validate_tuning(&tuning).expect("defaults should validate");
        assert!((tuning.clock_rate_degrees_per_second - 62.831_85).abs() < 0.001);
        assert_eq!(tuning.potion_count, 15);
    }

    #[test]
    fn partial_file_fills_missing_fields_with_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = write_tuning(temp.path(), r#"{ "movement_speed_px_per_ms": 0.25 }"#);

        let tuning = load_tuning_file(&path).expect("load");
        assert!((tuning.movement_speed_px_per_ms - 0.25).abs() < 0.0001);
        assert_eq!(tuning.interact_lock_ms, 400);
        assert_eq!(tuning.chest_frame_count, 3);
    }

    #[test]
    fn missing_default_file_yields_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        if env::var_os(TUNING_ENV_VAR).is_some() {
            return;
        }
        let tuning = load_tuning(temp.path()).expect("defaults");
        assert_eq!(tuning, SceneTuning::default());
    }

    #[test]
    fn default_file_under_assets_is_picked_up() {
        let temp = tempfile::tempdir().expect("tempdir");
        if env::var_os(TUNING_ENV_VAR).is_some() {
            return;
        }
        let assets = temp.path().join("assets");
        fs::create_dir(&assets).expect("assets dir");
        write_tuning(&assets, r#"{ "potion_count": 5 }"#);

        let tuning = load_tuning(temp.path()).expect("load");
        assert_eq!(tuning.potion_count, 5);
    }

    #[test]
    fn explicit_missing_file_is_read_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let error = load_tuning_file(&temp.path().join("absent.json")).expect_err("missing");
        assert!(matches!(error, TuningError::Read { .. }));
    }

    #[test]
    fn type_error_reports_field_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = write_tuning(temp.path(), r#"{ "swing_ms": "fast" }"#);

        match load_tuning_file(&path) {
            Err(TuningError::Parse { field, .. }) => assert_eq!(field, "swing_ms"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_field_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = write_tuning(temp.path(), r#"{ "warp_speed": 9 }"#);
        assert!(matches!(
            load_tuning_file(&path),
            Err(TuningError::Parse { .. })
        ));
    }

    #[test]
    fn single_chest_frame_is_invalid() {
        let tuning = SceneTuning {
            chest_frame_count: 1,
            ..SceneTuning::default()
        };
        match validate_tuning(&tuning) {
            Err(TuningError::Invalid { field, .. }) => assert_eq!(field, "chest_frame_count"),
            other => panic!("expected invalid, got {other:?}"),
        }
    }

    #[test]
    fn zero_lock_and_bad_speed_are_invalid() {
        let zero_lock = SceneTuning {
            gravity_lock_ms: 0,
            ..SceneTuning::default()
        };
        assert!(matches!(
            validate_tuning(&zero_lock),
            Err(TuningError::Invalid { field: "gravity_lock_ms", .. })
        ));

        let nan_speed = SceneTuning {
            movement_speed_px_per_ms: f32::NAN,
            ..SceneTuning::default()
        };
        assert!(matches!(
            validate_tuning(&nan_speed),
            Err(TuningError::Invalid {
                field: "movement_speed_px_per_ms",
                ..
            })
        ));
    }

    #[test]
    fn potion_count_is_capped_by_grid() {
        let tuning = SceneTuning {
            potion_count: MAX_POTION_COUNT + 1,
            ..SceneTuning::default()
        };
        assert!(validate_tuning(&tuning).is_err());
    }
}
