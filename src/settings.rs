//! Runtime settings
//!
//! Loaded from a JSON file next to the binary. Every field has a default, so
//! a partial file (or none at all) is fine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_DT, SIM_DT};

/// Default settings file name
pub const SETTINGS_FILE: &str = "astro_rogue_settings.json";

/// Runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Progression save file
    pub save_path: PathBuf,
    /// RNG seed; taken from the clock when unset
    pub seed: Option<u64>,
    /// Largest frame delta fed to the accumulator
    pub max_frame_dt: f32,
    /// Fixed simulation step
    pub sim_dt: f32,
    /// Simulated seconds the headless autopilot plays before giving up
    pub autopilot_seconds: f32,
    /// Autopilot runs to play back to back
    pub autopilot_runs: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from("astro_rogue_save.json"),
            seed: None,
            max_frame_dt: 0.1,
            sim_dt: SIM_DT,
            autopilot_seconds: 600.0,
            autopilot_runs: 1,
        }
    }
}

impl Settings {
    /// Load from `path`, falling back to defaults when missing or malformed
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<Settings>(&json) {
                Ok(settings) => settings.validated(),
                Err(e) => {
                    log::warn!("Ignoring malformed settings in {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!("No settings file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Clamp steps into the range the simulation supports
    pub fn validated(mut self) -> Self {
        if self.sim_dt.is_nan() || self.sim_dt <= 0.0 || self.sim_dt > MAX_DT {
            log::warn!("sim_dt {} out of range, using {}", self.sim_dt, SIM_DT);
            self.sim_dt = SIM_DT;
        }
        if self.max_frame_dt.is_nan() || self.max_frame_dt < self.sim_dt {
            self.max_frame_dt = self.sim_dt;
        }
        self.autopilot_seconds = self.autopilot_seconds.max(0.0);
        self.autopilot_runs = self.autopilot_runs.max(1);
        self
    }

    /// Configured seed, or one derived from the wall clock
    pub fn seed_or_clock(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "seed": 42 }"#).unwrap();
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.sim_dt, SIM_DT);
        assert_eq!(settings.save_path, Settings::default().save_path);
    }

    #[test]
    fn test_validated_repairs_bad_steps() {
        let settings = Settings {
            sim_dt: 0.5,
            max_frame_dt: -1.0,
            autopilot_runs: 0,
            ..Default::default()
        }
        .validated();
        assert_eq!(settings.sim_dt, SIM_DT);
        assert_eq!(settings.max_frame_dt, SIM_DT);
        assert_eq!(settings.autopilot_runs, 1);
    }

    #[test]
    fn test_missing_file_is_default() {
        let settings = Settings::load(Path::new("/definitely/not/here.json"));
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_fixed_seed_wins_over_clock() {
        let settings = Settings {
            seed: Some(7),
            ..Default::default()
        };
        assert_eq!(settings.seed_or_clock(), 7);
    }
}
