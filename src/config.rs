//! Session Settings
//! Remembers the chosen dataset files and filter year between runs,
//! persisted as JSON under the user config directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_ATTENDANCE_YEAR: i32 = 2020;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sites_csv: Option<PathBuf>,
    pub attendance_csv: Option<PathBuf>,
    pub attendance_year: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sites_csv: None,
            attendance_csv: None,
            attendance_year: DEFAULT_ATTENDANCE_YEAR,
        }
    }
}

fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("heritage_dash").join("settings.json"))
}

impl Settings {
    /// Load saved settings; missing or corrupt files fall back to defaults.
    pub fn load() -> Self {
        let Some(path) = settings_path() else {
            return Self::default();
        };
        match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring corrupt settings file");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist the current settings.
    pub fn save(&self) -> Result<()> {
        let path = settings_path().context("no user config directory available")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(&path, raw).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_2020() {
        let settings = Settings::default();
        assert_eq!(settings.attendance_year, 2020);
        assert!(settings.sites_csv.is_none());
    }

    #[test]
    fn settings_round_trip_through_json() {
        let settings = Settings {
            sites_csv: Some(PathBuf::from("/data/sites.csv")),
            attendance_csv: Some(PathBuf::from("/data/attendance.csv")),
            attendance_year: 2019,
        };
        let raw = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.attendance_year, 2019);
        assert_eq!(back.sites_csv, settings.sites_csv);
    }

    #[test]
    fn unknown_or_missing_fields_are_tolerated() {
        let back: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(back.attendance_year, 2020);
    }
}
