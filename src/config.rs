use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::detection::{self, DEFAULT_SMOOTHING_DIAMETER};
use crate::error::{ReconError, Result};
use crate::placement::{LengthUnit, UnitSystem};

pub const SETTINGS_FILE: &str = "orthocloud.json";

/// Values the pipeline takes from its host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub canny_low: u32,
    pub canny_high: u32,
    pub smoothing_diameter: u32,
    pub unit_system: UnitSystem,
    pub length_unit: LengthUnit,
    /// Sub-directory of the project holding `{image}-pts.txt` files
    pub points_dir: PathBuf,
    /// Sub-directory of the project holding imported edge/contour rasters
    pub artifacts_dir: PathBuf,
    pub contour_seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canny_low: 100,
            canny_high: 200,
            smoothing_diameter: DEFAULT_SMOOTHING_DIAMETER,
            unit_system: UnitSystem::Metric,
            length_unit: LengthUnit::Meters,
            points_dir: PathBuf::from("points"),
            artifacts_dir: PathBuf::from("artifacts"),
            contour_seed: 12345,
        }
    }
}

impl Settings {
    /// Load `orthocloud.json` from the project directory, defaults when absent
    pub fn load(project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(SETTINGS_FILE);
        if !path.is_file() {
            log::debug!("no {} in {}, using defaults", SETTINGS_FILE, project_dir.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)?;
        let settings: Settings = serde_json::from_str(&text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, project_dir: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::create_dir_all(project_dir)?;
        std::fs::write(project_dir.join(SETTINGS_FILE), json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        detection::validate_thresholds(self.canny_low, self.canny_high)?;
        if self.smoothing_diameter == 0 || self.smoothing_diameter % 2 == 0 {
            return Err(ReconError::InvalidSettings(format!(
                "smoothing diameter must be odd and positive, got {}",
                self.smoothing_diameter
            )));
        }
        let dirs = [("points_dir", &self.points_dir), ("artifacts_dir", &self.artifacts_dir)];
        for (label, dir) in dirs {
            if dir.is_absolute() {
                return Err(ReconError::InvalidSettings(format!(
                    "{} must be relative to the project, got {}",
                    label,
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        Settings::default().validate().unwrap();
    }

    #[test]
    fn even_smoothing_diameter_is_rejected() {
        let settings = Settings {
            smoothing_diameter: 8,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(ReconError::InvalidSettings(_))));
    }

    #[test]
    fn output_directories_stay_inside_the_project() {
        let settings = Settings {
            points_dir: PathBuf::from("/tmp/points"),
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(ReconError::InvalidSettings(_))));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "length_unit": "centimeters" }"#).unwrap();
        assert_eq!(LengthUnit::Centimeters, settings.length_unit);
        assert_eq!(100, settings.canny_low);
    }
}
