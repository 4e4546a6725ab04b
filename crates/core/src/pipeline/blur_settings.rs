use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::blurring::domain::boundary_policy::BoundaryPolicy;
use crate::blurring::infrastructure::engine_factory::{ContributionVariant, EngineOptions};
use crate::shared::constants::DEFAULT_WEIGHT_SCALE;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    Invalid(String),
}

/// Blur configuration as stored in a JSON settings file. Missing fields
/// take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurSettings {
    pub boundary: BoundaryPolicy,
    pub variant: ContributionVariant,
    pub weight_scale: f64,
    pub workers: Option<usize>,
    /// Directory that receives one PNG per processed mask sample.
    pub debug_frames: Option<PathBuf>,
}

impl Default for BlurSettings {
    fn default() -> Self {
        Self {
            boundary: BoundaryPolicy::default(),
            variant: ContributionVariant::default(),
            weight_scale: DEFAULT_WEIGHT_SCALE,
            workers: None,
            debug_frames: None,
        }
    }
}

impl BlurSettings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded settings from {}: {settings:?}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SettingsError::Invalid(format!("cannot serialize settings: {e}")))
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.weight_scale > 0.0 && self.weight_scale <= 1.0) {
            return Err(SettingsError::Invalid(format!(
                "weight_scale must be in (0, 1], got {}",
                self.weight_scale
            )));
        }
        if self.workers == Some(0) {
            return Err(SettingsError::Invalid(
                "workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            boundary: self.boundary,
            variant: self.variant,
            weight_scale: self.weight_scale,
            workers: self.workers,
        }
    }
}
