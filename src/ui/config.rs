use std::{
    fs::File,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use gt7dash::{DashboardError, analysis::VarianceOptions};

const CONFIG_DIR_NAME: &str = "gt7dash";
const CONFIG_FILE_NAME: &str = "config.json";
pub(crate) const DEFAULT_DIAGRAM_WIDTH: f32 = 1000.;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) diagram_width: f32,
    pub(crate) variance: VarianceOptions,
    pub(crate) last_telemetry_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            diagram_width: DEFAULT_DIAGRAM_WIDTH,
            variance: VarianceOptions::default(),
            last_telemetry_file: None,
        }
    }
}

fn local_config_path() -> Result<PathBuf, DashboardError> {
    Ok(dirs::config_dir()
        .ok_or(DashboardError::NoConfigDir)?
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME))
}

impl AppConfig {
    /// Reads the config from the user's config directory, `None` when nothing was saved yet.
    pub(crate) fn from_local_file() -> Result<Option<Self>, DashboardError> {
        Self::from_file(&local_config_path()?)
    }

    pub(crate) fn from_file(config_path: &Path) -> Result<Option<Self>, DashboardError> {
        if !config_path.exists() {
            return Ok(None);
        }
        let file = File::open(config_path).map_err(|e| DashboardError::ConfigIOError { source: e })?;
        serde_json::from_reader(file)
            .map(Some)
            .map_err(|e| DashboardError::ConfigParseError { source: e })
    }

    pub(crate) fn save(&self) -> Result<(), DashboardError> {
        self.save_to(&local_config_path()?)
    }

    pub(crate) fn save_to(&self, config_path: &Path) -> Result<(), DashboardError> {
        if let Some(parent) = config_path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| DashboardError::ConfigIOError { source: e })?;
        }

        let file = File::create(config_path).map_err(|e| DashboardError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self).map_err(|e| DashboardError::ConfigSerializeError { source: e })
    }
}
