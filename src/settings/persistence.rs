use super::SpectrogramSettings;
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub fn config_dir() -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("specview")
}

#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    pub data: SpectrogramSettings,
}

impl SettingsStore {
    pub fn load_or_default() -> Self {
        Self::load_from(config_dir().join("settings.json"))
    }

    /// Reads `path`, falling back to defaults when it is missing or broken.
    pub fn load_from(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut data: SpectrogramSettings = fs::read_to_string(&path)
            .ok()
            .and_then(|s| {
                serde_json::from_str(&s)
                    .map_err(|e| warn!("[settings] parse error {path:?}: {e}"))
                    .ok()
            })
            .unwrap_or_default();
        data.sanitize();
        Self { path, data }
    }

    /// Reads a file the caller named explicitly. A missing file, broken JSON
    /// or an invalid value is an error rather than a fallback to defaults.
    pub fn load_strict(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let json = fs::read_to_string(&path)?;
        let data = SpectrogramSettings::from_json_strict(&json)
            .inspect_err(|e| warn!("[settings] rejected {path:?}: {e}"))?;
        Ok(Self { path, data })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn settings(&self) -> &SpectrogramSettings {
        &self.data
    }

    pub fn update<F: FnOnce(&mut SpectrogramSettings) -> R, R>(&mut self, mutate: F) -> R {
        let result = mutate(&mut self.data);
        self.data.sanitize();
        result
    }

    /// Writes `<name>.json.tmp` and renames it over the target.
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.data)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &json)
            .and_then(|()| fs::rename(&temp_path, &self.path))
            .inspect_err(|e| warn!("[settings] failed to persist {:?}: {e}", self.path))?;
        debug!("[settings] saved {:?}", self.path);
        Ok(())
    }
}
