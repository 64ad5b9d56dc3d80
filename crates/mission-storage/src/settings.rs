//! Operator settings persisted as a single object.

use std::path::{Path, PathBuf};

use tracing::info;

use mission_types::Settings;

use crate::{JsonDocument, Result, StoreError};

pub struct SettingsStore {
    document: JsonDocument<Settings>,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            document: JsonDocument::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.document.path()
    }

    /// Stored settings as-is, or the defaults when no file exists.
    pub fn get(&self) -> Settings {
        self.document.load(Settings::default())
    }

    /// Shallow-merge `patch` over the stored settings and persist.
    pub fn update(&self, patch: Settings) -> Result<Settings> {
        let mut settings = self.document.read()?.unwrap_or_default();
        settings.apply_patch(patch);
        if !self.document.save(&settings) {
            return Err(StoreError::Persistence(self.path().to_path_buf()));
        }
        info!("Settings updated");
        Ok(settings)
    }
}
