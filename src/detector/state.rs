//! Persisted change-detector state

use crate::MirrorError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

const REQUIRED_KEYS: [&str; 3] = ["lastRun", "lastChangelogTimestamp", "knownUrls"];

/// What the previous run saw
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeDetectorState {
    pub last_run: Option<DateTime<Utc>>,
    pub last_changelog_timestamp: Option<String>,
    pub known_urls: Vec<String>,
}

impl ChangeDetectorState {
    /// Loads the state, falling back to defaults
    ///
    /// A missing file, invalid JSON, or an object lacking any of the three
    /// keys all count as "no previous run".
    pub fn load(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };

        let value: Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Detector state {} is not valid JSON: {}", path.display(), e);
                return Self::default();
            }
        };

        let complete = value
            .as_object()
            .is_some_and(|map| REQUIRED_KEYS.iter().all(|key| map.contains_key(*key)));
        if !complete {
            tracing::warn!("Detector state {} is incomplete, ignoring it", path.display());
            return Self::default();
        }

        serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!("Detector state {} has invalid fields: {}", path.display(), e);
            Self::default()
        })
    }

    /// Writes the state as pretty-printed JSON, creating the parent directory
    pub fn save(&self, path: &Path) -> Result<(), MirrorError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
