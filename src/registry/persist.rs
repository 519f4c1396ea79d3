//! JSON persistence for the registry

use crate::registry::{Registry, RegistryEntry};
use crate::MirrorError;
use serde_json::Value;
use std::fs;
use std::path::Path;

impl Registry {
    /// Writes the registry as a pretty-printed JSON array, creating the
    /// parent directory if needed
    pub fn save(&self, path: &Path) -> Result<(), MirrorError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let entries: Vec<&RegistryEntry> = self.get_all();
        let json = serde_json::to_string_pretty(&entries)?;
        fs::write(path, json)?;

        tracing::debug!("Saved {} registry entries to {}", entries.len(), path.display());
        Ok(())
    }

    /// Loads a registry, degrading to an empty one instead of failing
    ///
    /// A missing or unreadable file, invalid JSON, or a payload that is not
    /// an array all yield an empty registry. Array elements that are not
    /// valid entries are skipped.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("No registry at {} ({}), starting empty", path.display(), e);
                return Self::new();
            }
        };

        let items = match serde_json::from_str::<Value>(&content) {
            Ok(Value::Array(items)) => items,
            Ok(_) => {
                tracing::warn!("Registry {} is not a JSON array, ignoring it", path.display());
                return Self::new();
            }
            Err(e) => {
                tracing::warn!("Registry {} is not valid JSON: {}", path.display(), e);
                return Self::new();
            }
        };

        let total = items.len();
        let entries: Vec<RegistryEntry> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect();

        if entries.len() < total {
            tracing::warn!(
                "Skipped {} malformed registry entries in {}",
                total - entries.len(),
                path.display()
            );
        }

        Self::from_entries(entries)
    }
}
