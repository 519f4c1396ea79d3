//! Provenance and lifecycle states for registry entries
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a registry entry was first discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UrlSource {
    /// Listed in the site's sitemap
    Sitemap,

    /// Configured seed URL outside the sitemap
    ExternalSeed,

    /// Added by hand
    Manual,
}

/// Lifecycle status of a registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlStatus {
    Active,

    /// Explicitly retired (e.g. dropped from the sitemap)
    Stale,

    /// Last fetch attempt failed
    Failed,
}

impl UrlStatus {
    /// Returns true if this entry should still be synced
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Stale => "stale",
            Self::Failed => "failed",
        }
    }
}

impl UrlSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sitemap => "sitemap",
            Self::ExternalSeed => "external-seed",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for UrlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for UrlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
