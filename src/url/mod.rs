//! URL handling module for kb-mirror
//!
//! This module provides host matching, URL categorization and slug derivation.

mod categorize;
mod domain;
mod matcher;
mod slug;

pub use categorize::{categorize, CategoryRules, UNKNOWN_CATEGORY};
pub use domain::extract_domain;
pub use matcher::matches_wildcard;
pub use slug::slugify;
