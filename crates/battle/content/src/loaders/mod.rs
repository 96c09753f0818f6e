//! Content loaders for reading battle data from files.
//!
//! Catalogs (unit types, skills, effects) are JSON; battle configuration and
//! scenarios are TOML. Malformed files fail the load; malformed entries inside
//! a well-formed file are skipped and reported as [`battle_core::ValidationIssue`]s.

pub mod catalog;
pub mod config;
pub mod factory;
pub mod scenario;

pub use catalog::{CatalogLoader, LoadedCatalog};
pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use scenario::ScenarioLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
