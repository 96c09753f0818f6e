//! Data-driven battle content and loaders.
//!
//! This crate houses the in-memory content catalog the simulation reads unit
//! types, skills and effects from, plus loaders for the files they are
//! authored in:
//! - Content catalogs (JSON)
//! - Battle configuration (TOML)
//! - Match scenarios (TOML)
//!
//! Content is consumed through [`battle_core::ContentOracle`] and never
//! appears in world state.

pub mod catalog;
pub mod scenario;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use catalog::ContentCatalog;
pub use scenario::{AiSpec, Scenario, SpawnSpec, TeamSpec};

#[cfg(feature = "loaders")]
pub use loaders::{
    CatalogLoader, ConfigLoader, ContentFactory, LoadResult, LoadedCatalog, ScenarioLoader,
};
