use std::sync::Arc;

use crate::effect::EffectDefinition;
use crate::env::UnitTypeConfig;
use crate::skill::SkillConfig;

/// Resolves authored content by id.
///
/// Lookups are synchronous: asynchronous, cache-backed loading happens in the
/// runtime before a spawn so the tick loop never waits on I/O.
pub trait ContentOracle: Send + Sync {
    fn unit_type(&self, id: &str) -> Option<Arc<UnitTypeConfig>>;

    fn skill(&self, name: &str) -> Option<Arc<SkillConfig>>;

    fn effect(&self, id: &str) -> Option<Arc<EffectDefinition>>;
}
