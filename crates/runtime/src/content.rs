//! Asynchronous content sources and the cache the simulation reads from.
//!
//! The tick loop resolves content synchronously through
//! [`battle_core::ContentOracle`]. Sources that need I/O implement
//! [`ContentSource`] instead; [`CachedContentSource`] memoises what they return
//! and is prefetched before every spawn, so activation never waits.
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use battle_content::ContentCatalog;
use battle_core::{ContentOracle, EffectDefinition, SkillConfig, UnitTypeConfig};
use parking_lot::RwLock;

/// Failure raised by a content source while fetching an entry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("content source failed to fetch '{id}': {reason}")]
pub struct SourceError {
    pub id: String,
    pub reason: String,
}

impl SourceError {
    pub fn new(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Async lookup of authored content.
///
/// `Ok(None)` means the source answered and the entry does not exist.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_unit_type(&self, id: &str) -> Result<Option<Arc<UnitTypeConfig>>, SourceError>;

    async fn fetch_skill(&self, name: &str) -> Result<Option<Arc<SkillConfig>>, SourceError>;

    async fn fetch_effect(&self, id: &str) -> Result<Option<Arc<EffectDefinition>>, SourceError>;
}

#[async_trait]
impl ContentSource for ContentCatalog {
    async fn fetch_unit_type(&self, id: &str) -> Result<Option<Arc<UnitTypeConfig>>, SourceError> {
        Ok(self.unit_type(id))
    }

    async fn fetch_skill(&self, name: &str) -> Result<Option<Arc<SkillConfig>>, SourceError> {
        Ok(self.skill(name))
    }

    async fn fetch_effect(&self, id: &str) -> Result<Option<Arc<EffectDefinition>>, SourceError> {
        Ok(self.effect(id))
    }
}

#[async_trait]
impl<T: ContentSource + ?Sized> ContentSource for Arc<T> {
    async fn fetch_unit_type(&self, id: &str) -> Result<Option<Arc<UnitTypeConfig>>, SourceError> {
        (**self).fetch_unit_type(id).await
    }

    async fn fetch_skill(&self, name: &str) -> Result<Option<Arc<SkillConfig>>, SourceError> {
        (**self).fetch_skill(name).await
    }

    async fn fetch_effect(&self, id: &str) -> Result<Option<Arc<EffectDefinition>>, SourceError> {
        (**self).fetch_effect(id).await
    }
}

/// Content entry a prefetch could not find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRef {
    UnitType(String),
    Skill(String),
    Effect(String),
}

impl fmt::Display for ContentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnitType(id) => write!(f, "unit type '{id}'"),
            Self::Skill(name) => write!(f, "skill '{name}'"),
            Self::Effect(id) => write!(f, "effect '{id}'"),
        }
    }
}

/// What a prefetch pulled into the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefetchReport {
    pub unit_types: usize,
    pub skills: usize,
    pub effects: usize,
    pub missing: Vec<ContentRef>,
}

/// Memoising wrapper around a [`ContentSource`].
///
/// Implements [`ContentOracle`] over whatever has been fetched so far.
pub struct CachedContentSource {
    source: Arc<dyn ContentSource>,
    cache: RwLock<ContentCatalog>,
}

impl CachedContentSource {
    pub fn new(source: impl ContentSource + 'static) -> Self {
        Self::from_shared(Arc::new(source))
    }

    pub fn from_shared(source: Arc<dyn ContentSource>) -> Self {
        Self {
            source,
            cache: RwLock::new(ContentCatalog::new()),
        }
    }

    /// Number of cached entries across all three kinds.
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }

    pub async fn fetch_unit_type(&self, id: &str) -> Result<Option<Arc<UnitTypeConfig>>, SourceError> {
        let cached = self.cache.read().unit_type(id);
        if cached.is_some() {
            return Ok(cached);
        }
        let fetched = self.source.fetch_unit_type(id).await?;
        if let Some(config) = &fetched {
            self.cache.write().insert_shared_unit(Arc::clone(config));
        }
        Ok(fetched)
    }

    pub async fn fetch_skill(&self, name: &str) -> Result<Option<Arc<SkillConfig>>, SourceError> {
        let cached = self.cache.read().skill(name);
        if cached.is_some() {
            return Ok(cached);
        }
        let fetched = self.source.fetch_skill(name).await?;
        if let Some(config) = &fetched {
            self.cache.write().insert_shared_skill(Arc::clone(config));
        }
        Ok(fetched)
    }

    pub async fn fetch_effect(&self, id: &str) -> Result<Option<Arc<EffectDefinition>>, SourceError> {
        let cached = self.cache.read().effect(id);
        if cached.is_some() {
            return Ok(cached);
        }
        let fetched = self.source.fetch_effect(id).await?;
        if let Some(effect) = &fetched {
            self.cache.write().insert_shared_effect(Arc::clone(effect));
        }
        Ok(fetched)
    }

    /// Pulls a unit type and everything it can reach into the cache: its
    /// skills, their effects (following forwarding ids and projectile
    /// effects) and the unit types its summons create.
    ///
    /// Missing entries are listed in the report, not treated as errors; the
    /// simulation reports them with context when they are actually used.
    pub async fn prefetch_unit(&self, unit_type: &str) -> Result<PrefetchReport, SourceError> {
        let mut report = PrefetchReport::default();
        let mut pending_units = vec![unit_type.to_string()];
        let mut seen_units = HashSet::new();
        let mut seen_skills = HashSet::new();
        let mut seen_effects = HashSet::new();

        while let Some(unit_id) = pending_units.pop() {
            if !seen_units.insert(unit_id.clone()) {
                continue;
            }
            let Some(unit) = self.fetch_unit_type(&unit_id).await? else {
                report.missing.push(ContentRef::UnitType(unit_id));
                continue;
            };
            report.unit_types += 1;

            for name in &unit.skills {
                if !seen_skills.insert(name.clone()) {
                    continue;
                }
                let Some(skill) = self.fetch_skill(name).await? else {
                    report.missing.push(ContentRef::Skill(name.clone()));
                    continue;
                };
                report.skills += 1;

                let mut effects: Vec<String> = skill.skill_effect_id.iter().cloned().collect();
                if let Some(projectile) = &skill.projectile {
                    effects.extend(projectile.effects.iter().cloned());
                }
                while let Some(effect_id) = effects.pop() {
                    if !seen_effects.insert(effect_id.clone()) {
                        continue;
                    }
                    match self.fetch_effect(&effect_id).await? {
                        Some(effect) => {
                            report.effects += 1;
                            if let Some(next) = effect.forwards_to() {
                                effects.push(next.to_string());
                            }
                        }
                        None => report.missing.push(ContentRef::Effect(effect_id)),
                    }
                }

                if let Some(summoned) = skill
                    .summon_properties
                    .as_ref()
                    .and_then(|props| props.unit_type.clone())
                {
                    pending_units.push(summoned);
                }
            }
        }

        tracing::debug!(
            target: "battle_runtime::content",
            unit_type,
            unit_types = report.unit_types,
            skills = report.skills,
            effects = report.effects,
            missing = report.missing.len(),
            "prefetched unit content"
        );
        Ok(report)
    }
}

impl ContentOracle for CachedContentSource {
    fn unit_type(&self, id: &str) -> Option<Arc<UnitTypeConfig>> {
        self.cache.read().unit_type(id)
    }

    fn skill(&self, name: &str) -> Option<Arc<SkillConfig>> {
        self.cache.read().skill(name)
    }

    fn effect(&self, id: &str) -> Option<Arc<EffectDefinition>> {
        self.cache.read().effect(id)
    }
}
