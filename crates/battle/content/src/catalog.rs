//! In-memory content catalog.
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use battle_core::{ContentOracle, EffectDefinition, SkillConfig, UnitTypeConfig, ValidationIssue};

/// Unit types, skills and effects keyed by id.
///
/// Entries are shared behind `Arc` so the simulation and the runtime cache can
/// hold the same definitions without copying.
#[derive(Clone, Debug, Default)]
pub struct ContentCatalog {
    units: HashMap<String, Arc<UnitTypeConfig>>,
    skills: HashMap<String, Arc<SkillConfig>>,
    effects: HashMap<String, Arc<EffectDefinition>>,
}

impl ContentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a unit type, returning the one it replaced.
    pub fn insert_unit(&mut self, config: UnitTypeConfig) -> Option<Arc<UnitTypeConfig>> {
        self.units.insert(config.id.clone(), Arc::new(config))
    }

    pub fn insert_skill(&mut self, config: SkillConfig) -> Option<Arc<SkillConfig>> {
        self.skills.insert(config.name.clone(), Arc::new(config))
    }

    pub fn insert_effect(&mut self, effect: EffectDefinition) -> Option<Arc<EffectDefinition>> {
        self.effects.insert(effect.id.clone(), Arc::new(effect))
    }

    pub fn insert_shared_unit(&mut self, config: Arc<UnitTypeConfig>) {
        self.units.insert(config.id.clone(), config);
    }

    pub fn insert_shared_skill(&mut self, config: Arc<SkillConfig>) {
        self.skills.insert(config.name.clone(), config);
    }

    pub fn insert_shared_effect(&mut self, effect: Arc<EffectDefinition>) {
        self.effects.insert(effect.id.clone(), effect);
    }

    #[must_use]
    pub fn with_unit(mut self, config: UnitTypeConfig) -> Self {
        self.insert_unit(config);
        self
    }

    #[must_use]
    pub fn with_skill(mut self, config: SkillConfig) -> Self {
        self.insert_skill(config);
        self
    }

    #[must_use]
    pub fn with_effect(mut self, effect: EffectDefinition) -> Self {
        self.insert_effect(effect);
        self
    }

    /// Copies every entry of `other` over this catalog.
    pub fn merge(&mut self, other: ContentCatalog) {
        self.units.extend(other.units);
        self.skills.extend(other.skills);
        self.effects.extend(other.effects);
    }

    pub fn unit_ids(&self) -> BTreeSet<&str> {
        self.units.keys().map(String::as_str).collect()
    }

    pub fn skill_names(&self) -> BTreeSet<&str> {
        self.skills.keys().map(String::as_str).collect()
    }

    pub fn effect_ids(&self) -> BTreeSet<&str> {
        self.effects.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.units.len() + self.skills.len() + self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dangling references between entries. Every issue is a warning: the
    /// simulation reports the same problems again, with context, when a unit
    /// actually tries to use them.
    pub fn cross_check(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let mut units: Vec<_> = self.units.values().collect();
        units.sort_by(|a, b| a.id.cmp(&b.id));
        for unit in units {
            for skill in unit.skills.iter().filter(|s| !self.skills.contains_key(*s)) {
                issues.push(ValidationIssue::warning(
                    &unit.id,
                    format!("unit type '{}' lists unknown skill '{skill}'", unit.id),
                ));
            }
        }

        let mut skills: Vec<_> = self.skills.values().collect();
        skills.sort_by(|a, b| a.name.cmp(&b.name));
        for skill in skills {
            let mut referenced: Vec<&str> = skill.skill_effect_id.as_deref().into_iter().collect();
            if let Some(projectile) = &skill.projectile {
                referenced.extend(projectile.effects.iter().map(String::as_str));
            }
            for effect in referenced.into_iter().filter(|e| !self.effects.contains_key(*e)) {
                issues.push(ValidationIssue::warning(
                    &skill.name,
                    format!("skill '{}' references unknown effect '{effect}'", skill.name),
                ));
            }
            if let Some(unit_type) = skill
                .summon_properties
                .as_ref()
                .and_then(|props| props.unit_type.as_deref())
                .filter(|unit_type| !self.units.contains_key(*unit_type))
            {
                issues.push(ValidationIssue::warning(
                    &skill.name,
                    format!("skill '{}' summons unknown unit type '{unit_type}'", skill.name),
                ));
            }
        }

        let mut effects: Vec<_> = self.effects.values().collect();
        effects.sort_by(|a, b| a.id.cmp(&b.id));
        for effect in effects {
            if let Some(target) = effect.forwards_to()
                && !self.effects.contains_key(target)
            {
                issues.push(ValidationIssue::warning(
                    &effect.id,
                    format!("effect '{}' forwards to unknown effect '{target}'", effect.id),
                ));
            }
        }
        issues
    }
}

impl ContentOracle for ContentCatalog {
    fn unit_type(&self, id: &str) -> Option<Arc<UnitTypeConfig>> {
        self.units.get(id).cloned()
    }

    fn skill(&self, name: &str) -> Option<Arc<SkillConfig>> {
        self.skills.get(name).cloned()
    }

    fn effect(&self, id: &str) -> Option<Arc<EffectDefinition>> {
        self.effects.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use battle_core::{SkillKind, StatKind};

    use super::*;

    #[test]
    fn lookups_share_the_stored_entry() {
        let catalog = ContentCatalog::new()
            .with_effect(EffectDefinition::stat("haste", StatKind::Speed, 1.0));
        let a = catalog.effect("haste").unwrap();
        let b = catalog.effect("haste").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(catalog.effect("missing").is_none());
    }

    #[test]
    fn cross_check_flags_dangling_references() {
        let catalog = ContentCatalog::new()
            .with_unit(UnitTypeConfig::new("knight", 100.0, 10.0, 1.0).with_skill("charge"))
            .with_skill(SkillConfig::new("rally", SkillKind::Buff).with_effect("courage"))
            .with_effect(EffectDefinition::forwarding("relay", "nowhere"));

        let issues = catalog.cross_check();
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|issue| !issue.is_error()));
        assert!(issues[0].message.contains("charge"));
        assert!(issues[1].message.contains("courage"));
        assert!(issues[2].message.contains("nowhere"));
    }

    #[test]
    fn merge_overrides_by_id() {
        let mut base = ContentCatalog::new().with_unit(UnitTypeConfig::new("knight", 100.0, 10.0, 1.0));
        base.merge(ContentCatalog::new().with_unit(UnitTypeConfig::new("knight", 150.0, 10.0, 1.0)));
        assert_eq!(base.unit_type("knight").unwrap().health, 150.0);
        assert_eq!(base.len(), 1);
    }
}
