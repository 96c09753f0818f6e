//! Unit, skill and effect catalog loader.
//!
//! A catalog file is a JSON object with optional `units`, `skills` and
//! `effects` sections:
//!
//! ```json
//! {
//!   "units":   [{ "id": "knight", "health": 120, "skills": ["rally"] }],
//!   "skills":  [{ "name": "rally", "type": "buff", "skillEffectId": "courage" }],
//!   "effects": { "courage": { "stat": "damage", "value": 5, "duration": 4000 } }
//! }
//! ```
//!
//! `effects` may also be an array whose entries carry their own `id`.

use std::path::Path;

use battle_core::{EffectSpec, SkillConfig, UnitTypeConfig, ValidationIssue};
use serde_json::{Map, Value};

use crate::catalog::ContentCatalog;
use crate::loaders::{LoadResult, read_file};

/// Parsed catalog plus the issues found while reading it.
#[derive(Clone, Debug, Default)]
pub struct LoadedCatalog {
    pub catalog: ContentCatalog,
    pub issues: Vec<ValidationIssue>,
}

impl LoadedCatalog {
    pub fn merge(&mut self, other: LoadedCatalog) {
        self.catalog.merge(other.catalog);
        self.issues.extend(other.issues);
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| issue.is_error())
    }
}

/// Loader for JSON content catalogs.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load a catalog from one JSON file.
    pub fn load(path: &Path) -> LoadResult<LoadedCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load catalog {}: {}", path.display(), e))
    }

    /// Load and merge every `*.json` file in `dir`, in file name order.
    pub fn load_dir(dir: &Path) -> LoadResult<LoadedCatalog> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?
        {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut loaded = LoadedCatalog::default();
        for path in paths {
            loaded.merge(Self::load(&path)?);
        }
        loaded.issues.extend(loaded.catalog.cross_check());
        tracing::debug!(
            target: "battle_content::loaders",
            dir = %dir.display(),
            entries = loaded.catalog.len(),
            issues = loaded.issues.len(),
            "catalog directory loaded"
        );
        Ok(loaded)
    }

    /// Parse a catalog document.
    pub fn parse(json: &str) -> LoadResult<LoadedCatalog> {
        let document: Value = serde_json::from_str(json)
            .map_err(|e| anyhow::anyhow!("Failed to parse catalog JSON: {}", e))?;
        let Value::Object(mut sections) = document else {
            anyhow::bail!("catalog root must be a JSON object");
        };

        let mut loaded = LoadedCatalog::default();
        if let Some(units) = sections.remove("units") {
            for entry in as_list(units, "units")? {
                load_unit(entry, &mut loaded);
            }
        }
        if let Some(skills) = sections.remove("skills") {
            for entry in as_list(skills, "skills")? {
                load_skill(entry, &mut loaded);
            }
        }
        if let Some(effects) = sections.remove("effects") {
            match effects {
                Value::Object(keyed) => {
                    for (id, entry) in keyed {
                        load_effect(Some(id), entry, &mut loaded);
                    }
                }
                Value::Array(list) => {
                    for entry in list {
                        load_effect(None, entry, &mut loaded);
                    }
                }
                _ => anyhow::bail!("'effects' must be an object or an array"),
            }
        }
        for unknown in sections.keys() {
            loaded.issues.push(ValidationIssue::warning(
                "catalog",
                format!("unknown catalog section '{unknown}'"),
            ));
        }
        Ok(loaded)
    }
}

fn as_list(value: Value, section: &str) -> LoadResult<Vec<Value>> {
    match value {
        Value::Array(list) => Ok(list),
        _ => anyhow::bail!("'{section}' must be an array"),
    }
}

fn entry_label(entry: &Value, key: &str) -> String {
    entry
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("<unnamed>")
        .to_string()
}

fn load_unit(entry: Value, loaded: &mut LoadedCatalog) {
    let label = entry_label(&entry, "id");
    match serde_json::from_value::<UnitTypeConfig>(entry) {
        Ok(mut unit) if !unit.id.trim().is_empty() => {
            if unit.name.is_empty() {
                unit.name = unit.id.clone();
            }
            if loaded.catalog.insert_unit(unit).is_some() {
                loaded.issues.push(ValidationIssue::warning(
                    &label,
                    format!("duplicate unit type '{label}'; the later entry wins"),
                ));
            }
        }
        Ok(_) => loaded
            .issues
            .push(ValidationIssue::error(&label, "unit type has no id")),
        Err(e) => loaded.issues.push(ValidationIssue::error(
            &label,
            format!("invalid unit type '{label}': {e}"),
        )),
    }
}

fn unknown_keys(object: &Map<String, Value>) -> Vec<String> {
    object
        .keys()
        .filter(|key| !SkillConfig::KNOWN_FIELDS.contains(&key.as_str()))
        .cloned()
        .collect()
}

fn load_skill(entry: Value, loaded: &mut LoadedCatalog) {
    let label = entry_label(&entry, "name");
    let unknown = entry.as_object().map(unknown_keys).unwrap_or_default();
    match serde_json::from_value::<SkillConfig>(entry) {
        Ok(mut skill) if !skill.name.trim().is_empty() => {
            skill.unknown_fields = unknown;
            if loaded.catalog.insert_skill(skill).is_some() {
                loaded.issues.push(ValidationIssue::warning(
                    &label,
                    format!("duplicate skill '{label}'; the later entry wins"),
                ));
            }
        }
        Ok(_) => loaded
            .issues
            .push(ValidationIssue::error(&label, "skill has no name")),
        Err(e) => loaded.issues.push(ValidationIssue::error(
            &label,
            format!("invalid skill '{label}': {e}"),
        )),
    }
}

fn load_effect(key: Option<String>, entry: Value, loaded: &mut LoadedCatalog) {
    let label = key.clone().unwrap_or_else(|| entry_label(&entry, "id"));
    let mut spec = match serde_json::from_value::<EffectSpec>(entry) {
        Ok(spec) => spec,
        Err(e) => {
            loaded.issues.push(ValidationIssue::error(
                &label,
                format!("invalid effect '{label}': {e}"),
            ));
            return;
        }
    };
    if spec.id.is_none() {
        spec.id = key;
    }
    match spec.resolve() {
        Ok(effect) => {
            if loaded.catalog.insert_effect(effect).is_some() {
                loaded.issues.push(ValidationIssue::warning(
                    &label,
                    format!("duplicate effect '{label}'; the later entry wins"),
                ));
            }
        }
        Err(e) => loaded
            .issues
            .push(ValidationIssue::error(&label, e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use battle_core::{ContentOracle, EffectKind, SkillKind, StatKind, TargetFlags};

    use super::*;

    const CATALOG: &str = r#"{
        "units": [
            { "id": "knight", "health": 120, "damage": 12, "speed": 1.5,
              "attack": { "type": "melee", "range": 12, "cooldownMs": 800 },
              "skills": ["rally"],
              "effects": { "death": "bones" } }
        ],
        "skills": [
            { "name": "rally", "type": "aura", "skillEffectId": "courage",
              "trigger": { "onSpawn": true }, "cooldwon": 5 }
        ],
        "effects": {
            "courage": { "stat": "damage", "value": 5, "duration": 4000,
                         "auraRadius": 120, "targetType": "allies,self" },
            "regen": { "healAmount": 3, "pulseInterval": 500 },
            "broken": { "stat": "luck", "value": 1 }
        }
    }"#;

    #[test]
    fn parses_every_section() {
        let loaded = CatalogLoader::parse(CATALOG).unwrap();
        let knight = loaded.catalog.unit_type("knight").unwrap();
        assert_eq!(knight.health, 120.0);
        assert_eq!(knight.attack.cooldown_ms, 800.0);
        assert_eq!(knight.effects.death.as_deref(), Some("bones"));
        assert_eq!(knight.name, "knight");

        let rally = loaded.catalog.skill("rally").unwrap();
        assert_eq!(rally.kind, SkillKind::Aura);
        assert!(rally.trigger.on_spawn);
        assert_eq!(rally.unknown_fields, vec!["cooldwon".to_string()]);

        let courage = loaded.catalog.effect("courage").unwrap();
        assert_eq!(courage.stat_delta(StatKind::Damage), 5.0);
        assert_eq!(courage.targets, TargetFlags::ALLIES | TargetFlags::SELF);
        assert!(matches!(
            loaded.catalog.effect("regen").unwrap().kind,
            EffectKind::Direct { heal, .. } if heal == 3.0
        ));
    }

    #[test]
    fn bad_entries_are_skipped_and_reported() {
        let loaded = CatalogLoader::parse(CATALOG).unwrap();
        assert!(loaded.catalog.effect("broken").is_none());
        let errors: Vec<_> = loaded.errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].source_id, "broken");
    }

    #[test]
    fn malformed_document_fails() {
        assert!(CatalogLoader::parse("[1, 2, 3]").is_err());
        assert!(CatalogLoader::parse(r#"{ "units": {} }"#).is_err());
        assert!(CatalogLoader::parse("{ not json").is_err());
    }

    #[test]
    fn effect_arrays_carry_their_own_ids() {
        let loaded = CatalogLoader::parse(
            r#"{ "effects": [ { "id": "guard", "shieldAmount": 10, "duration": 2000 } ] }"#,
        )
        .unwrap();
        let guard = loaded.catalog.effect("guard").unwrap();
        assert!(guard.has_shield());
        assert!(loaded.issues.is_empty());
    }
}
