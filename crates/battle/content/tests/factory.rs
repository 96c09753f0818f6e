use std::fs;

use battle_content::ContentFactory;
use battle_core::{
    BattleEngine, BattleEnv, ContentOracle, MemoryDiagnostics, NullFx, PcgRng, TeamId, World,
};
use tempfile::TempDir;

const UNITS: &str = r#"{
    "units": [
        { "id": "knight", "health": 120, "damage": 15, "speed": 2,
          "attack": { "type": "melee", "range": 10, "cooldownMs": 600 },
          "skills": ["rally"] },
        { "id": "archer", "health": 80, "damage": 9, "speed": 1.5,
          "attack": { "type": "ranged", "range": 220, "cooldownMs": 900, "projectileSpeed": 7 } }
    ]
}"#;

const SKILLS: &str = r#"{
    "skills": [
        { "name": "rally", "type": "buff", "skillEffectId": "courage",
          "trigger": { "onSpawn": true } },
        { "name": "orphan", "type": "debuff", "skillEffectId": "missing",
          "trigger": { "onAttack": true } }
    ]
}"#;

const EFFECTS: &str = r#"{
    "effects": {
        "courage": { "stat": "damage", "value": 5, "duration": 3000 }
    }
}"#;

const SCENARIO: &str = r#"
matchId = "ridge"

[[teams]]
id = 1
name = "Red"

[[teams]]
id = 2
name = "Blue"

[[spawns]]
unitType = "knight"
team = 1
x = 200.0
y = 300.0
count = 2

[[spawns]]
unitType = "archer"
team = 2
x = 900.0
y = 300.0
"#;

fn data_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let catalog = dir.path().join("catalog");
    fs::create_dir_all(&catalog).unwrap();
    fs::create_dir_all(dir.path().join("scenarios")).unwrap();
    fs::write(catalog.join("units.json"), UNITS).unwrap();
    fs::write(catalog.join("skills.json"), SKILLS).unwrap();
    fs::write(catalog.join("effects.json"), EFFECTS).unwrap();
    fs::write(catalog.join("notes.txt"), "ignored").unwrap();
    fs::write(dir.path().join("config.toml"), "arenaWidth = 1000.0\nseed = 3\n").unwrap();
    fs::write(dir.path().join("scenarios").join("ridge.toml"), SCENARIO).unwrap();
    dir
}

#[test]
fn loads_a_whole_data_directory() {
    let dir = data_dir();
    let factory = ContentFactory::new(dir.path());

    let config = factory.load_config().unwrap();
    assert_eq!(config.arena_width, 1000.0);
    assert_eq!(config.seed, 3);

    let loaded = factory.load_catalog().unwrap();
    assert_eq!(loaded.catalog.unit_ids().len(), 2);
    assert_eq!(loaded.catalog.skill_names().len(), 2);
    assert!(loaded.errors().next().is_none());
    assert_eq!(loaded.issues.len(), 1);
    assert!(loaded.issues[0].message.contains("missing"));

    let scenario = factory.load_scenario("ridge").unwrap();
    assert_eq!(scenario.spawn_requests().len(), 3);
    assert!(scenario.validate().is_empty());
}

#[test]
fn loaded_content_drives_a_match() {
    let dir = data_dir();
    let factory = ContentFactory::new(dir.path());
    let catalog = factory.load_catalog().unwrap().catalog;
    let scenario = factory.load_scenario("ridge").unwrap();
    let config = scenario.configure(factory.load_config().unwrap());

    let mut world = World::new(config).with_match_id("ridge");
    scenario.register(world.ledger_mut());
    let diagnostics = MemoryDiagnostics::new();
    let env = BattleEnv::with_all(&catalog, &NullFx, &diagnostics, &PcgRng);

    let mut engine = BattleEngine::new(&mut world, env);
    for request in scenario.spawn_requests() {
        engine.spawn(request).unwrap();
    }
    let knight = engine.world().units().next().map(|u| u.id).unwrap();
    assert!(engine.world().unit(knight).unwrap().skill("rally").unwrap().is_active());

    let mut over = false;
    for _ in 0..20_000 {
        if engine.tick(16.0).game_over {
            over = true;
            break;
        }
    }
    assert!(over);
    assert!(world.winner().is_some());
    assert!(diagnostics.errors().is_empty());
    assert_eq!(world.ledger().team_name(TeamId(1)), Some("Red"));
    assert!(catalog.unit_type("knight").is_some());
}

#[test]
fn unreadable_catalog_reports_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = dir.path().join("catalog");
    fs::create_dir_all(&catalog).unwrap();
    fs::write(catalog.join("broken.json"), "{ nope").unwrap();

    let err = ContentFactory::new(dir.path()).load_catalog().unwrap_err();
    assert!(err.to_string().contains("broken.json"));
}
