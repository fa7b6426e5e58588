use std::fs;
use tempfile::TempDir;

use figment::providers::{Format, Toml};
use figment::Figment;
use hardtack_core::config::{resolve_with_base, Config, RetrievalSettings};
use hardtack_core::loader::RecipeLoader;
use hardtack_core::types::Dimension;

const CHILI: &str = r#"{
    "uuid": "6f1c1c64-2d5e-4a8e-9d0b-3a4c1b2d7e01",
    "dish_name": "Weeknight Chili",
    "tags": ["dinner", "spicy", "stew"],
    "shopping_list": ["ground beef", "kidney beans"],
    "source_name": "Serious Eats",
    "author": "Kenji",
    "user_rating": 4.0,
    "ingredients": {"ground beef": "1 lb"},
    "cooking_steps": ["Brown the beef.", "Simmer."],
    "active_time": 20,
    "total_time": 60,
    "spice_level": "medium"
}"#;

#[test]
fn load_directory_parses_recipes_and_keeps_unknown_keys() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("chili.json"), CHILI).unwrap();
    fs::write(dir.join("notes.txt"), "not a recipe").unwrap();

    let recipes = RecipeLoader::new().load_directory(dir).expect("load");

    assert_eq!(recipes.len(), 1, "only .json files are recipes");
    let chili = &recipes[0];
    assert_eq!(chili.rating, Some(4.0));
    assert_eq!(chili.active_time, Some(20));
    assert_eq!(chili.extra.get("spice_level").and_then(|v| v.as_str()), Some("medium"));
    assert_eq!(chili.dimension_text(Dimension::Tags), "dinner, spicy, stew");
    assert_eq!(chili.dimension_text(Dimension::SourceAuthor), "Serious Eats, Kenji");
}

#[test]
fn load_directory_skips_broken_files_and_assigns_missing_ids() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("a.json"), r#"{"dish_name": "Toast"}"#).unwrap();
    fs::write(dir.join("b.json"), "{ broken").unwrap();
    fs::write(dir.join("c.json"), r#"{"uuid": "", "dish_name": "Tea"}"#).unwrap();

    let recipes = RecipeLoader::new().load_directory(dir).expect("load");

    assert_eq!(recipes.len(), 2);
    assert_ne!(recipes[0].uuid, recipes[1].uuid);
}

#[test]
fn load_directory_limited_two_files_limit_one() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("a.json"), r#"{"dish_name": "Toast"}"#).unwrap();
    fs::write(dir.join("b.json"), r#"{"dish_name": "Tea"}"#).unwrap();

    let recipes = RecipeLoader::new().load_directory_limited(dir, 1).expect("load limited");

    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0].dish_name, "Toast", "files are visited in sorted order");
}

#[test]
fn retrieval_settings_default_when_section_missing() {
    let config = Config::from_figment(Figment::new()).expect("config");
    assert_eq!(config.retrieval().expect("retrieval"), RetrievalSettings::default());
    assert_eq!(config.data().expect("data").table, "recipes");
}

#[test]
fn retrieval_settings_override_from_toml() {
    let figment = Figment::new().merge(Toml::string(
        "[retrieval]\ntop_n = 5\nquery_timeout_ms = 250\n[data]\nrecords_dir = \"/srv/recipes\"\n",
    ));
    let config = Config::from_figment(figment).expect("config");
    let retrieval = config.retrieval().expect("retrieval");
    assert_eq!(retrieval.top_n, 5);
    assert_eq!(retrieval.num_matches, 5, "unset keys keep their defaults");
    assert_eq!(retrieval.query_timeout().as_millis(), 250);
    assert_eq!(config.data().expect("data").records_dir, "/srv/recipes");
}

#[test]
fn invalid_retrieval_settings_are_rejected() {
    let figment = Figment::new().merge(Toml::string("[retrieval]\nnum_matches = 0\n"));
    assert!(Config::from_figment(figment).is_err());
}

#[test]
fn relative_paths_resolve_against_base() {
    let base = std::path::Path::new("/opt/hardtack");
    assert_eq!(resolve_with_base(base, "data/recipe"), base.join("data/recipe"));
    assert_eq!(resolve_with_base(base, "/abs/dir"), std::path::PathBuf::from("/abs/dir"));
}
