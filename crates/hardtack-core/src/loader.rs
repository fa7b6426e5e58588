use anyhow::Result;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::types::Recipe;

#[derive(Default)]
pub struct RecipeLoader;

impl RecipeLoader {
    pub fn new() -> Self { Self }

    pub fn load_directory(&self, data_dir: &Path) -> Result<Vec<Recipe>> {
        let files = self.list_json_files(data_dir);
        self.load_files(data_dir, &files)
    }

    pub fn load_directory_limited(&self, data_dir: &Path, limit: usize) -> Result<Vec<Recipe>> {
        let mut files = self.list_json_files(data_dir);
        if files.len() > limit { files.truncate(limit); info!(limit, "limited recipe files"); }
        self.load_files(data_dir, &files)
    }

    fn load_files(&self, data_dir: &Path, files: &[PathBuf]) -> Result<Vec<Recipe>> {
        if files.is_empty() { warn!(dir = %data_dir.display(), "no .json recipe files found"); return Ok(vec![]); }
        let mut recipes = Vec::with_capacity(files.len());
        for (file_index, file_path) in files.iter().enumerate() {
            info!(file = %file_path.display(), "loading recipe {}/{}", file_index + 1, files.len());
            match self.read_recipe(file_path) {
                Ok(recipe) => recipes.push(recipe),
                Err(e) => warn!(file = %file_path.display(), error = %e, "skipping unreadable recipe"),
            }
        }
        info!(files = files.len(), recipes = recipes.len(), "loaded recipes");
        Ok(recipes)
    }

    /// Parses one recipe file. A recipe without a `uuid` is assigned a fresh one.
    pub fn read_recipe(&self, file_path: &Path) -> Result<Recipe> {
        let content = fs::read_to_string(file_path)?;
        let mut value: Value = serde_json::from_str(&content)?;
        if let Value::Object(map) = &mut value {
            let missing = map.get("uuid").map_or(true, |v| v.is_null() || v.as_str().is_some_and(str::is_empty));
            if missing { map.insert("uuid".into(), Value::String(uuid::Uuid::new_v4().to_string())); }
        }
        Ok(serde_json::from_value(value)?)
    }

    fn list_json_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut json_files = Vec::new();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path(); if path.extension().and_then(|s| s.to_str()) == Some("json") { json_files.push(path.to_path_buf()); }
        }
        json_files.sort(); json_files
    }
}
