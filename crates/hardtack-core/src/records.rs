//! File-backed record store: one pretty-printed JSON document per recipe,
//! named `<uuid>.json`.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::traits::RecordStore;
use crate::types::{Recipe, RecipeId};

#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    root: PathBuf,
}

impl JsonRecordStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn record_path(&self, id: &RecipeId) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    /// Whether a record file exists. IO failures other than absence are errors.
    pub async fn contains(&self, id: &RecipeId) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.record_path(id)).await?)
    }
}

#[async_trait]
impl RecordStore for JsonRecordStore {
    async fn get_record(&self, id: &RecipeId) -> Result<Recipe> {
        let path = self.record_path(id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound(format!("no record for {id} at {}", path.display())))
            }
            Err(e) => return Err(e.into()),
        };
        let recipe: Recipe = serde_json::from_slice(&bytes)?;
        if recipe.uuid != *id {
            return Err(Error::Operation(format!(
                "record at {} carries uuid {} instead of {id}",
                path.display(),
                recipe.uuid
            )));
        }
        Ok(recipe)
    }

    async fn put_record(&self, recipe: &Recipe) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.record_path(&recipe.uuid);
        let body = serde_json::to_vec_pretty(recipe)?;
        tokio::fs::write(&path, body).await?;
        debug!(id = %recipe.uuid, path = %path.display(), "wrote recipe record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn put_then_get_and_missing() {
        let tmp = tempfile::TempDir::new().expect("tmp");
        let store = JsonRecordStore::new(tmp.path().join("recipe"));
        let mut recipe = Recipe::new(Uuid::new_v4(), "Dal");
        recipe.tags = vec!["indian".into(), "vegetarian".into()];
        store.put_record(&recipe).await.expect("put");
        assert!(store.contains(&recipe.uuid).await.unwrap());

        let loaded = store.get_record(&recipe.uuid).await.expect("get");
        assert_eq!(loaded, recipe);

        let missing = store.get_record(&Uuid::new_v4()).await;
        assert!(matches!(missing, Err(Error::NotFound(_))));
        assert!(!store.contains(&Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn contains_reports_io_errors() {
        let tmp = tempfile::TempDir::new().expect("tmp");
        let not_a_dir = tmp.path().join("recipe");
        std::fs::write(&not_a_dir, b"").expect("file");
        let store = JsonRecordStore::new(&not_a_dir);

        assert!(matches!(store.contains(&Uuid::new_v4()).await, Err(Error::Io(_))));
    }
}
