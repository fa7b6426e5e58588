use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::filter::RatingPredicate;
use crate::types::{Dimension, Recipe, RecipeId, SearchHit};

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Factory for vector-index sessions. One session is opened per retrieval
/// call and closed before the call returns.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn connect(&self) -> anyhow::Result<Box<dyn VectorSession>>;
}

#[async_trait]
pub trait VectorSession: Send + Sync {
    /// Nearest neighbors of `query_text` in `dimension`'s vector space.
    /// Hits need not be sorted; an empty answer is not an error.
    async fn nearest(
        &self,
        dimension: Dimension,
        query_text: &str,
        limit: usize,
        filter: Option<&RatingPredicate>,
    ) -> anyhow::Result<Vec<SearchHit>>;

    async fn close(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Write side of the vector index.
#[async_trait]
pub trait VectorIndexer: Send + Sync {
    async fn upsert(&self, recipes: &[Recipe]) -> anyhow::Result<usize>;
    async fn remove(&self, id: &RecipeId) -> anyhow::Result<()>;
}

/// Backing store for full recipe records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns `Error::NotFound` when no record exists for `id`.
    async fn get_record(&self, id: &RecipeId) -> Result<Recipe>;
    async fn put_record(&self, recipe: &Recipe) -> Result<()>;
}

#[async_trait]
impl<T: VectorStore + ?Sized> VectorStore for Arc<T> {
    async fn connect(&self) -> anyhow::Result<Box<dyn VectorSession>> {
        (**self).connect().await
    }
}

#[async_trait]
impl<T: VectorIndexer + ?Sized> VectorIndexer for Arc<T> {
    async fn upsert(&self, recipes: &[Recipe]) -> anyhow::Result<usize> {
        (**self).upsert(recipes).await
    }
    async fn remove(&self, id: &RecipeId) -> anyhow::Result<()> {
        (**self).remove(id).await
    }
}

#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    async fn get_record(&self, id: &RecipeId) -> Result<Recipe> {
        (**self).get_record(id).await
    }
    async fn put_record(&self, recipe: &Recipe) -> Result<()> {
        (**self).put_record(recipe).await
    }
}
