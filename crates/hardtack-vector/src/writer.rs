use anyhow::{ensure, Result};
use arrow_array::{ArrayRef, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use lancedb::Connection;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::schema::{build_recipe_schema, ID_COLUMN};
use crate::table::{ensure_table, open_db, table_exists};
use hardtack_core::traits::{Embedder, VectorIndexer};
use hardtack_core::types::{Dimension, Recipe, RecipeId};

const BATCH_SIZE: usize = 256;

/// Embeds every dimension of a recipe and upserts the row keyed by `id`.
pub struct LanceRecipeIndexer { pub(crate) db: Connection, pub(crate) table_name: String, embedder: Arc<dyn Embedder> }

impl LanceRecipeIndexer {
	pub async fn new(db_path: &Path, table_name: &str, embedder: Arc<dyn Embedder>) -> Result<Self> {
		let db = open_db(db_path.to_string_lossy().as_ref()).await?;
		Ok(Self { db, table_name: table_name.to_string(), embedder })
	}

	fn progress(total: usize) -> ProgressBar {
		let pb = ProgressBar::new(total as u64);
		if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} recipes ({percent}%) {msg}") {
			pb.set_style(style.progress_chars("#>-"));
		}
		pb
	}

	async fn upsert_batch(&self, recipes: &[Recipe]) -> Result<()> {
		let record_batch = self.recipes_to_record_batch(recipes)?;
		let schema = record_batch.schema();
		let table = ensure_table(&self.db, &self.table_name, schema.clone()).await?;
		let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
		let mut merge = table.merge_insert(&[ID_COLUMN]);
		merge.when_matched_update_all(None).when_not_matched_insert_all();
		merge.execute(reader).await?;
		Ok(())
	}

	fn recipes_to_record_batch(&self, recipes: &[Recipe]) -> Result<RecordBatch> {
		let dim = self.embedder.dim();
		let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(recipes.iter().map(|r| r.uuid.to_string()).collect::<Vec<_>>()))];
		let texts: Vec<Vec<String>> = Dimension::ALL.iter().map(|&d| recipes.iter().map(|r| r.dimension_text(d)).collect()).collect();
		columns.extend(texts.iter().map(|t| Arc::new(StringArray::from(t.clone())) as ArrayRef));
		columns.push(Arc::new(Float32Array::from(recipes.iter().map(|r| r.rating).collect::<Vec<_>>())));
		for (dimension, dim_texts) in Dimension::ALL.iter().zip(&texts) {
			let vectors = self.embedder.embed_batch(dim_texts)?;
			ensure!(vectors.len() == recipes.len(), "embedder returned {} vectors for {} {} texts", vectors.len(), recipes.len(), dimension);
			ensure!(vectors.iter().all(|v| v.len() == dim), "embedder returned a vector that is not {} wide", dim);
			let values = vectors.into_iter().map(|v| Some(v.into_iter().map(Some).collect::<Vec<_>>()));
			columns.push(Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(values, dim as i32)));
		}
		Ok(RecordBatch::try_new(build_recipe_schema(dim as i32), columns)?)
	}

	pub async fn count(&self) -> Result<usize> {
		if !table_exists(&self.db, &self.table_name).await? { return Ok(0); }
		Ok(self.db.open_table(&self.table_name).execute().await?.count_rows(None).await?)
	}
}

#[async_trait]
impl VectorIndexer for LanceRecipeIndexer {
	async fn upsert(&self, recipes: &[Recipe]) -> Result<usize> {
		if recipes.is_empty() { info!("no recipes to index"); return Ok(0); }
		info!(recipes = recipes.len(), table = %self.table_name, "indexing recipes");
		let pb = Self::progress(recipes.len());
		for batch in recipes.chunks(BATCH_SIZE) {
			self.upsert_batch(batch).await?;
			pb.inc(batch.len() as u64);
			debug!(batch = batch.len(), "upserted batch");
		}
		pb.finish_with_message("done");
		info!(recipes = recipes.len(), "indexed recipes");
		Ok(recipes.len())
	}

	async fn remove(&self, id: &RecipeId) -> Result<()> {
		if !table_exists(&self.db, &self.table_name).await? { return Ok(()); }
		let table = self.db.open_table(&self.table_name).execute().await?;
		table.delete(&format!("{} = '{}'", ID_COLUMN, id)).await?;
		debug!(%id, "removed recipe from index");
		Ok(())
	}
}
