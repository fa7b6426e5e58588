use anyhow::{anyhow, Result};
use arrow_array::{Array, Float32Array, RecordBatch, StringArray};
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase, Select};
use lancedb::{DistanceType, Table};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::schema::{DISTANCE_COLUMN, ID_COLUMN};
use crate::table::{open_db, open_existing};
use hardtack_core::filter::RatingPredicate;
use hardtack_core::traits::{Embedder, VectorSession, VectorStore};
use hardtack_core::types::{Dimension, RecipeId, SearchHit};

/// Vector store over a LanceDB recipe table. Each `connect` opens a fresh
/// connection that lives for one retrieval call.
pub struct LanceVectorStore { db_path: PathBuf, table_name: String, embedder: Arc<dyn Embedder> }

impl LanceVectorStore {
	pub fn with_embedder(db_path: impl Into<PathBuf>, table_name: &str, embedder: Arc<dyn Embedder>) -> Self {
		Self { db_path: db_path.into(), table_name: table_name.to_string(), embedder }
	}
}

#[async_trait]
impl VectorStore for LanceVectorStore {
	async fn connect(&self) -> Result<Box<dyn VectorSession>> {
		let db = open_db(self.db_path.to_string_lossy().as_ref()).await?;
		let table = open_existing(&db, &self.table_name).await?;
		debug!(table = %self.table_name, "opened vector session");
		Ok(Box::new(LanceSession { table, embedder: self.embedder.clone() }))
	}
}

pub struct LanceSession { table: Table, embedder: Arc<dyn Embedder> }

impl LanceSession {
	async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
		let embedder = self.embedder.clone();
		let text = text.to_string();
		let mut vectors = tokio::task::spawn_blocking(move || embedder.embed_batch(&[text])).await??;
		vectors.pop().ok_or_else(|| anyhow!("embedder returned no vector"))
	}
}

#[async_trait]
impl VectorSession for LanceSession {
	async fn nearest(&self, dimension: Dimension, query_text: &str, limit: usize, filter: Option<&RatingPredicate>) -> Result<Vec<SearchHit>> {
		let query_vector = self.embed_query(query_text).await?;
		let mut query = self.table.vector_search(query_vector)?
			.column(dimension.vector_column())
			.distance_type(DistanceType::Cosine)
			.limit(limit)
			.select(Select::columns(&[ID_COLUMN]));
		if let Some(predicate) = filter { query = query.only_if(predicate.to_sql()); }
		let mut stream = query.execute().await?;
		let mut hits = Vec::new();
		while let Some(batch) = stream.try_next().await? { read_hits(&batch, &mut hits)?; }
		debug!(%dimension, hits = hits.len(), "nearest");
		Ok(hits)
	}
}

fn read_hits(batch: &RecordBatch, hits: &mut Vec<SearchHit>) -> Result<()> {
	let ids = batch.column_by_name(ID_COLUMN).and_then(|c| c.as_any().downcast_ref::<StringArray>()).ok_or_else(|| anyhow!("result batch has no '{}' column", ID_COLUMN))?;
	let distances = batch.column_by_name(DISTANCE_COLUMN).and_then(|c| c.as_any().downcast_ref::<Float32Array>()).ok_or_else(|| anyhow!("result batch has no '{}' column", DISTANCE_COLUMN))?;
	for i in 0..batch.num_rows() {
		if ids.is_null(i) || distances.is_null(i) { continue; }
		match ids.value(i).parse::<RecipeId>() {
			Ok(id) => hits.push(SearchHit::new(id, distances.value(i))),
			Err(e) => warn!(id = ids.value(i), error = %e, "skipping row with malformed id"),
		}
	}
	Ok(())
}
