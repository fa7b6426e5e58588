//! LanceDB connection and table helpers.
use anyhow::{anyhow, Result};
use arrow_array::RecordBatchIterator;
use arrow_schema::Schema;
use lancedb::{connect, Connection, Table};
use std::sync::Arc;
use tracing::info;

pub async fn open_db(uri: &str) -> Result<Connection> {
	Ok(connect(uri).execute().await?)
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
	Ok(conn.table_names().execute().await?.iter().any(|n| n == name))
}

/// Opens `name`, creating it empty with `schema` on first use.
pub async fn ensure_table(conn: &Connection, name: &str, schema: Arc<Schema>) -> Result<Table> {
	if !table_exists(conn, name).await? {
		info!(table = name, "creating table");
		let iter = RecordBatchIterator::new(vec![].into_iter(), schema);
		conn.create_table(name, Box::new(iter)).execute().await?;
	}
	Ok(conn.open_table(name).execute().await?)
}

/// Opens an existing table; a missing table is reported as an error naming it.
pub async fn open_existing(conn: &Connection, name: &str) -> Result<Table> {
	if !table_exists(conn, name).await? {
		return Err(anyhow!("table '{}' does not exist; ingest recipes first", name));
	}
	Ok(conn.open_table(name).execute().await?)
}
