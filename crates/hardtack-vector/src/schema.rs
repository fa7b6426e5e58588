use arrow_schema::{DataType, Field, Schema};
use hardtack_core::filter::RATING_COLUMN;
use hardtack_core::types::Dimension;
use std::sync::Arc;

pub use hardtack_embed::EMBEDDING_DIM;

pub const ID_COLUMN: &str = "id";
pub const DISTANCE_COLUMN: &str = "_distance";

pub fn vector_field(name: &str, dim: i32) -> Field {
	Field::new(name, DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true)
}

/// One row per recipe: its id, the text of every dimension, the nullable
/// rating used for filtering, and one embedding column per dimension.
pub fn build_recipe_schema(dim: i32) -> Arc<Schema> {
	let mut fields = vec![Field::new(ID_COLUMN, DataType::Utf8, false)];
	fields.extend(Dimension::ALL.iter().map(|d| Field::new(d.as_str(), DataType::Utf8, false)));
	fields.push(Field::new(RATING_COLUMN, DataType::Float32, true));
	fields.extend(Dimension::ALL.iter().map(|d| vector_field(d.vector_column(), dim)));
	Arc::new(Schema::new(fields))
}
