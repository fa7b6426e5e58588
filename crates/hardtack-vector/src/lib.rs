//! LanceDB-backed vector index for recipes.
//!
//! One table holds a row per recipe with an embedding column per dimension.
//! `LanceRecipeIndexer` writes rows, `LanceVectorStore` answers per-dimension
//! nearest-neighbor queries with an optional rating predicate.

pub mod schema;
pub mod search;
pub mod table;
pub mod writer;

pub use search::{LanceSession, LanceVectorStore};
pub use writer::LanceRecipeIndexer;
