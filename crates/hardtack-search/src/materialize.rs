use indexmap::IndexMap;
use std::time::Duration;
use tracing::warn;

use crate::aggregate::RankedRecipe;
use crate::RetrievalWarning;
use hardtack_core::traits::RecordStore;
use hardtack_core::types::Recipe;

pub const LABEL_PREFIX: &str = "recipe_";

/// Fetches the full record for each ranked id, in rank order.
///
/// Ids whose record cannot be loaded within `timeout` are skipped with a
/// warning; labels `recipe_1..recipe_k` are assigned over the records that
/// loaded.
pub async fn materialize<R>(records: &R, ranked: &[RankedRecipe], timeout: Duration, warnings: &mut Vec<RetrievalWarning>) -> IndexMap<String, Recipe>
where
    R: RecordStore + ?Sized,
{
    let mut recipes = IndexMap::with_capacity(ranked.len());
    for entry in ranked {
        let fetched = match tokio::time::timeout(timeout, records.get_record(&entry.id)).await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(_) => Err(format!("record fetch timed out after {} ms", timeout.as_millis())),
        };
        match fetched {
            Ok(recipe) => {
                recipes.insert(format!("{LABEL_PREFIX}{}", recipes.len() + 1), recipe);
            }
            Err(reason) => {
                warn!(id = %entry.id, rank = entry.rank, %reason, "orphaned index entry, skipping");
                warnings.push(RetrievalWarning::OrphanedRecord { id: entry.id, reason });
            }
        }
    }
    recipes
}
