use std::sync::Arc;

use hardtack_core::filter::RatingPredicate;
use hardtack_core::query::RatingFilter;
use hardtack_core::traits::{Embedder, VectorIndexer, VectorSession, VectorStore};
use hardtack_core::types::{Dimension, Recipe};
use hardtack_embed::FakeEmbedder;
use hardtack_vector::{LanceRecipeIndexer, LanceVectorStore};
use tempfile::TempDir;
use uuid::Uuid;

fn recipe(name: &str, tags: &[&str], rating: Option<f32>) -> Recipe {
    let mut r = Recipe::new(Uuid::new_v4(), name);
    r.tags = tags.iter().map(|t| t.to_string()).collect();
    r.shopping_list = vec!["salt".into()];
    r.author = "Test Kitchen".into();
    r.rating = rating;
    r
}

#[tokio::test]
async fn lancedb_full_flow() {
    let embedder: Arc<dyn Embedder> = Arc::new(FakeEmbedder::default());
    let tmp = TempDir::new().expect("tmp");
    let table = "recipes_test_tmp";

    let chili = recipe("Weeknight Chili", &["spicy", "stew"], Some(4.0));
    let tart = recipe("Lemon Tart", &["dessert"], None);
    let soup = recipe("Chili Bean Soup", &["spicy", "soup"], Some(2.0));
    let recipes = vec![chili.clone(), tart.clone(), soup.clone()];

    let indexer = LanceRecipeIndexer::new(tmp.path(), table, embedder.clone()).await.expect("indexer");
    assert_eq!(indexer.upsert(&recipes).await.expect("upsert"), 3);
    assert_eq!(indexer.count().await.expect("count"), 3);

    // re-upserting the same ids replaces rows
    let mut rated_tart = tart.clone();
    rated_tart.rating = Some(5.0);
    indexer.upsert(&[rated_tart]).await.expect("upsert again");
    assert_eq!(indexer.count().await.expect("count"), 3);

    let store = LanceVectorStore::with_embedder(tmp.path(), table, embedder);
    let session = store.connect().await.expect("connect");

    let hits = session.nearest(Dimension::DishName, "chili", 5, None).await.expect("nearest");
    assert_eq!(hits.len(), 3);
    let best = hits.iter().min_by(|a, b| a.distance.total_cmp(&b.distance)).unwrap();
    assert!(best.id == chili.uuid || best.id == soup.uuid);

    let at_least_3 = RatingPredicate::from_filter(&RatingFilter::new(Some(3.0), "greater_or_equal")).unwrap();
    let hits = session.nearest(Dimension::Tags, "spicy", 5, Some(&at_least_3)).await.expect("filtered");
    let ids: Vec<_> = hits.iter().map(|h| h.id).collect();
    assert!(ids.contains(&chili.uuid) && ids.contains(&tart.uuid));
    assert!(!ids.contains(&soup.uuid));

    session.close().await.expect("close");

    indexer.remove(&chili.uuid).await.expect("remove");
    assert_eq!(indexer.count().await.expect("count"), 2);
}

#[tokio::test]
async fn connect_fails_without_table() {
    let tmp = TempDir::new().expect("tmp");
    let store = LanceVectorStore::with_embedder(tmp.path(), "missing", Arc::new(FakeEmbedder::default()));
    assert!(store.connect().await.is_err());
}
