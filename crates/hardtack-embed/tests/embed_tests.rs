use hardtack_core::traits::Embedder;
use hardtack_embed::{get_default_embedder, FakeEmbedder, EMBEDDING_DIM};

#[test]
fn fake_embedder_shapes_and_determinism() {
    // avoid loading the real model
    std::env::set_var("APP_USE_FAKE_EMBEDDINGS", "1");

    let embedder = get_default_embedder().expect("embedder");
    let texts = vec!["weeknight chili".to_string(), "weeknight chili".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let (v1, v2) = (&embs[0], &embs[1]);

    assert_eq!(v1.len(), EMBEDDING_DIM);
    assert_eq!(embedder.dim(), EMBEDDING_DIM);

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn fake_embedder_is_case_insensitive() {
    let e = FakeEmbedder::new(64);
    let v = e.embed_batch(&["Chili".into(), "chili".into()]).unwrap();
    assert_eq!(v[0], v[1]);
}
