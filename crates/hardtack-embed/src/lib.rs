//! Text embeddings for the recipe dimensions.
//!
//! `BgeM3Embedder` runs BGE-M3 locally through candle. `FakeEmbedder` is a
//! hashed bag-of-words stand-in, selected by `APP_USE_FAKE_EMBEDDINGS=1`, for
//! tests and development machines without the model files.

use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use hardtack_core::traits::Embedder;
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

mod device;
mod pool;
mod tokenize;

pub use device::select_device;
pub use pool::masked_mean_l2;
pub use tokenize::tokenize_on_device;

pub const EMBEDDING_DIM: usize = 1024;
const MAX_LEN: usize = 256;

pub struct BgeM3Embedder { model: XLMRobertaModel, tokenizer: Tokenizer, device: Device }

impl BgeM3Embedder {
    pub fn new() -> Result<Self> {
        let model_dir = resolve_model_dir()?;
        Self::from_dir(&model_dir)
    }

    /// Loads `tokenizer.json`, `config.json` and `pytorch_model.bin` from `model_dir`.
    pub fn from_dir(model_dir: &Path) -> Result<Self> {
        let device = select_device();
        info!(dir = %model_dir.display(), "loading BGE-M3");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let config: XLMRobertaConfig = serde_json::from_str(&std::fs::read_to_string(model_dir.join("config.json"))?)?;
        let weights: HashMap<String, Tensor> = candle_core::pickle::read_all(model_dir.join("pytorch_model.bin"))?.into_iter().collect();
        let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
        let model = XLMRobertaModel::new(&config, vb)?;
        info!("BGE-M3 loaded");
        Ok(Self { model, tokenizer, device })
    }

    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let (input_ids, attention_mask) = tokenize_on_device(&self.tokenizer, text, MAX_LEN, &self.device)?;
        let token_type_ids = Tensor::zeros((1, MAX_LEN), DType::I64, &self.device)?;
        let hidden = self.model.forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let emb: Vec<f32> = pooled.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        if emb.len() != EMBEDDING_DIM {
            return Err(anyhow!("expected {} dims from model, got {}", EMBEDDING_DIM, emb.len()));
        }
        let elapsed_ms = start.elapsed().as_millis();
        if elapsed_ms > 100 { warn!(elapsed_ms, chars = text.len(), "slow embedding"); }
        Ok(emb)
    }
}

impl Embedder for BgeM3Embedder {
    fn dim(&self) -> usize { EMBEDDING_DIM }
    fn max_len(&self) -> usize { MAX_LEN }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed_text(t)).collect()
    }
}

/// Deterministic hashed embeddings. Texts sharing words land near each other.
pub struct FakeEmbedder { dim: usize }

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim } }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        for token in text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            v[(h as usize) % self.dim] += 0.5 + ((h >> 32) as u32) as f32 / u32::MAX as f32;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        // empty text: unit vector on axis 0 so cosine distance stays defined
        if norm == 0.0 { v[0] = 1.0; return v; }
        v.iter_mut().for_each(|x| *x /= norm);
        v
    }
}

impl Default for FakeEmbedder {
    fn default() -> Self { Self::new(EMBEDDING_DIM) }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { MAX_LEN }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}

pub fn use_fake_embeddings() -> bool {
    std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

pub fn get_default_embedder() -> Result<Box<dyn Embedder>> {
    if use_fake_embeddings() { info!("using FakeEmbedder"); return Ok(Box::new(FakeEmbedder::default())); }
    Ok(Box::new(BgeM3Embedder::new()?))
}

fn resolve_model_dir() -> Result<PathBuf> {
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            let p = PathBuf::from(&dir);
            if p.exists() { debug!(var, dir = %p.display(), "model dir from env"); return Ok(p); }
            warn!(var, dir = %p.display(), "model dir does not exist");
        }
    }
    for candidate in ["models/bge-m3", "../models/bge-m3"] {
        let p = Path::new(candidate);
        if p.exists() { debug!(dir = %p.display(), "model dir"); return Ok(p.to_path_buf()); }
    }
    Err(anyhow!("Could not locate BGE-M3 model directory (set APP_MODEL_DIR)"))
}
