//! biomed-embed
//!
//! Embedding providers behind the `biomed_core::traits::Embedder` seam. The
//! neural sentence encoder is an external collaborator; this crate ships the
//! deterministic hashing provider used by the CLI and tests, and the helper
//! that encodes a whole corpus into an embedding table.

use indicatif::{ProgressBar, ProgressStyle};
use std::hash::Hasher;
use std::io::IsTerminal;
use twox_hash::XxHash64;

use biomed_core::traits::Embedder;
use biomed_core::{Corpus, Error, Result};

const ENCODE_BATCH: usize = 32;

/// Feature-hashing bag-of-words encoder.
///
/// Each lower-cased token is hashed with XxHash64 into one of `dim` buckets,
/// the bucket accumulates a hash-derived weight, and the vector is
/// L2-normalized. Identical text always yields identical vectors.
pub struct HashingEmbedder {
    dim: usize,
    id: String,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 { return Err(Error::InvalidArgument("embedding dim must be positive".into())); }
        Ok(Self { dim, id: format!("hashing:xxh64:d{dim}") })
    }
}

impl Embedder for HashingEmbedder {
    fn dim(&self) -> usize { self.dim }

    fn embedder_id(&self) -> &str { &self.id }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0f32; self.dim];
        for token in text.split_whitespace() {
            let token = token.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
            if token.is_empty() { continue; }
            let mut hasher = XxHash64::with_seed(0);
            hasher.write(token.as_bytes());
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            let weight = 0.5 + ((h >> 32) as u32) as f32 / (u32::MAX as f32);
            v[idx] += weight;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt().max(1e-6);
        for x in &mut v { *x /= norm; }
        Ok(v)
    }
}

/// Default provider for a given width.
pub fn get_default_embedder(dim: usize) -> Result<Box<dyn Embedder>> {
    tracing::debug!(dim, "using hashing embedder");
    Ok(Box::new(HashingEmbedder::new(dim)?))
}

/// Encode every document's `text` in corpus order. Row `i` of the result
/// belongs to `corpus.get(i)`.
pub fn encode_corpus(embedder: &dyn Embedder, corpus: &Corpus) -> Result<Vec<Vec<f32>>> {
    let pb = if std::io::stderr().is_terminal() { ProgressBar::new(corpus.len() as u64) } else { ProgressBar::hidden() };
    if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents ({percent}%)") {
        pb.set_style(style.progress_chars("#>-"));
    }
    let texts: Vec<String> = corpus.iter().map(|d| d.text.clone()).collect();
    let mut rows = Vec::with_capacity(texts.len());
    for batch in texts.chunks(ENCODE_BATCH) {
        let encoded = embedder.encode_batch(batch)?;
        if encoded.len() != batch.len() {
            return Err(Error::Embedding(format!("provider returned {} rows for {} texts", encoded.len(), batch.len())));
        }
        rows.extend(encoded);
        pb.inc(batch.len() as u64);
    }
    pb.finish_and_clear();
    tracing::info!(documents = rows.len(), embedder = embedder.embedder_id(), "encoded corpus");
    Ok(rows)
}
