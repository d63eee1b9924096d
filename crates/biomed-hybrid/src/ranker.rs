use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::instrument;

use biomed_core::traits::{Embedder, Retriever};
use biomed_core::{Corpus, Error, RankedHit, Result, RetrievalMethod};
use biomed_text::LexicalIndex;
use biomed_vector::{EmbeddingTable, VectorIndex};

use crate::fusion::{reciprocal_rank_fusion, RRF_K};

/// Vector + lexical retrieval over one corpus snapshot.
pub struct FusionRanker {
    corpus: Arc<Corpus>,
    vector: VectorIndex,
    lexical: LexicalIndex,
    embedder: Arc<dyn Embedder>,
}

impl FusionRanker {
    /// Assemble a ranker from prebuilt indices. Both indices must come from
    /// `corpus` and the embedder must produce vectors of the index width.
    pub fn new(corpus: Arc<Corpus>, vector: VectorIndex, lexical: LexicalIndex, embedder: Arc<dyn Embedder>) -> Result<Self> {
        if vector.len() != corpus.len() {
            return Err(Error::SnapshotMismatch(format!(
                "vector index has {} rows, corpus has {} documents",
                vector.len(),
                corpus.len()
            )));
        }
        if lexical.fingerprint() != corpus.fingerprint() {
            return Err(Error::SnapshotMismatch("lexical index was built from a different corpus".into()));
        }
        if embedder.dim() != vector.dim() {
            return Err(Error::Dimension { expected: vector.dim(), actual: embedder.dim() });
        }
        Ok(Self { corpus, vector, lexical, embedder })
    }

    /// Build both indices from one snapshot, in parallel.
    #[instrument(skip_all, fields(documents = corpus.len(), embedder = embedder.embedder_id()))]
    pub fn build(corpus: Arc<Corpus>, embeddings: EmbeddingTable, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let (vector, lexical) = rayon::join(|| VectorIndex::build(embeddings), || LexicalIndex::build(&corpus));
        Self::new(corpus, vector, lexical?, embedder)
    }

    pub fn corpus(&self) -> &Corpus { &self.corpus }

    pub fn vector_index(&self) -> &VectorIndex { &self.vector }

    pub fn lexical_index(&self) -> &LexicalIndex { &self.lexical }

    /// Rank documents for `query`. Hybrid asks each sub-index for `2 * top_k`
    /// candidates, fuses with RRF and truncates to `top_k`.
    pub fn search(&self, query: &str, method: RetrievalMethod, top_k: usize) -> Result<Vec<RankedHit>> {
        if top_k == 0 { return Err(Error::invalid_top_k(top_k)); }
        let ranked: Vec<(usize, f32)> = match method {
            RetrievalMethod::Vector => self.vector_positions(query, top_k)?,
            RetrievalMethod::Lexical => self.lexical.search_positions(query, top_k)?,
            RetrievalMethod::Hybrid => {
                let breadth = top_k.saturating_mul(2);
                let dense: Vec<usize> = self.vector_positions(query, breadth)?.into_iter().map(|(p, _)| p).collect();
                let sparse: Vec<usize> = self.lexical.search_positions(query, breadth)?.into_iter().map(|(p, _)| p).collect();
                let mut fused = reciprocal_rank_fusion(&[&dense[..], &sparse[..]], RRF_K);
                fused.truncate(top_k);
                fused.into_iter().map(|(p, s)| (p, s as f32)).collect()
            }
        };
        tracing::debug!(%method, top_k, hits = ranked.len(), "search");
        ranked
            .into_iter()
            .enumerate()
            .map(|(i, (pos, score))| self.hit(pos, i + 1, score, method))
            .collect()
    }

    /// String-method entry point; unknown names fail with `InvalidArgument`.
    pub fn search_by_name(&self, query: &str, method: &str, top_k: usize) -> Result<Vec<RankedHit>> {
        self.search(query, method.parse()?, top_k)
    }

    fn vector_positions(&self, query: &str, top_k: usize) -> Result<Vec<(usize, f32)>> {
        let q = self.embedder.encode(query)?;
        self.vector.search(&q, top_k)
    }

    fn hit(&self, position: usize, rank: usize, score: f32, source: RetrievalMethod) -> Result<RankedHit> {
        let doc = self
            .corpus
            .get(position)
            .ok_or_else(|| Error::NotFound(format!("corpus position {position}")))?;
        Ok(RankedHit { doc_id: doc.id.clone(), rank, score, title: doc.title.clone(), text: doc.text.clone(), source })
    }
}

impl Retriever for FusionRanker {
    fn retrieve(&self, query: &str, method: RetrievalMethod, top_k: usize) -> Result<Vec<RankedHit>> {
        self.search(query, method, top_k)
    }
}

/// A ranker that can be replaced while readers are querying it.
///
/// Readers take a snapshot with [`SharedRanker::load`] (or go through
/// [`Retriever`]) and keep using it even if a reindex lands mid-query.
pub struct SharedRanker {
    inner: ArcSwap<FusionRanker>,
}

impl SharedRanker {
    pub fn new(ranker: FusionRanker) -> Self { Self { inner: ArcSwap::from_pointee(ranker) } }

    pub fn load(&self) -> Arc<FusionRanker> { self.inner.load_full() }

    /// Publish a fully built ranker; returns the one it replaced.
    pub fn reindex(&self, ranker: FusionRanker) -> Arc<FusionRanker> {
        tracing::info!(documents = ranker.corpus().len(), "swapping in new ranker");
        self.inner.swap(Arc::new(ranker))
    }
}

impl Retriever for SharedRanker {
    fn retrieve(&self, query: &str, method: RetrievalMethod, top_k: usize) -> Result<Vec<RankedHit>> {
        self.inner.load().search(query, method, top_k)
    }
}
