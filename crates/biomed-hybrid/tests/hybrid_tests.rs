use std::collections::HashMap;
use std::sync::Arc;

use biomed_core::traits::{Embedder, Retriever};
use biomed_core::{Corpus, DocId, Document, Error, RankedHit, Result, RetrievalMethod};
use biomed_embed::{encode_corpus, HashingEmbedder};
use biomed_hybrid::{rerank_candidates, FusionRanker, SharedRanker, RRF_K, SNIPPET_CHARS};
use biomed_text::LexicalIndex;
use biomed_vector::{EmbeddingTable, VectorIndex};

/// Maps known query strings to hand-placed vectors.
struct StubEmbedder {
    dim: usize,
    table: HashMap<String, Vec<f32>>,
}

impl Embedder for StubEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn embedder_id(&self) -> &str { "stub" }
    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.table.get(text).cloned().unwrap_or_else(|| vec![0.0; self.dim]))
    }
}

fn stub() -> Arc<dyn Embedder> {
    let mut table = HashMap::new();
    table.insert("insulin resistance".to_string(), vec![1.0, 0.1]);
    Arc::new(StubEmbedder { dim: 2, table })
}

fn corpus() -> Arc<Corpus> {
    Arc::new(
        Corpus::new(vec![
            Document::new(10u64, "Lace plant?", "lace plant cell death"),
            Document::new(20u64, "Acuity?", "visual acuity amblyopia"),
            Document::new(30u64, "Insulin?", "insulin resistance muscle"),
            Document::new(40u64, "Sleep?", "sleep apnea outcomes"),
        ])
        .unwrap(),
    )
}

fn embeddings() -> EmbeddingTable {
    EmbeddingTable::from_rows(vec![vec![0.0, 0.0], vec![5.0, 5.0], vec![1.0, 0.0], vec![0.0, 5.0]]).unwrap()
}

fn ranker() -> FusionRanker {
    FusionRanker::build(corpus(), embeddings(), stub()).expect("ranker")
}

fn ids(hits: &[RankedHit]) -> Vec<u64> {
    hits.iter().map(|h| h.doc_id.as_str().parse().unwrap()).collect()
}

#[test]
fn vector_passthrough_uses_distances() {
    let hits = ranker().search("insulin resistance", RetrievalMethod::Vector, 4).unwrap();
    assert_eq!(ids(&hits), [30, 10, 40, 20]);
    assert!((hits[0].score - 0.01).abs() < 1e-6);
    assert!(hits.iter().all(|h| h.source == RetrievalMethod::Vector));
    assert_eq!(hits[0].title, "Insulin?");
    assert_eq!(hits[0].text, "insulin resistance muscle");
}

#[test]
fn lexical_passthrough_keeps_position_ties() {
    let hits = ranker().search("insulin resistance", RetrievalMethod::Lexical, 4).unwrap();
    assert_eq!(ids(&hits), [30, 10, 20, 40]);
    assert!(hits[0].score > 0.0);
    assert!(hits[1..].iter().all(|h| h.score == 0.0));
}

#[test]
fn hybrid_fuses_and_breaks_ties_by_vector_order() {
    let hits = ranker().search("insulin resistance", RetrievalMethod::Hybrid, 4).unwrap();
    // 40 and 20 tie at 1/63 + 1/64; 40 comes first in the vector list
    assert_eq!(ids(&hits), [30, 10, 40, 20]);
    let top = 2.0 / (RRF_K + 1.0);
    assert!((f64::from(hits[0].score) - top).abs() < 1e-6);
    assert_eq!(hits[2].score, hits[3].score);
}

#[test]
fn hybrid_truncates_and_ranks_densely() {
    let hits = ranker().search("insulin resistance", RetrievalMethod::Hybrid, 2).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits.iter().map(|h| h.rank).collect::<Vec<_>>(), [1, 2]);
    for w in hits.windows(2) { assert!(w[0].score >= w[1].score); }
}

#[test]
fn hybrid_draws_twice_top_k_from_each_index() {
    // Equal-length texts, so BM25 reduces to the idf sum of matched terms.
    // 40 is third in both lists; 60 is fourth in both.
    let corpus = Arc::new(
        Corpus::new(vec![
            Document::new(60u64, "F", "gg hh ii"),
            Document::new(70u64, "G", "jj kk ll"),
            Document::new(10u64, "A", "aa bb cc"),
            Document::new(20u64, "B", "dd ee ff"),
            Document::new(40u64, "D", "zeta pp qq"),
            Document::new(30u64, "C", "alpha beta zeta"),
            Document::new(50u64, "E", "alpha zeta rr"),
        ])
        .unwrap(),
    );
    let rows: Vec<Vec<f32>> = [3.0f32, 4.0, 0.0, 1.0, 2.0, 5.0, 6.0].iter().map(|&x| vec![x, 0.0]).collect();
    let r = FusionRanker::build(corpus, EmbeddingTable::from_rows(rows).unwrap(), stub()).unwrap();
    let query = "alpha beta zeta";

    assert_eq!(ids(&r.search(query, RetrievalMethod::Vector, 4).unwrap()), [10, 20, 40, 60]);
    assert_eq!(ids(&r.search(query, RetrievalMethod::Lexical, 4).unwrap()), [30, 50, 40, 60]);

    // With only top_k candidates per list the fused top two would be 10 and 30.
    let hits = r.search(query, RetrievalMethod::Hybrid, 2).unwrap();
    assert_eq!(ids(&hits), [40, 60]);
    assert!((f64::from(hits[0].score) - 2.0 / (RRF_K + 3.0)).abs() < 1e-6);
    assert!((f64::from(hits[1].score) - 2.0 / (RRF_K + 4.0)).abs() < 1e-6);
}

#[test]
fn first_in_both_lists_is_first_in_hybrid() {
    let r = ranker();
    let v = r.search("insulin resistance", RetrievalMethod::Vector, 1).unwrap();
    let l = r.search("insulin resistance", RetrievalMethod::Lexical, 1).unwrap();
    let h = r.search("insulin resistance", RetrievalMethod::Hybrid, 1).unwrap();
    assert_eq!(v[0].doc_id, l[0].doc_id);
    assert_eq!(h[0].doc_id, v[0].doc_id);
}

#[test]
fn argument_errors() {
    let r = ranker();
    assert!(matches!(r.search("x", RetrievalMethod::Hybrid, 0), Err(Error::InvalidArgument(_))));
    assert!(matches!(r.search_by_name("x", "sparse", 3), Err(Error::InvalidArgument(_))));
    assert_eq!(r.search_by_name("insulin resistance", "bm25", 1).unwrap()[0].doc_id, DocId::from(30u64));
}

#[test]
fn construction_rejects_mixed_snapshots() {
    let other = Corpus::new(vec![Document::new(1u64, "", "other text")]).unwrap();
    let lexical = LexicalIndex::build(&other).unwrap();
    let err = FusionRanker::new(corpus(), VectorIndex::build(embeddings()), lexical, stub()).err().unwrap();
    assert!(matches!(err, Error::SnapshotMismatch(_)));

    let short = VectorIndex::from_rows(vec![vec![0.0, 0.0]]).unwrap();
    let err = FusionRanker::new(corpus(), short, LexicalIndex::build(&corpus()).unwrap(), stub()).err().unwrap();
    assert!(matches!(err, Error::SnapshotMismatch(_)));

    let wide: Arc<dyn Embedder> = Arc::new(StubEmbedder { dim: 3, table: HashMap::new() });
    let err = FusionRanker::build(corpus(), embeddings(), wide).err().unwrap();
    assert!(matches!(err, Error::Dimension { expected: 2, actual: 3 }));
}

#[test]
fn empty_corpus_fails_build() {
    let empty = Arc::new(Corpus::new(vec![]).unwrap());
    let err = FusionRanker::build(empty, embeddings(), stub()).err().unwrap();
    assert!(matches!(err, Error::EmptyCorpus));
}

#[test]
fn concurrent_readers_see_identical_results() {
    let r = ranker();
    let expected = r.search("insulin resistance", RetrievalMethod::Hybrid, 3).unwrap();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| r.search("insulin resistance", RetrievalMethod::Hybrid, 3).unwrap()))
            .collect();
        for h in handles { assert_eq!(h.join().unwrap(), expected); }
    });
}

#[test]
fn reindex_swaps_atomically() {
    let shared = SharedRanker::new(ranker());
    let before = shared.load();

    let next_corpus = Arc::new(Corpus::new(vec![Document::new(99u64, "New?", "insulin resistance trial")]).unwrap());
    let next_table = EmbeddingTable::from_rows(vec![vec![1.0, 0.0]]).unwrap();
    let next = FusionRanker::build(next_corpus, next_table, stub()).unwrap();
    let old = shared.reindex(next);

    assert_eq!(old.corpus().len(), 4);
    let hits = shared.retrieve("insulin resistance", RetrievalMethod::Hybrid, 5).unwrap();
    assert_eq!(ids(&hits), [99]);
    // snapshots taken before the swap keep answering from the old corpus
    assert_eq!(before.search("insulin resistance", RetrievalMethod::Lexical, 1).unwrap()[0].doc_id, DocId::from(30u64));
}

#[test]
fn rerank_payload_is_truncated_in_rank_order() {
    let long = "x".repeat(SNIPPET_CHARS + 50);
    let c = Arc::new(Corpus::new(vec![Document::new(1u64, "Long?", long), Document::new(2u64, "Short?", "y")]).unwrap());
    let table = EmbeddingTable::from_rows(vec![vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();
    let r = FusionRanker::build(c, table, stub()).unwrap();
    let hits = r.search("anything", RetrievalMethod::Vector, 2).unwrap();
    let payload = rerank_candidates(&hits);
    assert_eq!(payload.len(), 2);
    assert_eq!(payload[0].title, "Long?");
    assert_eq!(payload[0].text.chars().count(), SNIPPET_CHARS);
    assert_eq!(payload[1].text, "y");
    let json = serde_json::to_value(&payload).unwrap();
    assert_eq!(json[1]["title"], "Short?");
}

#[test]
fn hashing_embedder_end_to_end_is_reproducible() {
    let c = corpus();
    let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(128).unwrap());
    let build = || {
        let table = EmbeddingTable::from_rows(encode_corpus(embedder.as_ref(), &c).unwrap()).unwrap();
        FusionRanker::build(c.clone(), table, embedder.clone()).unwrap()
    };
    let a = build().search("sleep apnea outcomes", RetrievalMethod::Hybrid, 3).unwrap();
    let b = build().search("sleep apnea outcomes", RetrievalMethod::Hybrid, 3).unwrap();
    assert_eq!(a, b);
    assert_eq!(a[0].doc_id, DocId::from(40u64));
}
