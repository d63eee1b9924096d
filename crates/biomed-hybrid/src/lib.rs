//! biomed-hybrid
//!
//! Combines the vector and lexical indices behind one ranking surface and
//! merges their lists with Reciprocal Rank Fusion.

pub mod fusion;
pub mod ranker;
pub mod rerank;

pub use fusion::{reciprocal_rank_fusion, RRF_K};
pub use ranker::{FusionRanker, SharedRanker};
pub use rerank::{rerank_candidates, RerankCandidate, SNIPPET_CHARS};
