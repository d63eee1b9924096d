use serde::{Deserialize, Serialize};

use biomed_core::RankedHit;

/// Characters of document text forwarded to the re-ranking service.
pub const SNIPPET_CHARS: usize = 500;

/// Payload row for the external re-ranking/explanation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankCandidate {
    pub title: String,
    pub text: String,
}

/// Shortlist in rank order, text cut to [`SNIPPET_CHARS`] characters.
pub fn rerank_candidates(hits: &[RankedHit]) -> Vec<RerankCandidate> {
    hits.iter()
        .map(|h| RerankCandidate { title: h.title.clone(), text: h.text.chars().take(SNIPPET_CHARS).collect() })
        .collect()
}
