use crate::error::Result;
use crate::types::{RankedHit, RetrievalMethod};

/// Query/document encoder. Implementations own their model state; callers
/// inject one instance instead of relying on a process-wide singleton.
pub trait Embedder: Send + Sync {
    /// Length of every vector this provider returns.
    fn dim(&self) -> usize;
    /// Stable identifier for the provider/model.
    fn embedder_id(&self) -> &str;
    fn encode(&self, text: &str) -> Result<Vec<f32>>;
    /// Row order of the output matches `texts`.
    fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.encode(t)).collect()
    }
}

/// Anything that can turn a query into a ranked list. The evaluator only
/// sees this surface.
pub trait Retriever: Send + Sync {
    fn retrieve(&self, query: &str, method: RetrievalMethod, top_k: usize) -> Result<Vec<RankedHit>>;
}
