use std::cmp::Ordering;

use biomed_core::{Error, Result};

use crate::table::EmbeddingTable;

/// Exact k-nearest-neighbour index using squared Euclidean distance.
///
/// Read-only after build; `search` borrows `&self` only, so one instance can
/// serve any number of threads.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    table: EmbeddingTable,
}

impl VectorIndex {
    pub fn build(embeddings: EmbeddingTable) -> Self {
        tracing::info!(rows = embeddings.len(), dim = embeddings.dim(), "built vector index");
        Self { table: embeddings }
    }

    /// Validate raw rows and build in one step.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        Ok(Self::build(EmbeddingTable::from_rows(rows)?))
    }

    pub fn dim(&self) -> usize { self.table.dim() }

    pub fn len(&self) -> usize { self.table.len() }

    pub fn is_empty(&self) -> bool { self.table.is_empty() }

    pub fn table(&self) -> &EmbeddingTable { &self.table }

    /// Returns up to `min(top_k, len())` `(position, squared_distance)` pairs,
    /// ascending by distance, ties by ascending position.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<(usize, f32)>> {
        if top_k == 0 { return Err(Error::invalid_top_k(top_k)); }
        if query.len() != self.dim() {
            return Err(Error::Dimension { expected: self.dim(), actual: query.len() });
        }
        let mut scored: Vec<(usize, f32)> = self
            .table
            .iter()
            .enumerate()
            .map(|(pos, row)| (pos, squared_l2(query, row)))
            .collect();
        let k = top_k.min(scored.len());
        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, by_distance);
            scored.truncate(k);
        }
        scored.sort_by(by_distance);
        tracing::debug!(top_k, returned = scored.len(), "vector search");
        Ok(scored)
    }
}

fn by_distance(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    a.1.total_cmp(&b.1).then(a.0.cmp(&b.0))
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}
