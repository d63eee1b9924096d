use serde::{Deserialize, Serialize};

use biomed_core::{Error, Result};

/// Row-major matrix of equal-length vectors. Row `i` belongs to corpus
/// position `i`.
///
/// Serialized as a list of rows; deserializing goes through
/// [`EmbeddingTable::from_rows`] so a persisted table is shape-checked on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f32>>", into = "Vec<Vec<f32>>")]
pub struct EmbeddingTable {
    dim: usize,
    rows: usize,
    data: Vec<f32>,
}

impl EmbeddingTable {
    /// Fails with `EmptyEmbeddings` for no rows (or zero-width rows) and with
    /// `InconsistentRows` at the first row whose length differs from row 0.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let dim = rows.first().map(Vec::len).ok_or(Error::EmptyEmbeddings)?;
        if dim == 0 { return Err(Error::EmptyEmbeddings); }
        let mut data = Vec::with_capacity(dim * rows.len());
        for (row, v) in rows.iter().enumerate() {
            if v.len() != dim {
                return Err(Error::InconsistentRows { row, expected: dim, actual: v.len() });
            }
            data.extend_from_slice(v);
        }
        Ok(Self { dim, rows: rows.len(), data })
    }

    pub fn dim(&self) -> usize { self.dim }

    pub fn len(&self) -> usize { self.rows }

    pub fn is_empty(&self) -> bool { self.rows == 0 }

    pub fn row(&self, position: usize) -> Option<&[f32]> {
        if position >= self.rows { return None; }
        let start = position * self.dim;
        Some(&self.data[start..start + self.dim])
    }

    pub fn iter(&self) -> std::slice::ChunksExact<'_, f32> { self.data.chunks_exact(self.dim) }
}

impl TryFrom<Vec<Vec<f32>>> for EmbeddingTable {
    type Error = Error;

    fn try_from(rows: Vec<Vec<f32>>) -> Result<Self> { Self::from_rows(rows) }
}

impl From<EmbeddingTable> for Vec<Vec<f32>> {
    fn from(table: EmbeddingTable) -> Self { table.iter().map(<[f32]>::to_vec).collect() }
}
