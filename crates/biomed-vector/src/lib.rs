//! biomed-vector
//!
//! Exact nearest-neighbour search over a dense embedding table. See `table`
//! for the row-major storage and `search` for the brute-force scan.

pub mod search;
pub mod table;

pub use search::VectorIndex;
pub use table::EmbeddingTable;
