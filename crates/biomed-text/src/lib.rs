//! biomed-text
//!
//! BM25 lexical ranking over an in-memory corpus snapshot. `tokenize` holds
//! the analyzer, `index` the term statistics and `search` the scorer.

pub mod index;
pub mod search;
pub mod tokenize;

pub use index::LexicalIndex;
pub use search::{BM25_B, BM25_K1};
pub use tokenize::tokenize;
