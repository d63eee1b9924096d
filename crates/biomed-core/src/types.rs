//! Domain types shared by the vector, lexical and hybrid engines.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Stable document identity. Numeric ids (PubMedQA PMIDs) and free-form
/// labels are both carried as their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<u64> for DocId {
    fn from(v: u64) -> Self { Self(v.to_string()) }
}

impl From<&str> for DocId {
    fn from(v: &str) -> Self { Self(v.to_string()) }
}

impl From<String> for DocId {
    fn from(v: String) -> Self { Self(v) }
}

/// A single corpus entry.
///
/// - `id`: unique across the corpus
/// - `title`: the question/title field; may be empty
/// - `text`: the scoring payload used by both indices
/// - `year`: optional publication year, validated once at ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub title: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
}

impl Document {
    pub fn new(id: impl Into<DocId>, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into(), text: text.into(), year: None }
    }

    pub fn with_year(mut self, year: u32) -> Self {
        self.year = Some(year);
        self
    }
}

/// Immutable, ordered document collection.
///
/// Position `0..len()` is the row order shared by the embedding table and the
/// lexical statistics. The `position ↔ id` mapping lives here and nowhere else.
#[derive(Debug, Clone)]
pub struct Corpus {
    documents: Vec<Document>,
    positions: HashMap<DocId, usize>,
    fingerprint: String,
}

impl Corpus {
    /// Fails with `DuplicateId` if two documents share an id. An empty corpus
    /// is accepted here and rejected by the index builders.
    pub fn new(documents: Vec<Document>) -> Result<Self> {
        let mut positions = HashMap::with_capacity(documents.len());
        let mut hasher = blake3::Hasher::new();
        for (pos, doc) in documents.iter().enumerate() {
            if positions.insert(doc.id.clone(), pos).is_some() {
                return Err(Error::DuplicateId(doc.id.clone()));
            }
            for field in [doc.id.as_str(), doc.title.as_str(), doc.text.as_str()] {
                hasher.update(&(field.len() as u64).to_le_bytes());
                hasher.update(field.as_bytes());
            }
        }
        let fingerprint = hasher.finalize().to_hex().to_string();
        Ok(Self { documents, positions, fingerprint })
    }

    pub fn len(&self) -> usize { self.documents.len() }

    pub fn is_empty(&self) -> bool { self.documents.is_empty() }

    pub fn documents(&self) -> &[Document] { &self.documents }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> { self.documents.iter() }

    pub fn get(&self, position: usize) -> Option<&Document> { self.documents.get(position) }

    pub fn id_at(&self, position: usize) -> Option<&DocId> { self.documents.get(position).map(|d| &d.id) }

    pub fn position_of(&self, id: &DocId) -> Option<usize> { self.positions.get(id).copied() }

    pub fn get_by_id(&self, id: &DocId) -> Option<&Document> {
        self.position_of(id).and_then(|p| self.documents.get(p))
    }

    /// Content hash of the snapshot (ids, titles, texts in order). Indices
    /// record it so a ranker can refuse to mix snapshots.
    pub fn fingerprint(&self) -> &str { &self.fingerprint }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;
    fn into_iter(self) -> Self::IntoIter { self.documents.iter() }
}

/// Which ranking path produced a result list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMethod {
    Vector,
    #[serde(alias = "bm25")]
    Lexical,
    Hybrid,
}

impl RetrievalMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalMethod::Vector => "vector",
            RetrievalMethod::Lexical => "lexical",
            RetrievalMethod::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for RetrievalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for RetrievalMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vector" | "dense" => Ok(RetrievalMethod::Vector),
            "lexical" | "bm25" => Ok(RetrievalMethod::Lexical),
            "hybrid" => Ok(RetrievalMethod::Hybrid),
            other => Err(Error::InvalidArgument(format!("unknown retrieval method '{other}'"))),
        }
    }
}

/// One row of a ranked result list.
///
/// `rank` is 1-based and dense. `score` is method-specific: squared distance
/// for vector hits (lower is closer), BM25 for lexical hits, RRF for hybrid.
/// Scores are never comparable across methods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedHit {
    pub doc_id: DocId,
    pub rank: usize,
    pub score: f32,
    pub title: String,
    pub text: String,
    pub source: RetrievalMethod,
}
