use std::collections::HashMap;

use biomed_core::{Corpus, DocId, Error, Result};

use crate::tokenize::tokenize;

/// One posting: corpus position and in-document term frequency.
pub(crate) type Posting = (usize, u32);

/// Term statistics for one corpus snapshot.
///
/// Built once, read-only afterwards. Postings are stored per term in
/// ascending position order, so `n(t)` is the posting list length.
#[derive(Debug, Clone)]
pub struct LexicalIndex {
    pub(crate) postings: HashMap<String, Vec<Posting>>,
    pub(crate) doc_len: Vec<u32>,
    pub(crate) avgdl: f64,
    ids: Vec<DocId>,
    fingerprint: String,
}

impl LexicalIndex {
    /// Fails with `EmptyCorpus` when the corpus has no documents.
    pub fn build(corpus: &Corpus) -> Result<Self> {
        if corpus.is_empty() { return Err(Error::EmptyCorpus); }
        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
        let mut doc_len = Vec::with_capacity(corpus.len());
        let mut total_len = 0u64;
        for (pos, doc) in corpus.iter().enumerate() {
            let tokens = tokenize(&doc.text);
            let len = u32::try_from(tokens.len()).map_err(|_| Error::InvalidArgument(format!("document {} is too long", doc.id)))?;
            total_len += u64::from(len);
            doc_len.push(len);
            let mut tf: HashMap<String, u32> = HashMap::new();
            for t in tokens { *tf.entry(t).or_insert(0) += 1; }
            for (term, freq) in tf { postings.entry(term).or_default().push((pos, freq)); }
        }
        let avgdl = total_len as f64 / corpus.len() as f64;
        tracing::info!(documents = corpus.len(), vocabulary = postings.len(), avgdl, "built lexical index");
        Ok(Self {
            postings,
            doc_len,
            avgdl,
            ids: corpus.iter().map(|d| d.id.clone()).collect(),
            fingerprint: corpus.fingerprint().to_string(),
        })
    }

    pub fn len(&self) -> usize { self.doc_len.len() }

    pub fn is_empty(&self) -> bool { self.doc_len.is_empty() }

    pub fn vocabulary_size(&self) -> usize { self.postings.len() }

    pub fn avgdl(&self) -> f64 { self.avgdl }

    /// Number of documents containing `term` (already case-folded).
    pub fn doc_freq(&self, term: &str) -> usize { self.postings.get(term).map_or(0, Vec::len) }

    /// Token length of the document at `position`.
    pub fn doc_len(&self, position: usize) -> Option<u32> { self.doc_len.get(position).copied() }

    /// Term frequency of `term` in the document at `position`.
    pub fn term_freq(&self, term: &str, position: usize) -> u32 {
        self.postings
            .get(term)
            .and_then(|p| p.binary_search_by_key(&position, |&(pos, _)| pos).ok().map(|i| p[i].1))
            .unwrap_or(0)
    }

    pub fn id_at(&self, position: usize) -> Option<&DocId> { self.ids.get(position) }

    /// Fingerprint of the corpus snapshot this index was built from.
    pub fn fingerprint(&self) -> &str { &self.fingerprint }
}
