use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

use biomed_core::{Corpus, DocId, Error, Result};

/// One query and the ids judged relevant for it.
#[derive(Debug, Clone, PartialEq)]
pub struct JudgedQuery {
    pub query: String,
    pub relevant: HashSet<DocId>,
}

/// Query → relevant-id mapping that keeps insertion order, so evaluation
/// walks queries in a reproducible sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelevanceJudgments {
    entries: Vec<JudgedQuery>,
    index: HashMap<String, usize>,
}

impl RelevanceJudgments {
    pub fn new() -> Self { Self::default() }

    /// Mark `id` relevant for `query`. A repeated query unions its ids.
    pub fn insert(&mut self, query: impl Into<String>, id: DocId) {
        self.entry(query).insert(id);
    }

    /// Register `query` with no relevant ids (scored zero by recall and
    /// NDCG). An existing query is left as it is.
    pub fn insert_query(&mut self, query: impl Into<String>) {
        self.entry(query);
    }

    fn entry(&mut self, query: impl Into<String>) -> &mut HashSet<DocId> {
        let query = query.into();
        let i = match self.index.get(&query) {
            Some(&i) => i,
            None => {
                let i = self.entries.len();
                self.index.insert(query.clone(), i);
                self.entries.push(JudgedQuery { query, relevant: HashSet::new() });
                i
            }
        };
        &mut self.entries[i].relevant
    }

    pub fn get(&self, query: &str) -> Option<&HashSet<DocId>> {
        self.index.get(query).map(|&i| &self.entries[i].relevant)
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn iter(&self) -> std::slice::Iter<'_, JudgedQuery> { self.entries.iter() }

    pub fn as_slice(&self) -> &[JudgedQuery] { &self.entries }

    /// Parse a judgment file: `{"<query>": ["<id>", 123, ...], ...}`.
    /// Numeric ids are accepted and carried in their textual form; a query
    /// with an empty list is kept and has no relevant documents.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Map<String, Value> =
            serde_json::from_str(json).map_err(|e| Error::InvalidArgument(format!("judgment file: {e}")))?;
        let mut judgments = Self::new();
        for (query, ids) in raw {
            let Value::Array(ids) = ids else {
                return Err(Error::InvalidArgument(format!("judgments for '{query}' must be an array")));
            };
            judgments.insert_query(query.clone());
            for id in ids {
                let id = match id {
                    Value::String(s) => DocId::from(s),
                    Value::Number(n) => DocId::from(n.to_string()),
                    other => return Err(Error::InvalidArgument(format!("bad document id {other} for '{query}'"))),
                };
                judgments.insert(query.clone(), id);
            }
        }
        Ok(judgments)
    }
}

impl<'a> IntoIterator for &'a RelevanceJudgments {
    type Item = &'a JudgedQuery;
    type IntoIter = std::slice::Iter<'a, JudgedQuery>;
    fn into_iter(self) -> Self::IntoIter { self.entries.iter() }
}

/// Known-item judgments: each sampled document's title is a query whose only
/// relevant answer is that document.
///
/// Documents with a blank title are not eligible. When more than
/// `sample_size` are eligible, a uniform sample without replacement is drawn
/// with a ChaCha8 generator seeded by `seed` and kept in corpus order;
/// otherwise every eligible document is used.
pub fn synthetic_judgments(corpus: &Corpus, sample_size: usize, seed: u64) -> RelevanceJudgments {
    let eligible: Vec<usize> = corpus
        .iter()
        .enumerate()
        .filter(|(_, d)| !d.title.trim().is_empty())
        .map(|(pos, _)| pos)
        .collect();
    let chosen: Vec<usize> = if eligible.len() > sample_size {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut picks = rand::seq::index::sample(&mut rng, eligible.len(), sample_size).into_vec();
        picks.sort_unstable();
        picks.into_iter().map(|i| eligible[i]).collect()
    } else {
        if eligible.len() < sample_size {
            tracing::warn!(requested = sample_size, eligible = eligible.len(), "fewer eligible documents than requested; using all");
        }
        eligible
    };
    let mut judgments = RelevanceJudgments::new();
    for doc in chosen.into_iter().filter_map(|pos| corpus.get(pos)) {
        judgments.insert(doc.title.clone(), doc.id.clone());
    }
    tracing::info!(queries = judgments.len(), seed, "generated known-item judgments");
    judgments
}
