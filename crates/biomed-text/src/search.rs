use std::cmp::Ordering;

use biomed_core::{DocId, Error, Result};

use crate::index::LexicalIndex;
use crate::tokenize::tokenize;

pub const BM25_K1: f64 = 1.5;
pub const BM25_B: f64 = 0.75;

impl LexicalIndex {
    /// `ln((N - n + 0.5) / (n + 0.5) + 1)`, floored at 0. Zero for terms
    /// outside the vocabulary.
    pub fn idf(&self, term: &str) -> f64 {
        let n = self.doc_freq(term) as f64;
        if n == 0.0 { return 0.0; }
        let big_n = self.len() as f64;
        ((big_n - n + 0.5) / (n + 0.5) + 1.0).ln().max(0.0)
    }

    /// BM25 score of every document, indexed by position.
    ///
    /// Query tokens are sorted before accumulation so the per-document sum
    /// is performed in the same order whatever the query word order.
    pub fn score_all(&self, query: &str) -> Vec<f64> {
        let mut terms = tokenize(query);
        terms.sort_unstable();
        let mut scores = vec![0.0f64; self.len()];
        for term in &terms {
            let Some(postings) = self.postings.get(term) else { continue };
            let idf = self.idf(term);
            for &(pos, tf) in postings {
                let tf = f64::from(tf);
                let norm = if self.avgdl > 0.0 { f64::from(self.doc_len[pos]) / self.avgdl } else { 0.0 };
                scores[pos] += idf * tf * (BM25_K1 + 1.0) / (tf + BM25_K1 * (1.0 - BM25_B + BM25_B * norm));
            }
        }
        scores
    }

    /// Top `top_k` `(position, score)` pairs, descending by score, ties by
    /// ascending position. Every document is a candidate, so a query with no
    /// known terms still returns `min(top_k, N)` zero-scored hits.
    pub fn search_positions(&self, query: &str, top_k: usize) -> Result<Vec<(usize, f32)>> {
        if top_k == 0 { return Err(Error::invalid_top_k(top_k)); }
        let mut ranked: Vec<(usize, f64)> = self.score_all(query).into_iter().enumerate().collect();
        let k = top_k.min(ranked.len());
        if k < ranked.len() {
            ranked.select_nth_unstable_by(k - 1, by_score);
            ranked.truncate(k);
        }
        ranked.sort_by(by_score);
        tracing::debug!(top_k, returned = ranked.len(), "lexical search");
        Ok(ranked.into_iter().map(|(p, s)| (p, s as f32)).collect())
    }

    /// Same ranking as [`LexicalIndex::search_positions`] keyed by document id.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<(DocId, f32)>> {
        self.search_positions(query, top_k)?
            .into_iter()
            .map(|(pos, score)| {
                self.id_at(pos)
                    .cloned()
                    .map(|id| (id, score))
                    .ok_or_else(|| Error::NotFound(format!("position {pos}")))
            })
            .collect()
    }
}

fn by_score(a: &(usize, f64), b: &(usize, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}
