//! Binary-relevance ranking metrics at a cutoff `k`.
//!
//! | Metric      | Definition                                              |
//! |-------------|---------------------------------------------------------|
//! | Precision@k | `|retrieved ∩ relevant| / k` (nominal k, not hits)     |
//! | Recall@k    | `|retrieved ∩ relevant| / |relevant|`, 0 if none       |
//! | MRR@k       | `1 / (1 + i)` for the first relevant 0-based position i |
//! | NDCG@k      | `DCG / IDCG` with `1 / log2(i + 2)` gains, 0 if IDCG=0  |
//!
//! Only the first `k` retrieved ids are considered and an id repeated in the
//! ranking counts once, at its first position.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use biomed_core::{DocId, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub k: usize,
    pub precision: f64,
    pub recall: f64,
    pub mrr: f64,
    pub ndcg: f64,
}

impl MetricSummary {
    fn zero(k: usize) -> Self { Self { k, precision: 0.0, recall: 0.0, mrr: 0.0, ndcg: 0.0 } }

    /// `(name, value)` pairs in report order, e.g. `("Precision@5", 0.2)`.
    pub fn named(&self) -> [(String, f64); 4] {
        [
            (format!("Precision@{}", self.k), self.precision),
            (format!("Recall@{}", self.k), self.recall),
            (format!("MRR@{}", self.k), self.mrr),
            (format!("NDCG@{}", self.k), self.ndcg),
        ]
    }

    /// Arithmetic mean, summed in slice order.
    pub fn mean(per_query: &[MetricSummary]) -> Result<Self> {
        let first = per_query.first().ok_or(Error::EmptyJudgments)?;
        let mut acc = Self::zero(first.k);
        for m in per_query {
            if m.k != first.k {
                return Err(Error::InvalidArgument(format!("cannot average @{} with @{}", first.k, m.k)));
            }
            acc.precision += m.precision;
            acc.recall += m.recall;
            acc.mrr += m.mrr;
            acc.ndcg += m.ndcg;
        }
        let n = per_query.len() as f64;
        acc.precision /= n;
        acc.recall /= n;
        acc.mrr /= n;
        acc.ndcg /= n;
        Ok(acc)
    }
}

impl fmt::Display for MetricSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.named() {
            writeln!(f, "{name}: {value:.4}")?;
        }
        Ok(())
    }
}

/// Score one ranked list against its relevant set.
pub fn metrics(retrieved: &[DocId], relevant: &HashSet<DocId>, k: usize) -> Result<MetricSummary> {
    if k == 0 { return Err(Error::InvalidArgument("k must be positive".into())); }
    let mut seen: HashSet<&DocId> = HashSet::new();
    let mut hits = 0usize;
    let mut first_hit: Option<usize> = None;
    let mut dcg = 0.0f64;
    for (i, id) in retrieved.iter().take(k).enumerate() {
        if !seen.insert(id) || !relevant.contains(id) { continue; }
        hits += 1;
        first_hit.get_or_insert(i);
        dcg += discount(i);
    }
    let idcg: f64 = (0..relevant.len().min(k)).map(discount).sum();
    Ok(MetricSummary {
        k,
        precision: hits as f64 / k as f64,
        recall: if relevant.is_empty() { 0.0 } else { hits as f64 / relevant.len() as f64 },
        mrr: first_hit.map_or(0.0, |i| 1.0 / (i + 1) as f64),
        ndcg: if idcg > 0.0 { dcg / idcg } else { 0.0 },
    })
}

#[inline]
fn discount(position: usize) -> f64 {
    1.0 / (position as f64 + 2.0).log2()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(v: &[u64]) -> Vec<DocId> { v.iter().map(|&i| DocId::from(i)).collect() }

    fn set(v: &[u64]) -> HashSet<DocId> { v.iter().map(|&i| DocId::from(i)).collect() }

    #[test]
    fn known_item_in_second_place() {
        let m = metrics(&ids(&[5, 2, 9]), &set(&[2]), 3).unwrap();
        assert!((m.precision - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(m.recall, 1.0);
        assert_eq!(m.mrr, 0.5);
        assert!((m.ndcg - 1.0 / 3f64.log2()).abs() < 1e-12);
        assert!((m.ndcg - 0.6309).abs() < 1e-4);
    }

    #[test]
    fn empty_relevant_set_scores_zero() {
        let m = metrics(&ids(&[1, 2, 3]), &set(&[]), 3).unwrap();
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.ndcg, 0.0);
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.mrr, 0.0);
    }

    #[test]
    fn precision_uses_nominal_k() {
        let m = metrics(&ids(&[7]), &set(&[7]), 5).unwrap();
        assert!((m.precision - 0.2).abs() < 1e-12);
        assert_eq!(m.recall, 1.0);
        assert_eq!(m.ndcg, 1.0);
    }

    #[test]
    fn only_first_k_are_scored() {
        let m = metrics(&ids(&[1, 2, 3]), &set(&[3]), 2).unwrap();
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.mrr, 0.0);
    }

    #[test]
    fn repeated_ids_count_once() {
        let m = metrics(&ids(&[4, 4]), &set(&[4]), 2).unwrap();
        assert_eq!(m.precision, 0.5);
        assert_eq!(m.ndcg, 1.0);
    }

    #[test]
    fn ideal_dcg_is_capped_by_k() {
        // two relevant docs, k = 1, the top hit is relevant
        let m = metrics(&ids(&[1, 2]), &set(&[1, 2]), 1).unwrap();
        assert_eq!(m.ndcg, 1.0);
        assert_eq!(m.recall, 0.5);
    }

    #[test]
    fn zero_k_is_invalid() {
        assert!(matches!(metrics(&ids(&[1]), &set(&[1]), 0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn mean_and_display() {
        let a = metrics(&ids(&[1]), &set(&[1]), 1).unwrap();
        let b = metrics(&ids(&[2]), &set(&[1]), 1).unwrap();
        let avg = MetricSummary::mean(&[a, b]).unwrap();
        assert_eq!(avg.precision, 0.5);
        assert_eq!(avg.mrr, 0.5);
        assert_eq!(avg.to_string(), "Precision@1: 0.5000\nRecall@1: 0.5000\nMRR@1: 0.5000\nNDCG@1: 0.5000\n");
        assert!(matches!(MetricSummary::mean(&[]), Err(Error::EmptyJudgments)));
    }
}
