use rayon::prelude::*;
use serde::Serialize;
use tracing::instrument;

use biomed_core::traits::Retriever;
use biomed_core::{DocId, Error, Result, RetrievalMethod};

use crate::judgments::RelevanceJudgments;
use crate::metrics::{metrics, MetricSummary};

/// Averaged metrics for one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub method: RetrievalMethod,
    pub queries: usize,
    pub metrics: MetricSummary,
}

/// Scores a retriever against relevance judgments. The retriever is a black
/// box: the fusion ranker, or anything else implementing [`Retriever`].
pub struct Evaluator<'a, R: Retriever + ?Sized> {
    retriever: &'a R,
}

impl<'a, R: Retriever + ?Sized> Evaluator<'a, R> {
    pub fn new(retriever: &'a R) -> Self { Self { retriever } }

    /// Metrics for every judged query, in judgment order.
    ///
    /// Queries run in parallel; results are collected back in order so the
    /// caller sees the same sequence regardless of scheduling.
    pub fn per_query(&self, judgments: &RelevanceJudgments, k: usize, method: RetrievalMethod) -> Result<Vec<MetricSummary>> {
        judgments
            .as_slice()
            .par_iter()
            .map(|jq| {
                let hits = self.retriever.retrieve(&jq.query, method, k)?;
                let retrieved: Vec<DocId> = hits.into_iter().map(|h| h.doc_id).collect();
                metrics(&retrieved, &jq.relevant, k)
            })
            .collect()
    }

    /// One retrieval per query, metrics per query, arithmetic mean over all
    /// queries. Fails with `EmptyJudgments` when there is nothing to score.
    #[instrument(skip_all, fields(queries = judgments.len(), k = k, method = %method))]
    pub fn evaluate(&self, judgments: &RelevanceJudgments, k: usize, method: RetrievalMethod) -> Result<EvaluationReport> {
        if judgments.is_empty() { return Err(Error::EmptyJudgments); }
        let per_query = self.per_query(judgments, k, method)?;
        let mean = MetricSummary::mean(&per_query)?;
        tracing::info!(
            precision = mean.precision,
            recall = mean.recall,
            mrr = mean.mrr,
            ndcg = mean.ndcg,
            "evaluation finished"
        );
        Ok(EvaluationReport { method, queries: per_query.len(), metrics: mean })
    }
}
