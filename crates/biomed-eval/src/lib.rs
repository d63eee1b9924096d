//! biomed-eval
//!
//! Retrieval-quality evaluation: relevance judgments (synthetic known-item
//! or loaded from JSON), per-query ranking metrics and averaging over a
//! judgment set.

pub mod evaluator;
pub mod judgments;
pub mod metrics;

pub use evaluator::{EvaluationReport, Evaluator};
pub use judgments::{synthetic_judgments, JudgedQuery, RelevanceJudgments};
pub use metrics::{metrics, MetricSummary};
