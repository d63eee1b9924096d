use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use biomed_core::config::{resolve_with_base, Config, Settings};
use biomed_core::data_processor::load_pubmedqa;
use biomed_core::traits::Embedder;
use biomed_core::{RankedHit, RetrievalMethod};
use biomed_embed::{encode_corpus, get_default_embedder};
use biomed_eval::{synthetic_judgments, Evaluator, RelevanceJudgments};
use biomed_hybrid::{rerank_candidates, FusionRanker};
use biomed_vector::EmbeddingTable;

const PREVIEW_CHARS: usize = 100;

#[derive(Parser)]
#[command(name = "biomed", about = "Hybrid biomedical document retrieval")]
struct Cli {
    /// Directory holding config.toml / config.<env>.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// PubMedQA corpus file (overrides data.corpus_path)
    #[arg(long, global = true)]
    corpus: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Retrieve documents for a query
    Search {
        #[arg(long, short)]
        query: String,
        /// vector | lexical (bm25) | hybrid
        #[arg(long, short)]
        method: Option<RetrievalMethod>,
        #[arg(long, short = 'k')]
        top_k: Option<usize>,
        /// Print the re-ranking payload as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Known-item evaluation (Precision, Recall, MRR, NDCG)
    Evaluate {
        #[arg(long)]
        samples: Option<usize>,
        #[arg(long, short)]
        k: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, short)]
        method: Option<RetrievalMethod>,
        /// JSON judgment file ({"query": ["id", ...]}) instead of synthetic judgments
        #[arg(long)]
        judgments: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn build_ranker(settings: &Settings, base: &Path, corpus_arg: Option<&str>) -> anyhow::Result<FusionRanker> {
    let corpus_path = resolve_with_base(base, corpus_arg.unwrap_or(&settings.data.corpus_path));
    let corpus = Arc::new(load_pubmedqa(&corpus_path)?);
    let embedder: Arc<dyn Embedder> = Arc::from(get_default_embedder(settings.embedding.dim)?);
    let rows = encode_corpus(embedder.as_ref(), &corpus)?;
    let table = EmbeddingTable::from_rows(rows)?;
    Ok(FusionRanker::build(corpus, table, embedder)?)
}

/// Stdout body for `biomed search`. With `json` it is only the re-rank
/// payload, so it can be piped straight into a JSON consumer.
fn render_search(query: &str, hits: &[RankedHit], json: bool) -> anyhow::Result<String> {
    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(&rerank_candidates(hits))?));
    }
    let mut out = format!("🔍 Found {} results for: \"{}\"\n", hits.len(), query);
    for hit in hits {
        let preview: String = hit.text.chars().take(PREVIEW_CHARS).collect();
        let title = if hit.title.is_empty() { "No Title" } else { hit.title.as_str() };
        out.push_str(&format!("\n  {}. score={:.4}  id={}\n", hit.rank, hit.score, hit.doc_id));
        out.push_str(&format!("     📄 {}\n", title));
        out.push_str(&format!("     📝 {}...\n", preview));
    }
    Ok(out)
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let base = cli.config.clone().unwrap_or_else(|| PathBuf::from("."));
    let config = Config::load_from(&base).map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let settings = config.settings()?;
    let ranker = build_ranker(&settings, &base, cli.corpus.as_deref())?;

    match cli.command {
        Command::Search { query, method, top_k, json } => {
            let method = method.unwrap_or(settings.search.method);
            let top_k = top_k.unwrap_or(settings.search.top_k);
            tracing::info!(top_k, %method, "retrieving candidates");
            let hits = ranker.search(&query, method, top_k)?;
            print!("{}", render_search(&query, &hits, json)?);
        }
        Command::Evaluate { samples, k, seed, method, judgments } => {
            let method = method.unwrap_or(settings.search.method);
            let k = k.unwrap_or(settings.eval.k);
            let judgments = match judgments {
                Some(path) => {
                    let json = std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read judgments {}", path.display()))?;
                    RelevanceJudgments::from_json(&json)?
                }
                None => {
                    let samples = samples.unwrap_or(settings.eval.samples);
                    let seed = seed.unwrap_or(settings.eval.seed);
                    println!("📊 Generating known-item judgments from {} sampled papers (seed {})...", samples, seed);
                    synthetic_judgments(ranker.corpus(), samples, seed)
                }
            };
            println!("Running evaluation on {} queries using method: {}...", judgments.len(), method.as_str().to_uppercase());
            let report = Evaluator::new(&ranker).evaluate(&judgments, k, method)?;
            println!("\n{}", "=".repeat(30));
            println!("EVALUATION RESULTS ({})", method.as_str().to_uppercase());
            println!("{}", "=".repeat(30));
            print!("{}", report.metrics);
            println!("{}", "=".repeat(30));
        }
    }
    Ok(())
}
