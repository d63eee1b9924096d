//! PubMedQA corpus loading.
//!
//! `ori_pqal.json` is one JSON object keyed by PMID. Each value carries the
//! question, a list of abstract contexts and an optional year. Entries keep
//! file order, which becomes the corpus positional order.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::types::{Corpus, Document};

#[derive(Debug, Deserialize)]
struct PubMedQaRecord {
    #[serde(rename = "QUESTION", default)]
    question: Option<String>,
    #[serde(rename = "CONTEXTS", default)]
    contexts: Vec<String>,
    #[serde(rename = "YEAR", default)]
    year: Option<Value>,
}

impl PubMedQaRecord {
    fn into_document(self, id: String) -> Document {
        let title = self.question.unwrap_or_default().trim().to_string();
        let mut text = title.clone();
        for ctx in &self.contexts {
            let ctx = ctx.trim();
            if ctx.is_empty() { continue; }
            if !text.is_empty() { text.push(' '); }
            text.push_str(ctx);
        }
        let year = self.year.as_ref().and_then(parse_year);
        Document { id: id.into(), title, text, year }
    }
}

fn parse_year(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|y| u32::try_from(y).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

/// Parse a PubMedQA document map from a JSON string.
pub fn parse_pubmedqa(json: &str) -> Result<Vec<Document>> {
    let raw: Map<String, Value> = serde_json::from_str(json).context("PubMedQA file is not a JSON object")?;
    let mut documents = Vec::with_capacity(raw.len());
    for (id, value) in raw {
        let record: PubMedQaRecord = serde_json::from_value(value)
            .with_context(|| format!("malformed PubMedQA record '{}'", id))?;
        documents.push(record.into_document(id));
    }
    Ok(documents)
}

/// Load a PubMedQA file into a [`Corpus`].
pub fn load_pubmedqa(path: &Path) -> Result<Corpus> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read corpus file {}", path.display()))?;
    let documents = parse_pubmedqa(&json)?;
    let with_year = documents.iter().filter(|d| d.year.is_some()).count();
    let corpus = Corpus::new(documents)?;
    tracing::info!(path = %path.display(), documents = corpus.len(), with_year, "loaded corpus");
    Ok(corpus)
}
