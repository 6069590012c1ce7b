use serde::{Deserialize, Serialize};

/// Placeholder value for the iteration column of the TREC run format.
pub const ITERATION_LITERAL: &str = "Q0";

/// One line of a TREC run: `topic iteration docid rank score tag`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrecRecord {
    pub topic: String,
    pub iteration: String,
    pub docid: String,
    pub rank: usize,
    pub score: f64,
    pub tag: String,
}

impl TrecRecord {
    pub fn new(
        topic: impl Into<String>,
        docid: impl Into<String>,
        rank: usize,
        score: f64,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            iteration: ITERATION_LITERAL.to_string(),
            docid: docid.into(),
            rank,
            score,
            tag: tag.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunFileSummary {
    pub path: String,
    pub sha256: String,
    pub record_count: usize,
    pub topic_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionMethodSummary {
    pub name: String,
    pub rrf_k: Option<u32>,
    pub alpha: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrelsSummary {
    pub path: String,
    pub sha256: String,
    pub filter: String,
    pub topic_count: usize,
}

/// Provenance written next to a fused run when `--manifest` is given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionRunManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub method: FusionMethodSummary,
    pub depth: Option<usize>,
    pub k: Option<usize>,
    pub runtag: String,
    pub resort: bool,
    pub strict_topics: bool,
    pub qrels: Option<QrelsSummary>,
    pub inputs: Vec<RunFileSummary>,
    pub output: RunFileSummary,
}
