use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use trecfuse::fusion::{DEFAULT_ALPHA, DEFAULT_RRF_K, DEFAULT_RUN_TAG};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "trecfuse",
    version,
    about = "Fuse TREC runs with reciprocal rank fusion, interpolation or averaging"
)]
pub struct Cli {
    /// Input run files; order matters for interpolation.
    #[arg(long, required = true, num_args = 1..)]
    pub runs: Vec<PathBuf>,

    #[arg(long)]
    pub output: PathBuf,

    #[arg(long, default_value = DEFAULT_RUN_TAG)]
    pub runtag: String,

    #[arg(long, value_enum, default_value_t = Method::Rrf)]
    pub method: Method,

    #[arg(long = "rrf.k", default_value_t = DEFAULT_RRF_K)]
    pub rrf_k: u32,

    #[arg(long, default_value_t = DEFAULT_ALPHA, value_parser = parse_alpha)]
    pub alpha: f64,

    /// Records taken from each run per topic before fusion.
    #[arg(long)]
    pub depth: Option<usize>,

    /// Records kept per topic in the fused run.
    #[arg(long)]
    pub k: Option<usize>,

    /// Re-rank every input run by score before fusing.
    #[arg(long, default_value_t = false)]
    pub resort: bool,

    #[arg(long)]
    pub qrels: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = QrelsFilter::Retain)]
    pub qrels_filter: QrelsFilter,

    /// Fail when interpolation/average inputs share no topic.
    #[arg(long, default_value_t = false)]
    pub strict_topics: bool,

    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Method {
    Rrf,
    Interpolation,
    Average,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum QrelsFilter {
    Retain,
    Discard,
}

impl QrelsFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Retain => "retain",
            Self::Discard => "discard",
        }
    }
}

fn parse_alpha(raw: &str) -> Result<f64, String> {
    let alpha = raw
        .parse::<f64>()
        .map_err(|err| format!("invalid alpha '{raw}': {err}"))?;
    if (0.0..=1.0).contains(&alpha) {
        Ok(alpha)
    } else {
        Err(format!("alpha must be within [0, 1], got {alpha}"))
    }
}
