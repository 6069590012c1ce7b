use std::path::PathBuf;

/// Errors raised while loading, fusing, filtering or saving runs.
#[derive(Debug, thiserror::Error)]
pub enum FusionError {
    /// A run or qrels line that does not match the expected format.
    #[error("{source_name}:{line_number}: {reason}: {line:?}")]
    Parse {
        source_name: String,
        line_number: usize,
        line: String,
        reason: String,
    },

    /// Refusal to serialize a run with no records.
    #[error("refusing to write empty run to {}", path.display())]
    EmptyRun { path: PathBuf },

    /// A fusion method was handed fewer runs than it needs.
    #[error("{method} requires {required} runs, got {actual}")]
    InsufficientRuns {
        method: &'static str,
        required: &'static str,
        actual: usize,
    },

    /// Interpolation weight outside `[0, 1]` or NaN.
    #[error("interpolation alpha must be within [0, 1], got {alpha}")]
    InvalidAlpha { alpha: f64 },

    /// Strict mode: no topic is present in every input run.
    #[error("{method} inputs have no topic in common")]
    IncompatibleTopics { method: &'static str },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build merge worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl FusionError {
    pub(crate) fn parse(
        source_name: &str,
        line_number: usize,
        line: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::Parse {
            source_name: source_name.to_string(),
            line_number,
            line: line.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, FusionError>;
