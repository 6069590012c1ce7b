//! Fusion strategies built from [`Rescore`] and [`merge_runs`].
//!
//! | Method | Runs | Per-run transform |
//! |--------|------|-------------------|
//! | [`FusionMethod::ReciprocalRankFusion`] | 2 or more | `1 / (k + rank)` |
//! | [`FusionMethod::Interpolation`] | exactly 2 | `alpha`, `1 - alpha` |
//! | [`FusionMethod::Average`] | 2 or more | `1 / N` |
//!
//! A docid absent from one run contributes zero for that run. Some tools
//! substitute the run's minimum score instead; that variant is not offered.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::error::{FusionError, Result};
use crate::merge::merge_runs;
use crate::rescore::Rescore;
use crate::run::TrecRun;

pub const DEFAULT_RRF_K: u32 = 60;
pub const DEFAULT_ALPHA: f64 = 0.5;
pub const DEFAULT_RUN_TAG: &str = "trecfuse.fusion";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FusionMethod {
    ReciprocalRankFusion { k: u32 },
    Interpolation { alpha: f64 },
    Average,
}

/// Pass-through knobs shared by every fusion method.
#[derive(Debug, Clone, PartialEq)]
pub struct FusionOptions {
    /// Records taken from each run per topic before fusion.
    pub depth: Option<usize>,
    /// Length of the fused list per topic.
    pub k: Option<usize>,
    pub tag: String,
    /// Reject interpolation/average inputs when no topic is present in every
    /// run. This is an intersection over all runs, so `{1,2}, {1,2}, {3}` is
    /// rejected even though no two of the sets are disjoint.
    pub strict_topics: bool,
}

impl Default for FusionOptions {
    fn default() -> Self {
        Self {
            depth: None,
            k: None,
            tag: DEFAULT_RUN_TAG.to_string(),
            strict_topics: false,
        }
    }
}

impl Default for FusionMethod {
    fn default() -> Self {
        Self::ReciprocalRankFusion { k: DEFAULT_RRF_K }
    }
}

impl FusionMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReciprocalRankFusion { .. } => "rrf",
            Self::Interpolation { .. } => "interpolation",
            Self::Average => "average",
        }
    }

    pub fn fuse(&self, runs: &[TrecRun], options: &FusionOptions) -> Result<TrecRun> {
        self.check_run_count(runs.len())?;
        self.check_alpha()?;
        self.check_topic_overlap(runs, options.strict_topics)?;

        let rescored: Vec<TrecRun> = match *self {
            Self::ReciprocalRankFusion { k } => runs
                .iter()
                .map(|run| run.rescored(Rescore::Rrf { k }))
                .collect(),
            Self::Interpolation { alpha } => vec![
                runs[0].rescored(Rescore::Scale { factor: alpha }),
                runs[1].rescored(Rescore::Scale {
                    factor: 1.0 - alpha,
                }),
            ],
            Self::Average => {
                let factor = 1.0 / runs.len() as f64;
                runs.iter()
                    .map(|run| run.rescored(Rescore::Scale { factor }))
                    .collect()
            }
        };

        let fused = merge_runs(&rescored, options.depth, options.k, &options.tag)?;
        debug!(
            method = self.name(),
            inputs = runs.len(),
            records = fused.len(),
            "fusion complete"
        );
        Ok(fused)
    }

    fn check_run_count(&self, actual: usize) -> Result<()> {
        let (ok, required) = match self {
            Self::Interpolation { .. } => (actual == 2, "exactly 2"),
            Self::ReciprocalRankFusion { .. } | Self::Average => (actual >= 2, "at least 2"),
        };
        if ok {
            Ok(())
        } else {
            Err(FusionError::InsufficientRuns {
                method: self.name(),
                required,
                actual,
            })
        }
    }

    fn check_alpha(&self) -> Result<()> {
        match *self {
            Self::Interpolation { alpha } if !(0.0..=1.0).contains(&alpha) => {
                Err(FusionError::InvalidAlpha { alpha })
            }
            _ => Ok(()),
        }
    }

    fn check_topic_overlap(&self, runs: &[TrecRun], strict: bool) -> Result<()> {
        if matches!(self, Self::ReciprocalRankFusion { .. }) {
            return Ok(());
        }

        let mut topic_sets = runs.iter().map(TrecRun::topics);
        let Some(first) = topic_sets.next() else {
            return Ok(());
        };
        let shared: BTreeSet<&str> = topic_sets.fold(first, |acc, topics| &acc & &topics);
        if !shared.is_empty() {
            return Ok(());
        }

        if strict {
            return Err(FusionError::IncompatibleTopics {
                method: self.name(),
            });
        }
        warn!(method = self.name(), "input runs share no common topic");
        Ok(())
    }
}
