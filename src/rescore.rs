//! Score transforms applied to every record of a run.
//!
//! Only `score` changes; rank, tag and record order are left untouched.

use std::collections::HashMap;

use crate::run::TrecRun;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rescore {
    /// `1 / (k + rank)`, the per-run basis of reciprocal rank fusion
    /// (Cormack et al., SIGIR 2009). Ranks must already be meaningful.
    Rrf { k: u32 },
    /// `score * factor`.
    Scale { factor: f64 },
    /// Per-topic min-max normalization into `[0, 1]`. A topic whose scores are
    /// all equal maps every record to `1.0`.
    Normalize,
}

impl Rescore {
    pub fn apply(self, run: &mut TrecRun) {
        match self {
            Self::Rrf { k } => {
                let k = f64::from(k);
                for record in run.records_mut() {
                    record.score = 1.0 / (k + record.rank as f64);
                }
            }
            Self::Scale { factor } => {
                for record in run.records_mut() {
                    record.score *= factor;
                }
            }
            Self::Normalize => normalize_per_topic(run),
        }
    }
}

impl TrecRun {
    /// Returns a rescored copy, leaving `self` untouched.
    pub fn rescored(&self, method: Rescore) -> TrecRun {
        let mut run = self.clone();
        method.apply(&mut run);
        run
    }

    pub fn rescore_in_place(&mut self, method: Rescore) {
        method.apply(self);
    }
}

fn normalize_per_topic(run: &mut TrecRun) {
    let mut bounds: HashMap<String, (f64, f64)> = HashMap::new();
    for record in run.records() {
        bounds
            .entry(record.topic.clone())
            .and_modify(|(min, max)| {
                *min = min.min(record.score);
                *max = max.max(record.score);
            })
            .or_insert((record.score, record.score));
    }

    for record in run.records_mut() {
        let (min, max) = bounds[&record.topic];
        record.score = if max == min {
            1.0
        } else {
            (record.score - min) / (max - min)
        };
    }
}
