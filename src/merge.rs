//! Score-sum merging of already rescored runs.
//!
//! Topics are independent, so each one is fused on a rayon worker. Results
//! are collected in ascending topic order, which keeps the output identical
//! whatever the pool size.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rayon::prelude::*;
use tracing::debug;

use crate::error::{FusionError, Result};
use crate::model::TrecRecord;
use crate::run::{TrecRun, compare_by_score_then_docid};

/// Topics handled per merge worker.
const TOPICS_PER_WORKER: usize = 10;

/// Sums scores of identical (topic, docid) pairs across `runs` and re-ranks.
///
/// `depth` caps how many records of each run (in run order) enter the pool for
/// a topic; `k` caps the fused list per topic. A docid missing from a run adds
/// nothing for that run.
pub fn merge_runs(
    runs: &[TrecRun],
    depth: Option<usize>,
    k: Option<usize>,
    tag: &str,
) -> Result<TrecRun> {
    if runs.len() < 2 {
        return Err(FusionError::InsufficientRuns {
            method: "merge",
            required: "at least 2",
            actual: runs.len(),
        });
    }

    let grouped: Vec<BTreeMap<&str, Vec<&TrecRecord>>> =
        runs.iter().map(TrecRun::group_by_topic).collect();
    let topics: Vec<&str> = grouped
        .iter()
        .flat_map(|by_topic| by_topic.keys().copied())
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .collect();

    let workers = (topics.len() / TOPICS_PER_WORKER).max(1);
    debug!(
        runs = runs.len(),
        topics = topics.len(),
        workers,
        "merging runs"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()?;
    let per_topic: Vec<Vec<TrecRecord>> = pool.install(|| {
        topics
            .par_iter()
            .map(|topic| merge_topic(topic, &grouped, depth, k, tag))
            .collect()
    });

    Ok(TrecRun::from_records(per_topic.into_iter().flatten().collect()))
}

fn merge_topic(
    topic: &str,
    grouped: &[BTreeMap<&str, Vec<&TrecRecord>>],
    depth: Option<usize>,
    k: Option<usize>,
    tag: &str,
) -> Vec<TrecRecord> {
    let mut summed: HashMap<&str, f64> = HashMap::new();
    for by_topic in grouped {
        let Some(records) = by_topic.get(topic) else {
            continue;
        };
        for record in records.iter().take(depth.unwrap_or(usize::MAX)) {
            *summed.entry(record.docid.as_str()).or_insert(0.0) += record.score;
        }
    }

    let mut ranked: Vec<(&str, f64)> = summed.into_iter().collect();
    ranked.sort_by(|(a_docid, a_score), (b_docid, b_score)| {
        compare_by_score_then_docid(*a_score, a_docid, *b_score, b_docid)
    });
    if let Some(limit) = k {
        ranked.truncate(limit);
    }

    ranked
        .into_iter()
        .enumerate()
        .map(|(index, (docid, score))| TrecRecord::new(topic, docid, index + 1, score, tag))
        .collect()
}
