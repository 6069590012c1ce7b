//! Pruning a run against relevance judgments.
//!
//! `retain` keeps judged documents only and drops topics without judgments;
//! `discard` keeps unjudged documents and passes unjudged topics through
//! whole. Record order is preserved in both.

use tracing::debug;

use crate::qrels::Qrels;
use crate::run::TrecRun;

pub fn retain(run: &TrecRun, qrels: &Qrels) -> TrecRun {
    let mut pruned = run.clone();
    retain_in_place(&mut pruned, qrels);
    pruned
}

pub fn discard(run: &TrecRun, qrels: &Qrels) -> TrecRun {
    let mut pruned = run.clone();
    discard_in_place(&mut pruned, qrels);
    pruned
}

pub fn retain_in_place(run: &mut TrecRun, qrels: &Qrels) {
    let before = run.len();
    run.records_mut()
        .retain(|record| qrels.contains(&record.topic, &record.docid));
    debug!(before, after = run.len(), "retained judged records");
}

pub fn discard_in_place(run: &mut TrecRun, qrels: &Qrels) {
    let before = run.len();
    run.records_mut()
        .retain(|record| !qrels.contains(&record.topic, &record.docid));
    debug!(before, after = run.len(), "discarded judged records");
}
