//! In-memory TREC runs and their on-disk format.
//!
//! A run file holds one record per line with six whitespace separated fields:
//! `topic iteration docid rank score tag`. Input tolerates spaces or tabs;
//! output always uses single spaces and the literal `Q0` iteration.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{FusionError, Result};
use crate::model::{ITERATION_LITERAL, TrecRecord};
use crate::persist::write_atomic;

const RUN_FIELD_COUNT: usize = 6;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrecRun {
    records: Vec<TrecRecord>,
}

impl TrecRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<TrecRecord>) -> Self {
        Self { records }
    }

    /// Reads a run file, optionally re-ranking every topic by score.
    pub fn load(path: &Path, resort: bool) -> Result<Self> {
        let file = File::open(path).map_err(|err| FusionError::io(path, err))?;
        let run = Self::parse(BufReader::new(file), &path.display().to_string(), resort)?;
        debug!(
            path = %path.display(),
            records = run.len(),
            topics = run.topics().len(),
            resort,
            "loaded run"
        );
        Ok(run)
    }

    pub fn parse<R: BufRead>(reader: R, source_name: &str, resort: bool) -> Result<Self> {
        let mut records = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|err| FusionError::io(source_name, err))?;
            if line.trim().is_empty() {
                continue;
            }
            records.push(parse_record_line(&line, source_name, index + 1)?);
        }

        let mut run = Self { records };
        if resort {
            run.resort();
        }
        Ok(run)
    }

    /// Writes the run to `path`, replacing every tag with `tag_override` if given.
    ///
    /// The whole file is rendered in memory first and renamed into place, so a
    /// failure never leaves a truncated run behind.
    pub fn save(&self, path: &Path, tag_override: Option<&str>) -> Result<()> {
        let buffer = self.encode(path, tag_override)?;
        write_atomic(path, &buffer).map_err(|err| FusionError::io(path, err))?;

        debug!(path = %path.display(), records = self.len(), "saved run");
        Ok(())
    }

    /// Renders the exact bytes [`TrecRun::save`] would write to `path`.
    pub fn encode(&self, path: &Path, tag_override: Option<&str>) -> Result<Vec<u8>> {
        if self.records.is_empty() {
            return Err(FusionError::EmptyRun {
                path: path.to_path_buf(),
            });
        }

        let mut buffer = Vec::with_capacity(self.records.len() * 48);
        self.write_to(&mut buffer, tag_override)
            .map_err(|err| FusionError::io(path, err))?;
        Ok(buffer)
    }

    /// Serializes records sorted by topic ascending, then score descending.
    pub fn write_to<W: Write>(&self, writer: &mut W, tag_override: Option<&str>) -> io::Result<()> {
        let mut ordered: Vec<&TrecRecord> = self.records.iter().collect();
        ordered.sort_by(|a, b| {
            a.topic
                .cmp(&b.topic)
                .then_with(|| b.score.total_cmp(&a.score))
        });

        for record in ordered {
            writeln!(
                writer,
                "{} {} {} {} {} {}",
                record.topic,
                ITERATION_LITERAL,
                record.docid,
                record.rank,
                record.score,
                tag_override.unwrap_or(&record.tag)
            )?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TrecRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<TrecRecord> {
        self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut Vec<TrecRecord> {
        &mut self.records
    }

    pub fn topics(&self) -> BTreeSet<&str> {
        self.records
            .iter()
            .map(|record| record.topic.as_str())
            .collect()
    }

    /// Records for `topic` in run order, truncated to the first `limit`.
    ///
    /// The limit counts records in run order, not rank order; this is how
    /// pool depth is applied ahead of fusion.
    pub fn records_for_topic(&self, topic: &str, limit: Option<usize>) -> Vec<&TrecRecord> {
        self.records
            .iter()
            .filter(|record| record.topic == topic)
            .take(limit.unwrap_or(usize::MAX))
            .collect()
    }

    /// Groups records by topic, keeping run order inside each topic.
    pub(crate) fn group_by_topic(&self) -> BTreeMap<&str, Vec<&TrecRecord>> {
        let mut grouped: BTreeMap<&str, Vec<&TrecRecord>> = BTreeMap::new();
        for record in &self.records {
            grouped
                .entry(record.topic.as_str())
                .or_default()
                .push(record);
        }
        grouped
    }

    /// Re-orders records by topic, score descending and docid ascending, then
    /// renumbers ranks from 1 within each topic.
    pub fn resort(&mut self) {
        self.records.sort_by(|a, b| {
            a.topic
                .cmp(&b.topic)
                .then_with(|| compare_by_score_then_docid(a.score, &a.docid, b.score, &b.docid))
        });

        let mut previous_topic: Option<String> = None;
        let mut next_rank = 1;
        for record in &mut self.records {
            if previous_topic.as_deref() != Some(record.topic.as_str()) {
                previous_topic = Some(record.topic.clone());
                next_rank = 1;
            }
            record.rank = next_rank;
            next_rank += 1;
        }
    }

    pub fn resorted(&self) -> Self {
        let mut run = self.clone();
        run.resort();
        run
    }
}

impl From<Vec<TrecRecord>> for TrecRun {
    fn from(records: Vec<TrecRecord>) -> Self {
        Self::from_records(records)
    }
}

/// Total order used for ranking: higher score first, ties go to the smaller docid.
pub(crate) fn compare_by_score_then_docid(
    a_score: f64,
    a_docid: &str,
    b_score: f64,
    b_docid: &str,
) -> Ordering {
    b_score
        .total_cmp(&a_score)
        .then_with(|| a_docid.cmp(b_docid))
}

fn parse_record_line(line: &str, source_name: &str, line_number: usize) -> Result<TrecRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != RUN_FIELD_COUNT {
        return Err(FusionError::parse(
            source_name,
            line_number,
            line,
            format!(
                "expected {RUN_FIELD_COUNT} fields, found {}",
                fields.len()
            ),
        ));
    }

    let rank = fields[3].parse::<usize>().map_err(|err| {
        FusionError::parse(
            source_name,
            line_number,
            line,
            format!("invalid rank '{}': {err}", fields[3]),
        )
    })?;
    if rank == 0 {
        return Err(FusionError::parse(
            source_name,
            line_number,
            line,
            "rank must be >= 1",
        ));
    }
    let score = fields[4].parse::<f64>().map_err(|err| {
        FusionError::parse(
            source_name,
            line_number,
            line,
            format!("invalid score '{}': {err}", fields[4]),
        )
    })?;

    Ok(TrecRecord {
        topic: fields[0].to_string(),
        iteration: fields[1].to_string(),
        docid: fields[2].to_string(),
        rank,
        score,
        tag: fields[5].to_string(),
    })
}
