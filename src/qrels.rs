//! Relevance judgments ("qrels"): `topic iteration docid grade` per line.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::{FusionError, Result};

const QRELS_FIELD_COUNT: usize = 4;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Qrels {
    judgments: BTreeMap<String, HashMap<String, i32>>,
}

impl Qrels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|err| FusionError::io(path, err))?;
        let qrels = Self::parse(BufReader::new(file), &path.display().to_string())?;
        debug!(
            path = %path.display(),
            topics = qrels.judgments.len(),
            judgments = qrels.len(),
            "loaded qrels"
        );
        Ok(qrels)
    }

    /// Parses judgments; a repeated (topic, docid) pair keeps the last grade.
    pub fn parse<R: BufRead>(reader: R, source_name: &str) -> Result<Self> {
        let mut qrels = Self::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|err| FusionError::io(source_name, err))?;
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != QRELS_FIELD_COUNT {
                return Err(FusionError::parse(
                    source_name,
                    index + 1,
                    &line,
                    format!(
                        "expected {QRELS_FIELD_COUNT} fields, found {}",
                        fields.len()
                    ),
                ));
            }

            let grade = fields[3].parse::<i32>().map_err(|err| {
                FusionError::parse(
                    source_name,
                    index + 1,
                    &line,
                    format!("invalid relevance grade '{}': {err}", fields[3]),
                )
            })?;
            qrels.insert(fields[0], fields[2], grade);
        }
        Ok(qrels)
    }

    pub fn insert(&mut self, topic: &str, docid: &str, grade: i32) {
        self.judgments
            .entry(topic.to_string())
            .or_default()
            .insert(docid.to_string(), grade);
    }

    /// Total number of (topic, docid) judgments.
    pub fn len(&self) -> usize {
        self.judgments.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.judgments.values().all(HashMap::is_empty)
    }

    pub fn topics(&self) -> Vec<&str> {
        self.judgments.keys().map(String::as_str).collect()
    }

    pub fn has_topic(&self, topic: &str) -> bool {
        self.judgments.contains_key(topic)
    }

    pub fn grade(&self, topic: &str, docid: &str) -> Option<i32> {
        self.judgments.get(topic)?.get(docid).copied()
    }

    pub fn contains(&self, topic: &str, docid: &str) -> bool {
        self.grade(topic, docid).is_some()
    }

    /// Distinct grades across all topics, ascending.
    pub fn relevance_grades(&self) -> Vec<i32> {
        self.judgments
            .values()
            .flat_map(|docs| docs.values().copied())
            .collect::<BTreeSet<i32>>()
            .into_iter()
            .collect()
    }

    /// Judged docids for `topic`, sorted; `grades` restricts to those grades.
    pub fn docids(&self, topic: &str, grades: Option<&[i32]>) -> Vec<&str> {
        let Some(docs) = self.judgments.get(topic) else {
            return Vec::new();
        };

        let mut docids: Vec<&str> = docs
            .iter()
            .filter(|(_, grade)| grades.is_none_or(|wanted| wanted.contains(grade)))
            .map(|(docid, _)| docid.as_str())
            .collect();
        docids.sort_unstable();
        docids
    }
}
