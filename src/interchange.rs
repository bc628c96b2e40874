// JSON interchange files between pipeline stages.
//
// `export` writes an events file, `cluster` reads it and writes a topics
// file:
//
//   { "events": [ { "id", "date", "text", "entities", "tf_idf", "entropy" } ] }
//   { "result": [ { "members": { "<id>": { "date", "entropy" } }, "centroid" } ] }
//
// A record whose enrichment failed also carries `enrichment_error`; its
// entities and vector are empty and its entropy is 0.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::topics::clustering::{Document, Topic};
use crate::topics::vector::WeightedVector;

/// One event ready for clustering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEvent {
    pub id: i64,
    pub date: NaiveDate,
    pub text: String,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub tf_idf: WeightedVector,
    #[serde(default)]
    pub entropy: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment_error: Option<String>,
}

impl ScoredEvent {
    pub fn is_degraded(&self) -> bool {
        self.enrichment_error.is_some()
    }

    pub fn to_document(&self) -> Document {
        Document {
            id: self.id,
            date: self.date,
            vector: self.tf_idf.clone(),
            entropy: self.entropy,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventsFile {
    pub events: Vec<ScoredEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicsFile {
    pub result: Vec<Topic>,
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for {}", path.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
