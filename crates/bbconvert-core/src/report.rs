use crate::plan::{OutputPlan, WriteKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub code: String,
    pub message: String,
}

impl Note {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    /// Dry run; nothing touched.
    Planned,
    Written,
    /// Destination already held identical bytes.
    Unchanged,
    /// Stale sidecar deleted while overwriting.
    Removed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteRecord {
    pub kind: WriteKind,
    pub path: PathBuf,
    pub outcome: WriteOutcome,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WriteCounts {
    pub models: usize,
    pub textures: usize,
    pub mcmeta: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub model_path: PathBuf,
    pub texture_dir: PathBuf,
    pub dry_run: bool,
    pub counts: WriteCounts,
    pub writes: Vec<WriteRecord>,
    pub notes: Vec<Note>,
}

impl ConversionReport {
    pub fn new(
        input: PathBuf,
        plan: &OutputPlan,
        dry_run: bool,
        writes: Vec<WriteRecord>,
        notes: Vec<Note>,
    ) -> Self {
        let mut counts = WriteCounts::default();
        for w in plan.writes() {
            match w.kind {
                WriteKind::Model => counts.models += 1,
                WriteKind::Texture => counts.textures += 1,
                WriteKind::McMeta => counts.mcmeta += 1,
            }
        }
        Self {
            input,
            model_path: plan.model_path().to_path_buf(),
            texture_dir: plan.texture_dir().to_path_buf(),
            dry_run,
            counts,
            writes,
            notes,
        }
    }
}
