use crate::error::Result;
use crate::types::Source;
use chrono::{DateTime, Local};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

const FOOTER: &str = "===============================";

/// What happened to one source during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
    Adapted(usize),
    FetchFailed(String),
    ShapeFailed(String),
}

impl SourceOutcome {
    pub fn count(&self) -> usize {
        match self {
            SourceOutcome::Adapted(n) => *n,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotOutcome {
    Written(PathBuf),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PersistOutcome {
    Inserted(usize),
    Failed(String),
}

/// Counts for one pipeline run, rendered as a run log block.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    pub sources: Vec<(Source, SourceOutcome)>,
    pub duplicates_removed: usize,
    pub total_after_dedup: usize,
    pub snapshot: SnapshotOutcome,
    pub persistence: PersistOutcome,
}

impl RunReport {
    pub fn source_count(&self, source: Source) -> usize {
        self.sources
            .iter()
            .find(|(s, _)| *s == source)
            .map(|(_, outcome)| outcome.count())
            .unwrap_or(0)
    }

    pub fn inserted(&self) -> Option<usize> {
        match self.persistence {
            PersistOutcome::Inserted(n) => Some(n),
            PersistOutcome::Failed(_) => None,
        }
    }

    /// Snapshot written and catalog updated. Failed sources do not count.
    pub fn is_success(&self) -> bool {
        matches!(self.snapshot, SnapshotOutcome::Written(_))
            && matches!(self.persistence, PersistOutcome::Inserted(_))
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "===== Run Log - {} =====",
            self.started_at.format("%Y-%m-%d %H:%M:%S")
        )?;
        for (source, outcome) in &self.sources {
            match outcome {
                SourceOutcome::Adapted(n) => writeln!(f, "{source} Events: {n}")?,
                SourceOutcome::FetchFailed(e) => {
                    writeln!(f, "{source} Events: 0 (fetch failed: {e})")?
                }
                SourceOutcome::ShapeFailed(_) => {
                    writeln!(f, "{source} Events: 0 (unexpected payload shape)")?
                }
            }
        }
        writeln!(f, "Duplicates removed: {}", self.duplicates_removed)?;
        writeln!(f, "Total (after duplicates): {}", self.total_after_dedup)?;
        match &self.snapshot {
            SnapshotOutcome::Written(path) => writeln!(f, "Snapshot: {}", path.display())?,
            SnapshotOutcome::Failed(e) => writeln!(f, "Snapshot FAILED: {e}")?,
        }
        match &self.persistence {
            PersistOutcome::Inserted(n) => writeln!(f, "Newly inserted to DB: {n}")?,
            PersistOutcome::Failed(e) => writeln!(f, "Persistence FAILED: {e}")?,
        }
        write!(f, "{FOOTER}")
    }
}

/// Appends run summaries to a plain-text log file.
#[derive(Debug, Clone)]
pub struct RunReporter {
    path: PathBuf,
}

impl RunReporter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, report: &RunReport) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file)?;
        writeln!(file, "{report}")?;
        info!("Run log updated: {}", self.path.display());
        Ok(())
    }
}
