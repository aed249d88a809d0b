//! Writing the run's artifacts to disk and handing them to a [`Mirror`].

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::{info, warn};
use serde_json::Value;

use crate::error::ResearchError;
use crate::mirror::Mirror;
use crate::report::Report;

const FILE_PREFIX: &str = "deep-research";

/// The two files written for a run. Never rewritten once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedArtifact {
    pub name: String,
    pub report_path: PathBuf,
    pub payload_path: PathBuf,
}

impl PersistedArtifact {
    pub fn paths(&self) -> [&Path; 2] {
        [&self.report_path, &self.payload_path]
    }
}

pub struct OutputSink {
    dir: PathBuf,
}

impl OutputSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write the report (`.md`) and the pretty-printed payload (`.json`).
    pub fn persist(
        &self,
        report: &Report,
        payload: &Value,
    ) -> Result<PersistedArtifact, ResearchError> {
        self.persist_at(report, payload, Local::now())
    }

    fn persist_at(
        &self,
        report: &Report,
        payload: &Value,
        now: DateTime<Local>,
    ) -> Result<PersistedArtifact, ResearchError> {
        std::fs::create_dir_all(&self.dir)?;
        let raw = serde_json::to_string_pretty(payload)?;
        let stem = format!("{FILE_PREFIX}-{}", now.format("%Y-%m-%d-%H-%M-%S"));

        let mut attempt = 0u32;
        loop {
            let name = match attempt {
                0 => stem.clone(),
                n => format!("{stem}-{n}"),
            };
            attempt += 1;
            let report_path = self.dir.join(format!("{name}.md"));
            let payload_path = self.dir.join(format!("{name}.json"));
            if payload_path.exists() {
                continue;
            }
            match write_pair(&report_path, report.text(), &payload_path, &raw) {
                Err(ResearchError::Io(e)) if e.kind() == ErrorKind::AlreadyExists => continue,
                other => other?,
            }
            info!("saved artifacts {name} in {}", self.dir.display());
            return Ok(PersistedArtifact {
                name,
                report_path,
                payload_path,
            });
        }
    }
}

/// Both files or neither: a report left without its payload is removed.
fn write_pair(
    report_path: &Path,
    report: &str,
    payload_path: &Path,
    payload: &str,
) -> Result<(), ResearchError> {
    write_new(report_path, report)?;
    if let Err(e) = write_new(payload_path, payload) {
        let _ = std::fs::remove_file(report_path);
        return Err(e);
    }
    Ok(())
}

fn write_new(path: &Path, contents: &str) -> Result<(), ResearchError> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(contents.as_bytes())?;
    Ok(())
}

/// Mirror each artifact, logging failures. Returns the paths that made it.
pub async fn mirror_artifacts<'a>(
    artifact: &'a PersistedArtifact,
    mirror: &impl Mirror,
) -> Vec<&'a Path> {
    let mut uploaded = Vec::new();
    for path in artifact.paths() {
        match mirror.mirror(path).await {
            Ok(()) => uploaded.push(path),
            Err(e) => warn!("{e}"),
        }
    }
    uploaded
}
