//! Optional backup of saved artifacts to Google Drive.
//!
//! Uploading is delegated to the external `gog` tool. Every failure here is
//! reported as a warning by the caller: local files already exist.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("{0} not found; install gog and authorize Drive to enable upload")]
    ToolMissing(String),

    #[error("upload timed out after {}s for {}", .timeout.as_secs(), .file.display())]
    TimedOut { file: PathBuf, timeout: Duration },

    #[error("upload failed for {}: {output}", .file.display())]
    Failed { file: PathBuf, output: String },

    #[error("upload error: {0}")]
    Io(std::io::Error),
}

/// Copies one local file to a remote location.
pub trait Mirror {
    async fn mirror(&self, path: &Path) -> Result<(), MirrorError>;
}

/// Whether and where to mirror, decided from flags and configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorPlan {
    Disabled,
    /// Upload was asked for but no folder id is known.
    MissingFolder,
    Upload { folder_id: String },
}

impl MirrorPlan {
    /// Mirror when not suppressed and either explicitly requested or a
    /// folder id is configured.
    pub fn decide(requested: bool, suppressed: bool, folder_id: Option<String>) -> Self {
        let folder_id = folder_id.filter(|f| !f.trim().is_empty());
        if suppressed || (!requested && folder_id.is_none()) {
            return MirrorPlan::Disabled;
        }
        match folder_id {
            Some(folder_id) => MirrorPlan::Upload { folder_id },
            None => MirrorPlan::MissingFolder,
        }
    }
}

pub fn drive_folder_url(folder_id: &str) -> String {
    format!("https://drive.google.com/drive/folders/{folder_id}?usp=drive_link")
}

/// Runs `gog drive upload <file> --parent <folder>` with a time limit.
pub struct DriveMirror {
    command: Vec<String>,
    folder_id: String,
    timeout: Duration,
}

impl DriveMirror {
    pub fn new(folder_id: String, timeout: Duration) -> Self {
        Self::with_command(
            vec!["gog".into(), "drive".into(), "upload".into()],
            folder_id,
            timeout,
        )
    }

    /// Use a different upload command prefix; the file and `--parent` are
    /// appended to it.
    pub fn with_command(command: Vec<String>, folder_id: String, timeout: Duration) -> Self {
        Self {
            command,
            folder_id,
            timeout,
        }
    }

    fn program(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or("gog")
    }
}

impl Mirror for DriveMirror {
    async fn mirror(&self, path: &Path) -> Result<(), MirrorError> {
        let mut cmd = Command::new(self.program());
        cmd.args(self.command.iter().skip(1))
            .arg(path)
            .args(["--parent", &self.folder_id])
            .kill_on_drop(true);

        let output = match timeout(self.timeout, cmd.output()).await {
            Err(_) => {
                return Err(MirrorError::TimedOut {
                    file: path.to_path_buf(),
                    timeout: self.timeout,
                });
            }
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(MirrorError::ToolMissing(self.program().to_string()));
            }
            Ok(result) => result.map_err(MirrorError::Io)?,
        };

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let detail = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        Err(MirrorError::Failed {
            file: path.to_path_buf(),
            output: detail,
        })
    }
}
