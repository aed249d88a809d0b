//! Command-line interface built on clap.
//!
//! Flags only; the decisions they feed (credential precedence, mirroring)
//! live in [`crate::config`] and [`crate::mirror`].

use std::path::PathBuf;

use clap::Parser;

/// Run a Gemini Deep Research job and save the report.
#[derive(Debug, Parser)]
#[command(name = "deep-research", version, about)]
pub struct Cli {
    /// Research query.
    #[arg(long)]
    pub query: String,

    /// Custom output format instructions.
    #[arg(long)]
    pub format: Option<String>,

    /// File search store name the agent may consult.
    #[arg(long)]
    pub file_search_store: Option<String>,

    /// Show progress updates while the job runs.
    #[arg(long, default_value_t = false)]
    pub stream: bool,

    /// Output directory for results [env: GEMINI_DEEP_RESEARCH_OUTPUT_DIR].
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Gemini API key (overrides GEMINI_API_KEY).
    #[arg(long)]
    pub api_key: Option<String>,

    /// Upload the .md and .json to Google Drive.
    #[arg(long, default_value_t = false)]
    pub drive_upload: bool,

    /// Skip Drive upload even if a folder id is set.
    #[arg(long, default_value_t = false)]
    pub no_drive_upload: bool,

    /// Drive folder id [env: GEMINI_DEEP_RESEARCH_DRIVE_FOLDER_ID].
    #[arg(long)]
    pub drive_folder_id: Option<String>,

    /// Seconds between status polls.
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Enable debug logging.
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}
