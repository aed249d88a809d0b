//! Terminal output: logging setup, the polling spinner and colored status
//! lines.
//!
//! Diagnostics go through `log`/`env_logger`; everything the operator is
//! meant to read goes to stderr here. The report itself is never printed.

use std::path::Path;
use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::lifecycle::StatusUpdate;
use crate::sink::PersistedArtifact;

/// `RUST_LOG` wins when set; otherwise warnings, or debug with `--verbose`.
pub fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if std::env::var("RUST_LOG").is_err() {
        builder.filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        });
    }
    let _ = builder.try_init();
}

/// Spinner shown while the interaction is polled.
pub struct JobProgress {
    pb: ProgressBar,
    green: Style,
    yellow: Style,
    dim: Style,
}

impl JobProgress {
    pub fn start(query: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} [{elapsed}]")
        {
            pb.set_style(style);
        }
        pb.set_message("Submitting research job");
        pb.enable_steady_tick(Duration::from_millis(100));

        let progress = Self {
            pb,
            green: Style::new().green().bold(),
            yellow: Style::new().yellow(),
            dim: Style::new().dim(),
        };
        progress.line(&format!("Starting deep research: {query}"));
        progress
    }

    // `println` is a no-op on a hidden bar (stderr not a tty); suspend is not.
    fn line(&self, message: &str) {
        self.pb.suspend(|| eprintln!("{message}"));
    }

    pub fn submitted(&self, interaction_id: &str) {
        self.line(&format!("Interaction started: {interaction_id}"));
        self.pb
            .set_message("Polling for results (this may take several minutes)");
    }

    /// Print a streamed `[status] message` line above the spinner.
    pub fn update(&self, update: &StatusUpdate<'_>) {
        self.line(&format!(
            "{} {}",
            self.dim.apply_to(format!("[{}]", update.status)),
            update.message
        ));
        self.pb.set_message(format!("Polling ({})", update.status));
    }

    pub fn warn(&self, message: &str) {
        self.line(&format!("  {} {message}", self.yellow.apply_to("!")));
    }

    /// Clear the spinner before a fatal error is reported.
    pub fn abandon(&self) {
        self.pb.finish_and_clear();
    }

    pub fn complete(&self, artifact: &PersistedArtifact) {
        self.pb.finish_and_clear();
        eprintln!("  {} Research complete!", self.green.apply_to("✓"));
        eprintln!("  Report saved: {}", artifact.report_path.display());
        eprintln!("  Full data saved: {}", artifact.payload_path.display());
    }

    pub fn uploaded(&self, path: &Path) {
        let name = path.file_name().unwrap_or(path.as_os_str());
        eprintln!(
            "  {} Uploaded to Drive: {}",
            self.green.apply_to("↑"),
            name.to_string_lossy()
        );
    }
}
