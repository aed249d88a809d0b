mod cli;
mod config;
mod error;
mod gemini;
mod lifecycle;
mod mirror;
mod report;
mod sink;
mod state_machine;
mod ui;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use console::Style;

use cli::Cli;
use config::ResearchConfig;
use gemini::{GeminiClient, JobRequest};
use lifecycle::{LifecycleClient, StatusUpdate};
use mirror::{DriveMirror, MirrorPlan, drive_folder_url};
use report::Report;
use sink::{OutputSink, mirror_artifacts};
use ui::JobProgress;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    ui::init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", Style::new().red().bold().apply_to("Error:"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ResearchConfig::load()?;
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(secs) = cli.poll_interval {
        config.poll_interval_secs = secs;
    }
    if let Some(folder) = &cli.drive_folder_id {
        config.drive_folder_id = Some(folder.clone());
    }
    let api_key = config.resolve_api_key(cli.api_key.as_deref())?;

    let transport = GeminiClient::with_base_url(api_key, config.api_base.clone())
        .context("failed to build HTTP client")?;
    let client = LifecycleClient::new(transport, config.agent.clone(), config.poll_interval());
    let request = JobRequest::new(cli.query.clone())
        .with_format(cli.format.clone())
        .with_file_search_store(cli.file_search_store.clone());

    let progress = JobProgress::start(request.query());
    let payload = match research(&client, &request, &progress, cli.stream).await {
        Ok(payload) => payload,
        Err(e) => {
            progress.abandon();
            return Err(e.into());
        }
    };

    let report = Report::from_payload(&payload);
    if report.is_fallback() {
        progress.warn("Could not extract report text from response; saving raw payload");
    }
    let artifact = match OutputSink::new(&config.output_dir).persist(&report, &payload) {
        Ok(artifact) => artifact,
        Err(e) => {
            progress.abandon();
            return Err(e.into());
        }
    };
    progress.complete(&artifact);

    let plan = MirrorPlan::decide(
        cli.drive_upload,
        cli.no_drive_upload,
        config.drive_folder_id.clone(),
    );
    match plan {
        MirrorPlan::Disabled => {}
        MirrorPlan::MissingFolder => progress.warn(
            "Drive upload skipped: set GEMINI_DEEP_RESEARCH_DRIVE_FOLDER_ID or --drive-folder-id",
        ),
        MirrorPlan::Upload { folder_id } => {
            let mirror = DriveMirror::new(folder_id.clone(), config.upload_timeout());
            let uploaded = mirror_artifacts(&artifact, &mirror).await;
            for path in &uploaded {
                progress.uploaded(path);
            }
            if !uploaded.is_empty() {
                println!("Backed up to Google Drive: {}", drive_folder_url(&folder_id));
            }
        }
    }

    Ok(())
}

async fn research(
    client: &LifecycleClient<GeminiClient>,
    request: &JobRequest,
    progress: &JobProgress,
    stream: bool,
) -> Result<serde_json::Value, error::ResearchError> {
    let interaction_id = client.submit(request).await?;
    progress.submitted(&interaction_id);

    let mut on_update = |update: &StatusUpdate<'_>| progress.update(update);
    let callback = stream.then_some(&mut on_update as &mut dyn FnMut(&StatusUpdate<'_>));
    client.await_completion(&interaction_id, callback).await
}
