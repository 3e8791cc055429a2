mod config;
mod console;
mod pipeline;
mod pr;
mod report;
mod review;

use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use pipeline::{ReviewPipeline, RunOutcome};

/// PR Reviewer: CI tool that asks an LLM to review a GitHub Pull Request
/// and writes `review-summary.md` and `review-details.json` for a later step
/// to post.
///
/// All settings come from the environment: OPENAI_API_KEY, GITHUB_TOKEN,
/// PR_NUMBER, REPO_NAME (or GITHUB_REPOSITORY), plus optional OPENAI_MODEL,
/// OPENAI_MAX_TOKENS, OPENAI_TEMPERATURE, AI_REVIEW_MAX_FILE_SIZE and
/// AI_REVIEW_MAX_FILES.
#[derive(Parser, Debug)]
#[command(name = "pr-reviewer", version, about)]
struct Cli {
    /// Directory the review files are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = match config::Config::load() {
        Ok(config) => config,
        Err(err) => {
            console::failure(&err.to_string());
            return ExitCode::from(err.exit_code());
        }
    };
    debug!(?config, "configuration loaded");

    let source = pr::GitHubClient::new(&config);
    let reviewer = review::OpenAiClient::new(&config);
    let pipeline = ReviewPipeline::new(&config, &source, &reviewer, &cli.output_dir);

    match pipeline.run().await {
        Ok(RunOutcome::NothingToReview) => {
            info!("nothing to review");
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Written { files_reviewed, review_failed }) => {
            info!(files_reviewed, review_failed, "done");
            console::success("Code review completed successfully!");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "review run failed");
            console::failure(&format!("Error during review: {err}"));
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}
