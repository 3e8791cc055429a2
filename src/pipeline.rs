use chrono::Utc;
use std::path::Path;
use thiserror::Error;
use tracing::{info, info_span, Instrument};

use crate::config::Config;
use crate::console;
use crate::pr::{self, ChangeSource, ChangedFile, PrError};
use crate::report::{self, ReportError};
use crate::review::{self, ReviewClient};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] PrError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// How a run ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The PR had no changed files, or none that pass the filter. Nothing was written.
    NothingToReview,
    /// Both report files were written.
    Written {
        files_reviewed: usize,
        review_failed: bool,
    },
}

/// Fetch, filter, prompt, review and report, strictly in that order.
pub struct ReviewPipeline<'a> {
    config: &'a Config,
    source: &'a dyn ChangeSource,
    reviewer: &'a dyn ReviewClient,
    output_dir: &'a Path,
}

impl<'a> ReviewPipeline<'a> {
    pub fn new(
        config: &'a Config,
        source: &'a dyn ChangeSource,
        reviewer: &'a dyn ReviewClient,
        output_dir: &'a Path,
    ) -> Self {
        Self {
            config,
            source,
            reviewer,
            output_dir,
        }
    }

    pub async fn run(&self) -> Result<RunOutcome, PipelineError> {
        let span = info_span!("review", repo = %self.config.repo, pr = self.config.pr_number);
        self.run_stages().instrument(span).await
    }

    async fn run_stages(&self) -> Result<RunOutcome, PipelineError> {
        let config = self.config;
        info!("fetching changed files");
        let change_set = self.source.fetch_change_set(config).await?;
        console::step(
            "🔍",
            &format!("Reviewing PR #{}: {}", config.pr_number, change_set.title),
        );
        console::step(
            "📁",
            &format!("Found {} changed file(s)", change_set.total_files),
        );
        let files = pr::truncate_files(change_set.files, config.max_files);

        if files.is_empty() {
            console::note("No files to review");
            return Ok(RunOutcome::NothingToReview);
        }

        let reviewable: Vec<&ChangedFile> = files.iter().filter(|f| pr::is_reviewable(f)).collect();
        info!(fetched = files.len(), reviewable = reviewable.len(), "filtered files");
        if reviewable.is_empty() {
            console::note("No reviewable files found");
            return Ok(RunOutcome::NothingToReview);
        }

        console::step("📝", &format!("Reviewing {} file(s)...", reviewable.len()));
        let prompt = review::build_prompt(&reviewable, config.max_file_size);
        let outcome = review::request_review(self.reviewer, &prompt).await;

        let record = report::build(&outcome, config, &change_set.title, &reviewable, Utc::now());
        report::write(&record, self.output_dir)?;
        console::step("💾", "Review saved to files");
        info!(files_reviewed = reviewable.len(), review_failed = outcome.is_failed(), "report written");

        Ok(RunOutcome::Written {
            files_reviewed: reviewable.len(),
            review_failed: outcome.is_failed(),
        })
    }
}
