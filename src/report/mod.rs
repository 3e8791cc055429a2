pub mod types;

pub use types::{ReportRecord, ReviewDetails};

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::pr::ChangedFile;
use crate::review::ReviewOutcome;

pub const SUMMARY_FILE: &str = "review-summary.md";
pub const DETAILS_FILE: &str = "review-details.json";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize review details: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Format a UTC instant the way reports display it.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Build the summary and detail record for one run. The same timestamp is
/// used in both outputs.
pub fn build(
    outcome: &ReviewOutcome,
    config: &Config,
    pr_title: &str,
    files: &[&ChangedFile],
    generated_at: DateTime<Utc>,
) -> ReportRecord {
    let timestamp = format_timestamp(generated_at);
    let summary = format_summary(outcome, config, pr_title, files.len(), &timestamp);
    let details = ReviewDetails {
        pr_number: config.pr_number,
        pr_title: pr_title.to_string(),
        files_reviewed: files.len(),
        model: config.model.clone(),
        timestamp,
        files: files.iter().map(|f| f.path.clone()).collect(),
    };
    ReportRecord { summary, details }
}

fn format_summary(
    outcome: &ReviewOutcome,
    config: &Config,
    pr_title: &str,
    files_count: usize,
    timestamp: &str,
) -> String {
    let model = &config.model;
    format!(
        r#"## 🤖 AI Code Review

**Powered by:** OpenAI {model}
**Files reviewed:** {files_count}
**PR:** #{pr_number} - {pr_title}

---

{body}

---

<details>
<summary>ℹ️ About this review</summary>

This automated code review was generated using OpenAI's {model} model.
The review focuses on:
- Security vulnerabilities
- Multi-tenant isolation
- Code quality and best practices
- Performance considerations
- Testing coverage

**Note:** This is an automated review. Please use your judgment and verify suggestions before applying them.

</details>

*Review generated at: {timestamp}*
"#,
        pr_number = config.pr_number,
        body = outcome.body(),
    )
}

/// Write both report files into `dir`, replacing any previous run's output.
#[instrument(skip_all, fields(pr = record.details.pr_number, dir = %dir.display()))]
pub fn write(record: &ReportRecord, dir: &Path) -> Result<(), ReportError> {
    let summary_path = dir.join(SUMMARY_FILE);
    debug!(path = %summary_path.display(), "writing summary");
    std::fs::write(&summary_path, &record.summary).map_err(|source| ReportError::FileWrite {
        path: summary_path.clone(),
        source,
    })?;

    let details_path = dir.join(DETAILS_FILE);
    let json = serde_json::to_string_pretty(&record.details)?;
    debug!(path = %details_path.display(), "writing details");
    std::fs::write(&details_path, json).map_err(|source| ReportError::FileWrite {
        path: details_path.clone(),
        source,
    })?;
    Ok(())
}
