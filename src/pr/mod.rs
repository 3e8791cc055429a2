pub mod filter;
pub mod types;

pub use filter::is_reviewable;
pub use types::{ChangeSet, ChangedFile};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::Config;

/// GitHub never pages more than this many files at once.
const MAX_PER_PAGE: usize = 100;
const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Error)]
pub enum PrError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("GitHub API returned {status} for {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
}

/// Something that can produce the changed files of the configured pull request.
#[async_trait]
pub trait ChangeSource: Send + Sync {
    /// Fetch the PR title and its changed files, at most `config.max_files` of them.
    async fn fetch_change_set(&self, config: &Config) -> Result<ChangeSet, PrError>;
}

/// Keep the first `cap` files, preserving API order.
pub fn truncate_files(mut files: Vec<ChangedFile>, cap: usize) -> Vec<ChangedFile> {
    files.truncate(cap);
    files
}

/// Minimal GitHub REST client for pull request metadata and file listings.
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

#[derive(serde::Deserialize)]
struct PullResponse {
    title: String,
    #[serde(default)]
    changed_files: usize,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.github_api_url.clone(),
            token: config.github_token.clone(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, usize)],
    ) -> Result<T, PrError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .header(USER_AGENT, "pr-reviewer")
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PrError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ChangeSource for GitHubClient {
    #[instrument(skip_all, fields(repo = %config.repo, pr = config.pr_number))]
    async fn fetch_change_set(&self, config: &Config) -> Result<ChangeSet, PrError> {
        let pull_url = format!(
            "{}/repos/{}/{}/pulls/{}",
            self.api_url, config.repo.owner, config.repo.name, config.pr_number
        );

        debug!("fetching PR metadata from GitHub API");
        let pull: PullResponse = self.get_json(&pull_url, &[]).await?;
        debug!(title = %pull.title, changed_files = pull.changed_files, "received PR metadata");

        let files_url = format!("{pull_url}/files");
        let per_page = config.max_files.min(MAX_PER_PAGE);
        let mut files: Vec<ChangedFile> = Vec::new();
        let mut page = 1;
        loop {
            let batch: Vec<ChangedFile> = self
                .get_json(&files_url, &[("per_page", per_page), ("page", page)])
                .await?;
            let received = batch.len();
            files.extend(batch);
            debug!(page, received, total = files.len(), "received file page");
            if received < per_page || files.len() >= config.max_files {
                break;
            }
            page += 1;
        }

        Ok(ChangeSet {
            title: pull.title,
            total_files: pull.changed_files.max(files.len()),
            files: truncate_files(files, config.max_files),
        })
    }
}
