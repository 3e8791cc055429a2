use serde::Deserialize;
use std::fmt;

/// Status GitHub reports for a file in a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    Copied,
    Changed,
    Unchanged,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FileStatus::Added => "added",
            FileStatus::Modified => "modified",
            FileStatus::Removed => "removed",
            FileStatus::Renamed => "renamed",
            FileStatus::Copied => "copied",
            FileStatus::Changed => "changed",
            FileStatus::Unchanged => "unchanged",
            FileStatus::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// A single file touched by the pull request.
/// Deserialized straight from an entry of `GET /pulls/{n}/files`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangedFile {
    /// File path (e.g., "src/main/java/App.java")
    #[serde(rename = "filename")]
    pub path: String,
    pub status: FileStatus,
    /// Lines added in this file
    pub additions: usize,
    /// Lines deleted in this file
    pub deletions: usize,
    /// Unified diff of the file; absent for binary or very large changes
    #[serde(default)]
    pub patch: Option<String>,
}

/// The files of a pull request as fetched for review.
#[derive(Debug, Clone)]
pub struct ChangeSet {
    /// PR title
    pub title: String,
    /// Number of changed files GitHub reports for the whole PR
    pub total_files: usize,
    /// Changed files in API order, never more than the configured cap
    pub files: Vec<ChangedFile>,
}
