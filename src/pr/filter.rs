use super::types::{ChangedFile, FileStatus};

/// Extensions worth sending to the reviewer: sources, build/config files,
/// scripts and data.
pub const REVIEWABLE_EXTENSIONS: &[&str] = &[
    ".java",
    ".yml",
    ".yaml",
    ".xml",
    ".sql",
    ".properties",
    ".json",
    ".sh",
    ".py",
];

/// Whether a changed file should be included in the review.
pub fn is_reviewable(file: &ChangedFile) -> bool {
    if file.status == FileStatus::Removed {
        return false;
    }
    REVIEWABLE_EXTENSIONS
        .iter()
        .any(|ext| file.path.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, status: FileStatus) -> ChangedFile {
        ChangedFile {
            path: path.to_string(),
            status,
            additions: 1,
            deletions: 0,
            patch: None,
        }
    }

    #[test]
    fn test_removed_files_never_reviewed() {
        for ext in REVIEWABLE_EXTENSIONS {
            let path = format!("src/thing{ext}");
            assert!(!is_reviewable(&file(&path, FileStatus::Removed)));
        }
    }

    #[test]
    fn test_allow_listed_extensions_reviewed() {
        for status in [
            FileStatus::Added,
            FileStatus::Modified,
            FileStatus::Renamed,
            FileStatus::Changed,
        ] {
            for ext in REVIEWABLE_EXTENSIONS {
                let path = format!("dir/file{ext}");
                assert!(is_reviewable(&file(&path, status)), "{path} ({status})");
            }
        }
    }

    #[test]
    fn test_other_extensions_skipped() {
        for path in ["README.md", "src/main.rs", "logo.png", "Makefile", "app.js", "java"] {
            assert!(!is_reviewable(&file(path, FileStatus::Modified)), "{path}");
        }
    }
}
