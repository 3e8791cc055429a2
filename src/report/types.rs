use serde::Serialize;

/// Machine-readable record written to `review-details.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewDetails {
    pub pr_number: u64,
    pub pr_title: String,
    pub files_reviewed: usize,
    pub model: String,
    /// UTC, formatted as `YYYY-MM-DD HH:MM:SS UTC`
    pub timestamp: String,
    /// Reviewed file paths in review order
    pub files: Vec<String>,
}

/// Everything one run persists.
#[derive(Debug, Clone)]
pub struct ReportRecord {
    /// Markdown written to `review-summary.md`
    pub summary: String,
    pub details: ReviewDetails,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_field_names() {
        let details = ReviewDetails {
            pr_number: 7,
            pr_title: "Fix login".to_string(),
            files_reviewed: 1,
            model: "gpt-4o-mini".to_string(),
            timestamp: "2026-01-02 03:04:05 UTC".to_string(),
            files: vec!["src/Login.java".to_string()],
        };
        let value = serde_json::to_value(&details).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        for key in ["pr_number", "pr_title", "files_reviewed", "model", "timestamp", "files"] {
            assert!(keys.contains(&key), "missing {key}");
        }
        assert_eq!(keys.len(), 6);
        assert_eq!(value["pr_number"], 7);
    }
}
