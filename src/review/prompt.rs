use crate::pr::ChangedFile;

/// System-role instruction sent with every review request.
pub const SYSTEM_PROMPT: &str = "You are an expert code reviewer specializing in Java Spring Boot applications, security, and clean architecture.";

pub const ELISION_NOTICE: &str = "*File too large for detailed review*";
pub const NO_DIFF_NOTICE: &str = "*No textual diff available*";

/// Rendered instruction text, built once and consumed by the review request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewPrompt {
    pub text: String,
}

/// Render the context block for one file. Diffs of `max_file_size`
/// characters or more are replaced with [`ELISION_NOTICE`].
pub fn file_context(file: &ChangedFile, max_file_size: usize) -> String {
    let mut context = format!("### File: {}\n", file.path);
    context.push_str(&format!("**Status**: {}\n", file.status));
    context.push_str(&format!(
        "**Changes**: +{} -{}\n\n",
        file.additions, file.deletions
    ));

    match file.patch.as_deref() {
        Some(patch) if patch.chars().count() < max_file_size => {
            context.push_str("**Diff:**\n```diff\n");
            context.push_str(patch);
            context.push_str("\n```\n");
        }
        Some(_) => {
            context.push_str(ELISION_NOTICE);
            context.push('\n');
        }
        None => {
            context.push_str(NO_DIFF_NOTICE);
            context.push('\n');
        }
    }
    context
}

/// Build the review prompt for the given files, in input order.
pub fn build_prompt(files: &[&ChangedFile], max_file_size: usize) -> ReviewPrompt {
    let files_context = files
        .iter()
        .map(|file| file_context(file, max_file_size))
        .collect::<Vec<_>>()
        .join("\n\n");

    ReviewPrompt {
        text: format!(
            r#"You are an expert code reviewer for a Java Spring Boot application with:
- Java 21
- Spring Boot 3
- PostgreSQL with Row Level Security
- Multi-tenant architecture (Hexagonal)
- JWT authentication
- Flyway migrations

Review the following code changes and provide constructive feedback.

**Focus areas:**
1. **Security**: Authentication, authorization, SQL injection, XSS, secrets exposure
2. **Multi-tenant isolation**: Ensure tenant_id is properly handled
3. **Code quality**: SOLID principles, clean code, naming conventions
4. **Performance**: N+1 queries, inefficient algorithms, missing indexes
5. **Best practices**: Spring Boot conventions, JPA best practices
6. **Testing**: Missing test coverage, edge cases
7. **Documentation**: Missing javadocs, unclear logic

**Changed Files:**
{files_context}

**Instructions:**
- Provide specific, actionable feedback
- Highlight security concerns with 🔴
- Suggest improvements with 💡
- Acknowledge good practices with ✅
- Be concise but thorough
- Focus on critical issues first

Provide your review in Markdown format.
"#
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pr::types::FileStatus;

    fn file(path: &str, patch: Option<&str>) -> ChangedFile {
        ChangedFile {
            path: path.to_string(),
            status: FileStatus::Added,
            additions: 12,
            deletions: 4,
            patch: patch.map(str::to_string),
        }
    }

    #[test]
    fn test_small_diff_is_fenced() {
        let context = file_context(&file("db/V1__init.sql", Some("+CREATE TABLE t();")), 100);
        assert!(context.starts_with("### File: db/V1__init.sql\n"));
        assert!(context.contains("**Status**: added\n"));
        assert!(context.contains("**Changes**: +12 -4\n"));
        assert!(context.contains("```diff\n+CREATE TABLE t();\n```"));
        assert!(!context.contains(ELISION_NOTICE));
    }

    #[test]
    fn test_diff_at_threshold_is_elided() {
        let patch = "x".repeat(50);
        let at = file_context(&file("a.py", Some(&patch)), 50);
        assert!(at.contains(ELISION_NOTICE));
        assert!(!at.contains(&patch));

        let over = file_context(&file("a.py", Some(&patch)), 10);
        assert!(over.contains(ELISION_NOTICE));
        assert!(!over.contains("```diff"));

        let under = file_context(&file("a.py", Some(&patch)), 51);
        assert!(under.contains(&patch));
    }

    #[test]
    fn test_threshold_counts_characters() {
        let patch = "é".repeat(10);
        let context = file_context(&file("a.json", Some(&patch)), 11);
        assert!(context.contains(&patch));
    }

    #[test]
    fn test_missing_patch_notice() {
        let context = file_context(&file("data.json", None), 100);
        assert!(context.contains(NO_DIFF_NOTICE));
        assert!(!context.contains("```diff"));
    }

    #[test]
    fn test_prompt_keeps_file_order() {
        let first = file("first.java", Some("+a"));
        let second = file("second.yml", Some("+b"));
        let prompt = build_prompt(&[&first, &second], 1000);
        let a = prompt.text.find("### File: first.java").unwrap();
        let b = prompt.text.find("### File: second.yml").unwrap();
        assert!(a < b);
        assert!(prompt.text.contains("**Focus areas:**"));
        assert!(prompt.text.contains("Highlight security concerns with 🔴"));
        assert!(prompt.text.ends_with("Provide your review in Markdown format.\n"));
    }
}
