use std::fmt;
use std::io::{self, Write};

use thiserror::Error;
use tracing::warn;

use crate::console;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_MAX_FILE_SIZE: usize = 10_000;
pub const DEFAULT_MAX_FILES: usize = 20;
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// The only temperature reasoning models accept.
pub const REASONING_TEMPERATURE: f64 = 1.0;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY not found. Skipping AI review.")]
    MissingOpenAiKey,

    #[error("GITHUB_TOKEN not found. Cannot authenticate with GitHub API.")]
    MissingGithubToken,

    #[error("PR_NUMBER not provided. Pass the pull request number via workflow inputs.")]
    MissingPrNumber,

    #[error("Invalid PR_NUMBER value: {0}")]
    InvalidPrNumber(String),

    #[error("REPO_NAME not provided and GITHUB_REPOSITORY unavailable.")]
    MissingRepoName,

    #[error("Invalid repository name (expected owner/name): {0}")]
    InvalidRepoName(String),
}

impl ConfigError {
    /// Process exit code for this error. A missing OpenAI key is a soft skip
    /// so forks without the secret keep a green check.
    pub fn exit_code(&self) -> u8 {
        match self {
            ConfigError::MissingOpenAiKey => 0,
            _ => 1,
        }
    }
}

/// Non-fatal adjustments made while loading configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigWarning {
    /// A tunable could not be parsed (or was out of range) and fell back to its default.
    InvalidValue {
        var: &'static str,
        value: String,
        default: String,
    },
    /// The model only accepts one temperature; the configured one was replaced.
    TemperatureCoerced {
        model: String,
        requested: f64,
        applied: f64,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::InvalidValue { var, value, default } => {
                write!(f, "invalid {var} value {value:?}, using default {default}")
            }
            ConfigWarning::TemperatureCoerced {
                model,
                requested,
                applied,
            } => write!(
                f,
                "model {model} only supports temperature {applied}, ignoring configured {requested}"
            ),
        }
    }
}

/// Broad classes of chat models with different request constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    /// Classic chat models: free temperature, `max_tokens`.
    Standard,
    /// o-series and gpt-5 models: fixed temperature, `max_completion_tokens`.
    Reasoning,
}

impl ModelFamily {
    pub fn of(model: &str) -> Self {
        let model = model.trim().to_ascii_lowercase();
        let reasoning = ["o1", "o3", "o4", "gpt-5"]
            .iter()
            .any(|prefix| model.starts_with(prefix));
        if reasoning {
            ModelFamily::Reasoning
        } else {
            ModelFamily::Standard
        }
    }

    /// The single temperature this family accepts, if it is constrained.
    pub fn fixed_temperature(self) -> Option<f64> {
        match self {
            ModelFamily::Standard => None,
            ModelFamily::Reasoning => Some(REASONING_TEMPERATURE),
        }
    }
}

/// Repository identifier in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoName {
    pub owner: String,
    pub name: String,
}

impl RepoName {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidRepoName(raw.to_string());
        let (owner, name) = raw.split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        Ok(RepoName {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Validated run parameters, built once at startup and passed by reference
/// to every stage.
#[derive(Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub github_token: String,
    pub pr_number: u64,
    pub repo: RepoName,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    /// Diffs of this many characters or more are elided from the prompt.
    pub max_file_size: usize,
    pub max_files: usize,
    pub github_api_url: String,
    pub openai_base_url: String,
}

// Hand-written so credentials never end up in logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("pr_number", &self.pr_number)
            .field("repo", &self.repo)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("max_file_size", &self.max_file_size)
            .field("max_files", &self.max_files)
            .field("github_api_url", &self.github_api_url)
            .field("openai_base_url", &self.openai_base_url)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from the process environment. Warnings are printed
    /// with the progress lines on stdout, since CI runs without `RUST_LOG`.
    pub fn load() -> Result<Config, ConfigError> {
        let (config, warnings) = Self::from_lookup(|var| std::env::var(var).ok())?;
        // A closed stdout is not worth failing the run over.
        let _ = announce_warnings(&warnings, &mut io::stdout().lock());
        Ok(config)
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// Required values are checked in a fixed order (OpenAI key, GitHub token,
    /// PR number, repository) so the soft skip always wins when the key is
    /// missing. Tunables never fail: bad values fall back to their defaults
    /// and are reported as warnings.
    pub fn from_lookup<F>(lookup: F) -> Result<(Config, Vec<ConfigWarning>), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| {
            lookup(var)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let openai_api_key = get("OPENAI_API_KEY").ok_or(ConfigError::MissingOpenAiKey)?;
        let github_token = get("GITHUB_TOKEN").ok_or(ConfigError::MissingGithubToken)?;

        let pr_raw = get("PR_NUMBER").ok_or(ConfigError::MissingPrNumber)?;
        let pr_number = pr_raw
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidPrNumber(pr_raw.clone()))?;

        let repo_raw = get("REPO_NAME")
            .or_else(|| get("GITHUB_REPOSITORY"))
            .ok_or(ConfigError::MissingRepoName)?;
        let repo = RepoName::parse(&repo_raw)?;

        let mut warnings = Vec::new();
        let model = get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let max_tokens = tunable(
            &get,
            "OPENAI_MAX_TOKENS",
            DEFAULT_MAX_TOKENS,
            |v: &u32| *v > 0,
            &mut warnings,
        );
        let max_file_size = tunable(
            &get,
            "AI_REVIEW_MAX_FILE_SIZE",
            DEFAULT_MAX_FILE_SIZE,
            |v: &usize| *v > 0,
            &mut warnings,
        );
        let max_files = tunable(
            &get,
            "AI_REVIEW_MAX_FILES",
            DEFAULT_MAX_FILES,
            |v: &usize| *v > 0,
            &mut warnings,
        );
        let requested_temperature = tunable(
            &get,
            "OPENAI_TEMPERATURE",
            DEFAULT_TEMPERATURE,
            |v: &f64| (0.0..=2.0).contains(v),
            &mut warnings,
        );
        let temperature = apply_temperature_policy(&model, requested_temperature, &mut warnings);

        let github_api_url =
            get("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string());
        let openai_base_url =
            get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());

        let config = Config {
            openai_api_key,
            github_token,
            pr_number,
            repo,
            model,
            max_tokens,
            temperature,
            max_file_size,
            max_files,
            github_api_url: github_api_url.trim_end_matches('/').to_string(),
            openai_base_url: openai_base_url.trim_end_matches('/').to_string(),
        };
        Ok((config, warnings))
    }

    pub fn model_family(&self) -> ModelFamily {
        ModelFamily::of(&self.model)
    }
}

/// Log each warning and print it on `out`.
pub fn announce_warnings<W: Write>(warnings: &[ConfigWarning], out: &mut W) -> io::Result<()> {
    for warning in warnings {
        warn!(%warning, "configuration adjusted");
        console::write_warning(out, &warning.to_string())?;
    }
    Ok(())
}

/// Parse an optional numeric variable, falling back to `default` (with a
/// warning) when the value does not parse or fails `valid`.
fn tunable<T, G, V>(
    get: &G,
    var: &'static str,
    default: T,
    valid: V,
    warnings: &mut Vec<ConfigWarning>,
) -> T
where
    T: std::str::FromStr + fmt::Display,
    G: Fn(&str) -> Option<String>,
    V: Fn(&T) -> bool,
{
    let Some(raw) = get(var) else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(value) if valid(&value) => value,
        _ => {
            warnings.push(ConfigWarning::InvalidValue {
                var,
                value: raw,
                default: default.to_string(),
            });
            default
        }
    }
}

fn apply_temperature_policy(
    model: &str,
    requested: f64,
    warnings: &mut Vec<ConfigWarning>,
) -> f64 {
    match ModelFamily::of(model).fixed_temperature() {
        Some(fixed) if requested != fixed => {
            warnings.push(ConfigWarning::TemperatureCoerced {
                model: model.to_string(),
                requested,
                applied: fixed,
            });
            fixed
        }
        _ => requested,
    }
}
