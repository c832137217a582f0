use crate::error::{Error, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: String,
    pub anthropic_api_key: Option<String>,
    pub database_path: String,
    pub commit_window_days: u32,
    pub search_window_days: u32,
    pub max_repositories: u32,
    pub max_commits_per_repo: u32,
    pub concurrency_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let github_token = env::var("GITHUB_TOKEN")
            .map_err(|_| Error::Config("GITHUB_TOKEN environment variable not set".to_string()))?;

        // Enrichment is optional; a missing key only disables it.
        let anthropic_api_key = env::var("ANTHROPIC_API_KEY").ok().filter(|k| !k.is_empty());

        let database_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| "devscore.db".to_string());

        let commit_window_days = env::var("COMMIT_WINDOW_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(90);

        let search_window_days = env::var("SEARCH_WINDOW_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let max_repositories = env::var("MAX_REPOSITORIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(200);

        let max_commits_per_repo = env::var("MAX_COMMITS_PER_REPO")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(200);

        let concurrency_limit = env::var("CONCURRENCY_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        Ok(Self {
            github_token,
            anthropic_api_key,
            database_path,
            commit_window_days,
            search_window_days,
            max_repositories,
            max_commits_per_repo,
            concurrency_limit,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub commit_window_days: u32,
    pub search_window_days: u32,
    pub max_repositories: u32,
    pub max_commits_per_repo: u32,
    pub concurrency_limit: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            commit_window_days: 90,
            search_window_days: 30,
            max_repositories: 200,
            max_commits_per_repo: 200,
            concurrency_limit: 5,
        }
    }
}

impl From<&Config> for FetchConfig {
    fn from(config: &Config) -> Self {
        Self {
            commit_window_days: config.commit_window_days,
            search_window_days: config.search_window_days,
            max_repositories: config.max_repositories,
            max_commits_per_repo: config.max_commits_per_repo,
            concurrency_limit: config.concurrency_limit,
        }
    }
}
