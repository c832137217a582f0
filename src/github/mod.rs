pub mod client;
pub mod paginator;
pub mod rate_limiter;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{CommitRecord, Repository, RepositorySummary, SearchItem, SubjectProfile};

pub use client::GitHubClient;
pub use rate_limiter::RateLimiter;

/// What `/search/issues` should be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    PullRequests,
    Issues,
}

impl SearchKind {
    pub fn qualifier(self) -> &'static str {
        match self {
            SearchKind::PullRequests => "is:pr",
            SearchKind::Issues => "is:issue",
        }
    }
}

/// The source platform's REST API, seen through the narrow seam the
/// fetcher needs. All calls are authenticated with a bearer credential
/// supplied at construction time.
#[async_trait]
pub trait SourcePlatform: Send + Sync {
    async fn get_profile(&self, subject: &str) -> Result<SubjectProfile>;

    /// Repositories owned by the subject, most recently updated first,
    /// up to `limit`.
    async fn list_repositories(&self, subject: &str, limit: u32) -> Result<Vec<Repository>>;

    /// Commits authored by `author` in `repo` since `since`, up to `limit`.
    async fn list_commits(
        &self,
        repo: &Repository,
        author: &str,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<CommitRecord>>;

    /// Single-page search for PRs or issues authored by the subject and
    /// created after `since`.
    async fn search_authored(
        &self,
        subject: &str,
        kind: SearchKind,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<SearchItem>>;

    async fn list_starred(&self, subject: &str, limit: u32)
        -> Result<Vec<RepositorySummary>>;
}
