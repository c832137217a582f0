use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::profile::{RepositorySummary, SearchItem, SubjectProfile};

/// Global cap on retained commit samples across all repositories.
pub const COMMIT_SAMPLE_CAP: usize = 50;
/// Per-repository contribution to the commit sample.
pub const COMMIT_SAMPLE_PER_REPO: usize = 10;
/// Retained samples per search category (PRs, issues).
pub const SEARCH_SAMPLE_CAP: usize = 10;
/// Repositories retained for display in the overview.
pub const OVERVIEW_TOP_CAP: usize = 20;
/// Starred repositories retained for display.
pub const STARRED_RECENT_CAP: usize = 10;

/// Trailing time period over which activity is counted. Computed once per
/// fetch and carried on the resulting summary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActivityWindow {
    pub since: DateTime<Utc>,
    pub days: u32,
}

impl ActivityWindow {
    pub fn trailing(days: u32) -> Self {
        Self {
            since: Utc::now() - Duration::days(i64::from(days)),
            days,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    pub repo: String,
    pub message: String,
    pub authored_at: DateTime<Utc>,
    pub url: String,
}

/// Per-repository commit stats, the value side of `by_repository`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoCommitStats {
    pub count: u64,
    pub url: String,
    pub language: Option<String>,
    pub stars: u32,
    pub forks: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitAggregate {
    pub total: u64,
    pub by_repository: BTreeMap<String, RepoCommitStats>,
    pub language_breakdown: BTreeMap<String, u64>,
    pub sample: Vec<CommitRecord>,
    pub repos_with_commits: u64,
}

/// Merged and open never account for everything: a closed-unmerged PR
/// counts only toward `total`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PullRequestAggregate {
    pub total: u64,
    pub merged: u64,
    pub open: u64,
    pub sample: Vec<SearchItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueAggregate {
    pub total: u64,
    pub closed: u64,
    pub open: u64,
    pub sample: Vec<SearchItem>,
}

/// Star/fork sums run over the full listing; `top` is capped for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryOverview {
    pub total: u64,
    pub total_stars: u64,
    pub total_forks: u64,
    pub top: Vec<RepositorySummary>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StarredOverview {
    pub total: u64,
    pub recent: Vec<RepositorySummary>,
}

/// The canonical per-fetch aggregate. Created fresh for every fetch and
/// never mutated afterwards; persistence is a collaborator concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub subject: String,
    pub profile: SubjectProfile,
    pub commits: CommitAggregate,
    pub pull_requests: PullRequestAggregate,
    pub issues: IssueAggregate,
    pub repositories: RepositoryOverview,
    pub starred: StarredOverview,
    pub window: ActivityWindow,
    pub fetched_at: DateTime<Utc>,
}

/// Where a degraded fetch lost data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticScope {
    Repository(String),
    RepositoryList,
    PullRequests,
    Issues,
    Starred,
}

impl std::fmt::Display for DiagnosticScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticScope::Repository(name) => write!(f, "repository {}", name),
            DiagnosticScope::RepositoryList => write!(f, "repository listing"),
            DiagnosticScope::PullRequests => write!(f, "pull request search"),
            DiagnosticScope::Issues => write!(f, "issue search"),
            DiagnosticScope::Starred => write!(f, "starred listing"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchDiagnostic {
    pub scope: DiagnosticScope,
    pub message: String,
}

impl FetchDiagnostic {
    pub fn new(scope: DiagnosticScope, message: impl Into<String>) -> Self {
        Self {
            scope,
            message: message.into(),
        }
    }
}

/// A fetch always returns whatever data was obtainable; the diagnostics
/// record which repositories or categories contributed nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchReport {
    pub summary: ActivitySummary,
    pub diagnostics: Vec<FetchDiagnostic>,
}
