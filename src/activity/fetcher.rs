use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;

use crate::activity::aggregator::{self, RepoCommits};
use crate::config::FetchConfig;
use crate::error::{Error, Result};
use crate::github::{SearchKind, SourcePlatform};
use crate::models::{
    ActivitySummary, ActivityWindow, DiagnosticScope, FetchDiagnostic, FetchReport,
    IssueAggregate, PullRequestAggregate, Repository, RepositoryOverview, StarredOverview,
};

/// Repositories fetched for the display overview (sums still run over the
/// whole returned list).
const OVERVIEW_LISTING_LIMIT: u32 = 100;
/// Single search page size for PRs and issues.
const SEARCH_PAGE_LIMIT: u32 = 100;
/// Starred repositories fetched for display.
const STARRED_LISTING_LIMIT: u32 = 100;

/// Fetches a subject's activity from the source platform and folds it into
/// an `ActivitySummary`. Each fetch is independent and re-entrant; the only
/// fatal step is the profile call.
pub struct ActivityFetcher {
    platform: Arc<dyn SourcePlatform>,
    config: FetchConfig,
}

impl ActivityFetcher {
    pub fn new(platform: Arc<dyn SourcePlatform>, config: FetchConfig) -> Self {
        Self { platform, config }
    }

    pub async fn fetch(&self, subject: &str) -> Result<FetchReport> {
        tracing::info!("Fetching activity for: {}", subject);

        let profile = self
            .platform
            .get_profile(subject)
            .await
            .map_err(|e| match e {
                // Surfaced as-is so callers can distinguish a missing
                // subject or an exhausted quota from a dead upstream.
                Error::SubjectNotFound(_) | Error::RateLimited(_) => e,
                other => Error::upstream(subject, other),
            })?;

        let mut diagnostics = Vec::new();
        let window = ActivityWindow::trailing(self.config.commit_window_days);
        let search_since = ActivityWindow::trailing(self.config.search_window_days).since;

        let repos = match self
            .platform
            .list_repositories(subject, self.config.max_repositories)
            .await
        {
            Ok(repos) => repos,
            Err(e) => {
                tracing::warn!("repository listing failed for {}: {}", subject, e);
                diagnostics.push(FetchDiagnostic::new(
                    DiagnosticScope::RepositoryList,
                    e.to_string(),
                ));
                Vec::new()
            }
        };
        tracing::info!("Found {} repositories to scan", repos.len());

        let per_repo = self
            .fetch_repo_commits(subject, repos, window.since, &mut diagnostics)
            .await;
        let commits = aggregator::aggregate_commits(&per_repo);
        tracing::info!(
            "Aggregated {} commits across {} repositories",
            commits.total,
            commits.repos_with_commits
        );

        let pull_requests = match self
            .platform
            .search_authored(subject, SearchKind::PullRequests, search_since, SEARCH_PAGE_LIMIT)
            .await
        {
            Ok(items) => aggregator::aggregate_pull_requests(items),
            Err(e) => {
                tracing::warn!("pull request search failed for {}: {}", subject, e);
                diagnostics.push(FetchDiagnostic::new(
                    DiagnosticScope::PullRequests,
                    e.to_string(),
                ));
                PullRequestAggregate::default()
            }
        };

        let issues = match self
            .platform
            .search_authored(subject, SearchKind::Issues, search_since, SEARCH_PAGE_LIMIT)
            .await
        {
            Ok(items) => aggregator::aggregate_issues(items),
            Err(e) => {
                tracing::warn!("issue search failed for {}: {}", subject, e);
                diagnostics.push(FetchDiagnostic::new(DiagnosticScope::Issues, e.to_string()));
                IssueAggregate::default()
            }
        };

        let starred = match self
            .platform
            .list_starred(subject, STARRED_LISTING_LIMIT)
            .await
        {
            Ok(items) => aggregator::starred_overview(items),
            Err(e) => {
                tracing::warn!("starred listing failed for {}: {}", subject, e);
                diagnostics.push(FetchDiagnostic::new(DiagnosticScope::Starred, e.to_string()));
                StarredOverview::default()
            }
        };

        // Separate listing for display; star/fork sums cover all of it.
        let repositories = match self
            .platform
            .list_repositories(subject, OVERVIEW_LISTING_LIMIT)
            .await
        {
            Ok(list) => aggregator::repository_overview(&list),
            Err(e) => {
                tracing::warn!("overview listing failed for {}: {}", subject, e);
                diagnostics.push(FetchDiagnostic::new(
                    DiagnosticScope::RepositoryList,
                    e.to_string(),
                ));
                RepositoryOverview::default()
            }
        };

        let summary = ActivitySummary {
            subject: subject.to_string(),
            profile,
            commits,
            pull_requests,
            issues,
            repositories,
            starred,
            window,
            fetched_at: Utc::now(),
        };

        Ok(FetchReport {
            summary,
            diagnostics,
        })
    }

    /// Per-repository commit fetches run concurrently under a worker limit;
    /// one repository's failure never cancels the others. Results are put
    /// back in listing order before aggregation.
    async fn fetch_repo_commits(
        &self,
        author: &str,
        repos: Vec<Repository>,
        since: DateTime<Utc>,
        diagnostics: &mut Vec<FetchDiagnostic>,
    ) -> Vec<RepoCommits> {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency_limit));

        let pb = ProgressBar::new(repos.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} repos")
                .unwrap()
                .progress_chars("#>-"),
        );

        let mut commit_futures = Vec::new();
        for (index, repo) in repos.into_iter().enumerate() {
            let platform = self.platform.clone();
            let sem = semaphore.clone();
            let author = author.to_string();
            let limit = self.config.max_commits_per_repo;
            let pb = pb.clone();

            commit_futures.push(async move {
                // The semaphore is never closed while fetches are running.
                let _permit = sem.acquire().await;
                let result = platform.list_commits(&repo, &author, since, limit).await;
                pb.inc(1);
                (index, repo, result)
            });
        }

        let mut results = join_all(commit_futures).await;
        pb.finish_and_clear();
        results.sort_by_key(|(index, _, _)| *index);

        let mut ordered = Vec::new();
        for (_, repo, result) in results {
            match result {
                Ok(commits) => ordered.push(RepoCommits { repo, commits }),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", repo.full_name, e);
                    diagnostics.push(FetchDiagnostic::new(
                        DiagnosticScope::Repository(repo.name.clone()),
                        e.to_string(),
                    ));
                }
            }
        }
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CommitRecord, RepositoryOwner, RepositorySummary, SearchItem, SubjectProfile};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};

    struct StubPlatform {
        profile_fails: bool,
        repos: Vec<Repository>,
        commits: HashMap<String, Vec<CommitRecord>>,
        failing_repos: HashSet<String>,
        searches_fail: bool,
        pull_requests: Vec<SearchItem>,
        issues: Vec<SearchItem>,
    }

    impl StubPlatform {
        fn new(repos: Vec<Repository>) -> Self {
            Self {
                profile_fails: false,
                repos,
                commits: HashMap::new(),
                failing_repos: HashSet::new(),
                searches_fail: false,
                pull_requests: Vec::new(),
                issues: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl SourcePlatform for StubPlatform {
        async fn get_profile(&self, subject: &str) -> crate::error::Result<SubjectProfile> {
            if self.profile_fails {
                return Err(Error::Api("profile endpoint down".to_string()));
            }
            Ok(SubjectProfile {
                login: subject.to_string(),
                name: Some("Test Dev".to_string()),
                avatar_url: None,
                bio: None,
                location: None,
                followers: 10,
                following: 3,
                public_repos: self.repos.len() as u32,
            })
        }

        async fn list_repositories(
            &self,
            _subject: &str,
            limit: u32,
        ) -> crate::error::Result<Vec<Repository>> {
            Ok(self.repos.iter().take(limit as usize).cloned().collect())
        }

        async fn list_commits(
            &self,
            repo: &Repository,
            _author: &str,
            _since: DateTime<Utc>,
            _limit: u32,
        ) -> crate::error::Result<Vec<CommitRecord>> {
            if self.failing_repos.contains(&repo.name) {
                return Err(Error::Api(format!("boom in {}", repo.name)));
            }
            Ok(self.commits.get(&repo.name).cloned().unwrap_or_default())
        }

        async fn search_authored(
            &self,
            _subject: &str,
            kind: SearchKind,
            _since: DateTime<Utc>,
            _limit: u32,
        ) -> crate::error::Result<Vec<SearchItem>> {
            if self.searches_fail {
                return Err(Error::Api("search unavailable".to_string()));
            }
            Ok(match kind {
                SearchKind::PullRequests => self.pull_requests.clone(),
                SearchKind::Issues => self.issues.clone(),
            })
        }

        async fn list_starred(
            &self,
            _subject: &str,
            _limit: u32,
        ) -> crate::error::Result<Vec<RepositorySummary>> {
            Ok(Vec::new())
        }
    }

    fn repo(name: &str, language: Option<&str>) -> Repository {
        Repository {
            name: name.to_string(),
            full_name: format!("dev/{}", name),
            html_url: format!("https://github.com/dev/{}", name),
            description: None,
            language: language.map(str::to_string),
            stargazers_count: 1,
            forks_count: 0,
            fork: false,
            updated_at: Some(Utc::now()),
            owner: RepositoryOwner {
                login: "dev".to_string(),
            },
        }
    }

    fn commits(repo_name: &str, count: usize) -> Vec<CommitRecord> {
        (0..count)
            .map(|i| CommitRecord {
                repo: repo_name.to_string(),
                message: format!("commit {}", i),
                authored_at: Utc::now(),
                url: String::new(),
            })
            .collect()
    }

    fn fetcher(platform: StubPlatform) -> ActivityFetcher {
        ActivityFetcher::new(Arc::new(platform), FetchConfig::default())
    }

    #[tokio::test]
    async fn profile_failure_aborts_the_fetch() {
        let mut platform = StubPlatform::new(vec![repo("a", None)]);
        platform.profile_fails = true;

        let err = fetcher(platform).fetch("dev").await.unwrap_err();
        assert!(matches!(err, Error::UpstreamUnavailable { .. }));
    }

    #[tokio::test]
    async fn one_failing_repository_does_not_cancel_the_others() {
        let mut platform = StubPlatform::new(vec![
            repo("one", Some("Rust")),
            repo("two", Some("Rust")),
            repo("three", Some("Go")),
        ]);
        platform.commits.insert("one".to_string(), commits("one", 4));
        platform.commits.insert("two".to_string(), commits("two", 9));
        platform
            .commits
            .insert("three".to_string(), commits("three", 2));
        platform.failing_repos.insert("two".to_string());

        let report = fetcher(platform).fetch("dev").await.unwrap();

        let agg = &report.summary.commits;
        assert_eq!(agg.total, 6);
        assert!(agg.by_repository.contains_key("one"));
        assert!(!agg.by_repository.contains_key("two"));
        assert!(agg.by_repository.contains_key("three"));
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.scope == DiagnosticScope::Repository("two".to_string())));
    }

    #[tokio::test]
    async fn search_failures_degrade_to_empty_aggregates() {
        let mut platform = StubPlatform::new(vec![repo("a", Some("Rust"))]);
        platform.commits.insert("a".to_string(), commits("a", 3));
        platform.searches_fail = true;

        let report = fetcher(platform).fetch("dev").await.unwrap();

        assert_eq!(report.summary.pull_requests.total, 0);
        assert_eq!(report.summary.issues.total, 0);
        assert_eq!(report.summary.commits.total, 3);
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.scope == DiagnosticScope::PullRequests));
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.scope == DiagnosticScope::Issues));
    }

    #[tokio::test]
    async fn sample_order_follows_the_listing_order() {
        let mut platform = StubPlatform::new(vec![
            repo("newest", Some("Rust")),
            repo("older", Some("Rust")),
        ]);
        platform
            .commits
            .insert("newest".to_string(), commits("newest", 2));
        platform
            .commits
            .insert("older".to_string(), commits("older", 2));

        let report = fetcher(platform).fetch("dev").await.unwrap();

        let sample = &report.summary.commits.sample;
        assert_eq!(sample[0].repo, "newest");
        assert_eq!(sample[2].repo, "older");
    }

    #[tokio::test]
    async fn window_defaults_are_carried_on_the_summary() {
        let platform = StubPlatform::new(Vec::new());
        let report = fetcher(platform).fetch("dev").await.unwrap();
        assert_eq!(report.summary.window.days, 90);
    }
}
