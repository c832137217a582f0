//! Pure folds from raw per-repository and per-search results into the
//! canonical aggregates. No I/O; the fetcher feeds these in listing order.

use crate::models::{
    CommitAggregate, CommitRecord, IssueAggregate, PullRequestAggregate, RepoCommitStats,
    Repository, RepositoryOverview, RepositorySummary, SearchItem, StarredOverview,
    COMMIT_SAMPLE_CAP, COMMIT_SAMPLE_PER_REPO, OVERVIEW_TOP_CAP, SEARCH_SAMPLE_CAP,
    STARRED_RECENT_CAP,
};

/// One repository's commit fetch result, kept in listing order.
#[derive(Debug, Clone)]
pub struct RepoCommits {
    pub repo: Repository,
    pub commits: Vec<CommitRecord>,
}

/// Folds per-repository results into a `CommitAggregate`. A repository
/// with an unknown language still counts toward `total`, just not toward
/// `language_breakdown`. Sampling stops at the global cap; counting never
/// does.
pub fn aggregate_commits(results: &[RepoCommits]) -> CommitAggregate {
    let mut agg = CommitAggregate::default();

    for entry in results {
        let count = entry.commits.len() as u64;
        if count == 0 {
            continue;
        }

        if let Some(language) = &entry.repo.language {
            *agg.language_breakdown.entry(language.clone()).or_insert(0) += count;
        }

        agg.by_repository.insert(
            entry.repo.name.clone(),
            RepoCommitStats {
                count,
                url: entry.repo.html_url.clone(),
                language: entry.repo.language.clone(),
                stars: entry.repo.stargazers_count,
                forks: entry.repo.forks_count,
            },
        );

        for commit in entry.commits.iter().take(COMMIT_SAMPLE_PER_REPO) {
            if agg.sample.len() >= COMMIT_SAMPLE_CAP {
                break;
            }
            agg.sample.push(commit.clone());
        }

        agg.total += count;
    }

    agg.repos_with_commits = agg.by_repository.len() as u64;
    agg
}

/// A PR is merged when `merged_at` is set, open when unmerged and its
/// state says so. Closed-unmerged PRs count only toward `total`.
pub fn aggregate_pull_requests(items: Vec<SearchItem>) -> PullRequestAggregate {
    let total = items.len() as u64;
    let merged = items.iter().filter(|i| i.merged_at.is_some()).count() as u64;
    let open = items
        .iter()
        .filter(|i| i.merged_at.is_none() && i.state == "open")
        .count() as u64;

    PullRequestAggregate {
        total,
        merged,
        open,
        sample: items.into_iter().take(SEARCH_SAMPLE_CAP).collect(),
    }
}

pub fn aggregate_issues(items: Vec<SearchItem>) -> IssueAggregate {
    let total = items.len() as u64;
    let closed = items.iter().filter(|i| i.state == "closed").count() as u64;

    IssueAggregate {
        total,
        closed,
        open: total - closed,
        sample: items.into_iter().take(SEARCH_SAMPLE_CAP).collect(),
    }
}

/// Star/fork sums run over the whole listing; only the display list is
/// capped.
pub fn repository_overview(repos: &[Repository]) -> RepositoryOverview {
    RepositoryOverview {
        total: repos.len() as u64,
        total_stars: repos.iter().map(|r| u64::from(r.stargazers_count)).sum(),
        total_forks: repos.iter().map(|r| u64::from(r.forks_count)).sum(),
        top: repos
            .iter()
            .take(OVERVIEW_TOP_CAP)
            .map(RepositorySummary::from)
            .collect(),
    }
}

pub fn starred_overview(repos: Vec<RepositorySummary>) -> StarredOverview {
    StarredOverview {
        total: repos.len() as u64,
        recent: repos.into_iter().take(STARRED_RECENT_CAP).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RepositoryOwner;
    use chrono::Utc;

    fn repo(name: &str, language: Option<&str>, stars: u32, forks: u32) -> Repository {
        Repository {
            name: name.to_string(),
            full_name: format!("dev/{}", name),
            html_url: format!("https://github.com/dev/{}", name),
            description: None,
            language: language.map(str::to_string),
            stargazers_count: stars,
            forks_count: forks,
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
                url: format!("https://github.com/dev/{}/commit/{}", repo_name, i),
            })
            .collect()
    }

    fn pr(state: &str, merged: bool) -> SearchItem {
        SearchItem {
            title: "change".to_string(),
            url: "https://github.com/dev/a/pull/1".to_string(),
            repo: "a".to_string(),
            state: state.to_string(),
            created_at: Utc::now(),
            merged_at: merged.then(Utc::now),
        }
    }

    #[test]
    fn totals_match_per_repo_counts_with_mixed_languages() {
        let results = vec![
            RepoCommits {
                repo: repo("alpha", Some("Rust"), 5, 1),
                commits: commits("alpha", 7),
            },
            RepoCommits {
                repo: repo("beta", None, 0, 0),
                commits: commits("beta", 3),
            },
            RepoCommits {
                repo: repo("gamma", Some("Rust"), 2, 0),
                commits: commits("gamma", 4),
            },
        ];

        let agg = aggregate_commits(&results);

        assert_eq!(agg.total, 14);
        assert_eq!(
            agg.by_repository.values().map(|s| s.count).sum::<u64>(),
            agg.total
        );
        // beta has no language: counted in total, absent from the breakdown
        assert_eq!(agg.language_breakdown.values().sum::<u64>(), 11);
        assert_eq!(agg.language_breakdown["Rust"], 11);
        assert_eq!(agg.repos_with_commits, 3);
    }

    #[test]
    fn repos_without_commits_are_omitted() {
        let results = vec![
            RepoCommits {
                repo: repo("alpha", Some("Go"), 0, 0),
                commits: commits("alpha", 2),
            },
            RepoCommits {
                repo: repo("idle", Some("Go"), 0, 0),
                commits: Vec::new(),
            },
        ];

        let agg = aggregate_commits(&results);

        assert_eq!(agg.total, 2);
        assert!(!agg.by_repository.contains_key("idle"));
        assert_eq!(agg.repos_with_commits, 1);
    }

    #[test]
    fn sample_caps_apply_per_repo_and_globally() {
        // 7 repos x 12 commits: 10 sampled per repo, 50 overall, totals
        // keep counting past the sample cap.
        let results: Vec<RepoCommits> = (0..7)
            .map(|i| {
                let name = format!("repo{}", i);
                RepoCommits {
                    repo: repo(&name, Some("Rust"), 0, 0),
                    commits: commits(&name, 12),
                }
            })
            .collect();

        let agg = aggregate_commits(&results);

        assert_eq!(agg.total, 84);
        assert_eq!(agg.sample.len(), COMMIT_SAMPLE_CAP);
        // First repo contributes exactly its per-repo share, in order.
        assert_eq!(
            agg.sample
                .iter()
                .filter(|c| c.repo == "repo0")
                .count(),
            COMMIT_SAMPLE_PER_REPO
        );
        assert_eq!(agg.sample[0].repo, "repo0");
    }

    #[test]
    fn closed_unmerged_prs_count_only_toward_total() {
        let items = vec![
            pr("closed", true),
            pr("closed", true),
            pr("open", false),
            pr("closed", false), // rejected without merge
        ];

        let agg = aggregate_pull_requests(items);

        assert_eq!(agg.total, 4);
        assert_eq!(agg.merged, 2);
        assert_eq!(agg.open, 1);
        assert!(agg.merged + agg.open <= agg.total);
    }

    #[test]
    fn issue_states_partition_the_total() {
        let items = vec![pr("closed", false), pr("open", false), pr("open", false)];

        let agg = aggregate_issues(items);

        assert_eq!(agg.total, 3);
        assert_eq!(agg.closed, 1);
        assert_eq!(agg.open, 2);
        assert_eq!(agg.closed + agg.open, agg.total);
    }

    #[test]
    fn search_samples_are_capped() {
        let items: Vec<SearchItem> = (0..25).map(|_| pr("open", false)).collect();
        let agg = aggregate_pull_requests(items);
        assert_eq!(agg.sample.len(), SEARCH_SAMPLE_CAP);
        assert_eq!(agg.total, 25);
    }

    #[test]
    fn overview_sums_run_over_the_full_list() {
        let repos: Vec<Repository> = (0..30)
            .map(|i| repo(&format!("r{}", i), Some("Rust"), 10, 2))
            .collect();

        let overview = repository_overview(&repos);

        assert_eq!(overview.total, 30);
        assert_eq!(overview.total_stars, 300);
        assert_eq!(overview.total_forks, 60);
        assert_eq!(overview.top.len(), OVERVIEW_TOP_CAP);
    }

    #[test]
    fn starred_recent_is_capped() {
        let repos: Vec<RepositorySummary> = (0..STARRED_RECENT_CAP + 5)
            .map(|i| RepositorySummary::from(&repo(&format!("s{}", i), None, 1, 0)))
            .collect();

        let overview = starred_overview(repos);

        assert_eq!(overview.total, (STARRED_RECENT_CAP + 5) as u64);
        assert_eq!(overview.recent.len(), STARRED_RECENT_CAP);
    }
}
