use crate::models::{ActivityDigest, ActivitySummary};

pub const SYSTEM_PROMPT: &str = r#"You are an analyst writing short, professional summaries of developer activity.
Given an activity report, respond with valid JSON matching this exact schema:
{
    "summary": "2-3 sentence executive summary of the developer's profile and strengths",
    "insights": ["3-5 short observations about development patterns, impact, and growth opportunities"]
}

Guidelines:
- Be specific: cite counts, languages, and projects from the report
- Stay positive and professional
- Never invent activity that is not in the report"#;

/// Renders an activity summary into the enrichment prompt. The baseline
/// digest supplies the pre-ranked languages and projects so the model sees
/// the same ordering the fallback would report.
pub fn enrichment_prompt(summary: &ActivitySummary, baseline: &ActivityDigest) -> String {
    let mut prompt = String::new();

    prompt.push_str("=== DEVELOPER PROFILE ===\n");
    prompt.push_str(&format!("Username: {}\n", summary.subject));
    if let Some(name) = &summary.profile.name {
        prompt.push_str(&format!("Name: {}\n", name));
    }
    if let Some(bio) = &summary.profile.bio {
        prompt.push_str(&format!("Bio: {}\n", bio));
    }
    prompt.push_str(&format!(
        "Followers: {} / Following: {} / Public repositories: {}\n",
        summary.profile.followers, summary.profile.following, summary.profile.public_repos
    ));

    prompt.push_str(&format!(
        "\n=== ACTIVITY (last {} days) ===\n",
        summary.window.days
    ));
    prompt.push_str(&format!(
        "Commits: {} across {} repositories\n",
        summary.commits.total, summary.commits.repos_with_commits
    ));
    prompt.push_str(&format!(
        "Pull requests: {} (merged: {}, open: {})\n",
        summary.pull_requests.total, summary.pull_requests.merged, summary.pull_requests.open
    ));
    prompt.push_str(&format!(
        "Issues: {} (closed: {}, open: {})\n",
        summary.issues.total, summary.issues.closed, summary.issues.open
    ));
    prompt.push_str(&format!(
        "Total stars across repositories: {}\n",
        summary.repositories.total_stars
    ));

    if !baseline.languages.is_empty() {
        prompt.push_str("\n=== LANGUAGES (by commit count) ===\n");
        for language in baseline.languages.iter().take(10) {
            let count = summary
                .commits
                .language_breakdown
                .get(language)
                .copied()
                .unwrap_or(0);
            prompt.push_str(&format!("  - {}: {} commits\n", language, count));
        }
    }

    if !baseline.top_projects.is_empty() {
        prompt.push_str("\n=== TOP PROJECTS ===\n");
        for project in &baseline.top_projects {
            prompt.push_str(&format!(
                "  - {}: {} ({} stars, {} forks)\n",
                project.name,
                project.description.as_deref().unwrap_or("no description"),
                project.stars,
                project.forks
            ));
        }
    }

    if !summary.commits.sample.is_empty() {
        prompt.push_str("\n=== RECENT COMMITS (sample) ===\n");
        for commit in summary.commits.sample.iter().take(15) {
            let first_line = commit.message.lines().next().unwrap_or("");
            prompt.push_str(&format!("  - [{}] {}\n", commit.repo, first_line));
        }
    }

    prompt.push_str("\nProvide your analysis as JSON:\n");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::formatter::SummaryFormatter;
    use crate::models::{
        ActivityWindow, CommitAggregate, IssueAggregate, PullRequestAggregate,
        RepositoryOverview, StarredOverview, SubjectProfile,
    };
    use chrono::Utc;

    #[test]
    fn prompt_carries_counts_and_window() {
        let summary = ActivitySummary {
            subject: "octocat".to_string(),
            profile: SubjectProfile {
                login: "octocat".to_string(),
                name: None,
                avatar_url: None,
                bio: None,
                location: None,
                followers: 2,
                following: 1,
                public_repos: 8,
            },
            commits: CommitAggregate {
                total: 42,
                ..Default::default()
            },
            pull_requests: PullRequestAggregate::default(),
            issues: IssueAggregate::default(),
            repositories: RepositoryOverview::default(),
            starred: StarredOverview::default(),
            window: ActivityWindow::trailing(90),
            fetched_at: Utc::now(),
        };
        let baseline = SummaryFormatter::new().build(&summary);

        let prompt = enrichment_prompt(&summary, &baseline);
        assert!(prompt.contains("Username: octocat"));
        assert!(prompt.contains("last 90 days"));
        assert!(prompt.contains("Commits: 42"));
    }
}
