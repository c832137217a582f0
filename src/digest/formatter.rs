//! Deterministic digest generation. This is the fallback/baseline an
//! optional enrichment step may override; it must always produce output,
//! with no network access, for any valid summary.

use crate::models::{
    ActivityDigest, ActivitySummary, CommitAggregate, DevelopmentStyle, RepositoryOverview,
    RepositorySummary,
};

const TOP_PROJECT_CAP: usize = 5;

/// Category label and the description keywords that map into it.
const AREA_KEYWORDS: &[(&str, &[&str])] = &[
    ("Web Development", &["web", "frontend", "react", "vue", "angular"]),
    (
        "Backend Development",
        &["backend", "api", "server", "database", "django", "fastapi"],
    ),
    ("Mobile Development", &["mobile", "ios", "android", "flutter"]),
    (
        "Data/AI/ML",
        &["data", "ml", "ai", "machine", "neural", "tensorflow", "pytorch"],
    ),
    (
        "DevOps/Cloud",
        &["devops", "docker", "kubernetes", "cloud", "aws", "azure", "gcp"],
    ),
    (
        "Tools & Libraries",
        &["tool", "cli", "lib", "framework", "utility"],
    ),
];

pub struct SummaryFormatter;

impl SummaryFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Assembles the full deterministic digest for a summary.
    pub fn build(&self, summary: &ActivitySummary) -> ActivityDigest {
        let languages = self.language_ranking(&summary.commits);
        let (narrative, insights) = self.narrative(summary, &languages);

        ActivityDigest {
            summary: narrative,
            insights,
            top_projects: self.top_projects(&summary.repositories),
            contribution_areas: self.contribution_areas(&summary.repositories),
            development_style: self.development_style(
                summary.commits.total,
                summary.pull_requests.total,
                summary.issues.total,
            ),
            languages,
            enriched: false,
        }
    }

    /// Languages by descending commit count, name ascending on ties.
    pub fn language_ranking(&self, commits: &CommitAggregate) -> Vec<String> {
        let mut ranked: Vec<(&String, &u64)> = commits.language_breakdown.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        ranked.into_iter().map(|(lang, _)| lang.clone()).collect()
    }

    /// Repositories by descending star count, top 5.
    pub fn top_projects(&self, overview: &RepositoryOverview) -> Vec<RepositorySummary> {
        let mut projects = overview.top.clone();
        projects.sort_by(|a, b| b.stars.cmp(&a.stars));
        projects.truncate(TOP_PROJECT_CAP);
        projects
    }

    /// Lower-cased keyword matching over repository descriptions. A single
    /// repository may land in several categories; no match at all yields
    /// "General Development".
    pub fn contribution_areas(&self, overview: &RepositoryOverview) -> Vec<String> {
        let mut areas = Vec::new();

        for (label, keywords) in AREA_KEYWORDS {
            let matched = overview.top.iter().any(|repo| {
                repo.description
                    .as_deref()
                    .map(|d| {
                        let lower = d.to_lowercase();
                        keywords.iter().any(|kw| lower.contains(kw))
                    })
                    .unwrap_or(false)
            });
            if matched {
                areas.push((*label).to_string());
            }
        }

        if areas.is_empty() {
            areas.push("General Development".to_string());
        }
        areas
    }

    /// Fixed ratio thresholds, checked in this order; first match wins.
    pub fn development_style(&self, commits: u64, prs: u64, issues: u64) -> DevelopmentStyle {
        let commits_f = commits as f64;
        if prs as f64 > commits_f * 0.2 {
            DevelopmentStyle::Collaborative
        } else if issues as f64 > commits_f * 0.2 {
            DevelopmentStyle::CommunityFocused
        } else if commits > 500 {
            DevelopmentStyle::Prolific
        } else {
            DevelopmentStyle::Balanced
        }
    }

    /// Template-filled narrative over fixed threshold bands. Total: every
    /// summary, including an all-zero one, yields a non-empty sentence and
    /// at least one insight.
    fn narrative(&self, summary: &ActivitySummary, languages: &[String]) -> (String, Vec<String>) {
        let commits = summary.commits.total;
        let prs = summary.pull_requests.total;
        let issues = summary.issues.total;
        let name = summary
            .profile
            .name
            .clone()
            .unwrap_or_else(|| summary.profile.login.clone());

        let lang_str = if languages.is_empty() {
            "multiple languages".to_string()
        } else {
            languages
                .iter()
                .take(5)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        };

        let sentence = if commits > 500 {
            format!(
                "{} is a prolific contributor with {} commits across {} repositories, primarily using {}. Strong track record with {} pull requests.",
                name, commits, summary.profile.public_repos, lang_str, prs
            )
        } else if prs as f64 > commits as f64 * 0.3 {
            format!(
                "Collaborative developer {} with {} commits and {} PRs, demonstrating strong teamwork in {}.",
                name, commits, prs, lang_str
            )
        } else {
            format!(
                "Active developer {} with {} commits, {} PRs, and expertise in {}.",
                name, commits, prs, lang_str
            )
        };

        let mut insights = Vec::new();

        insights.push(match commits {
            c if c > 500 => {
                "Exceptional contributor with 500+ commits showing strong development momentum"
                    .to_string()
            }
            c if c > 200 => format!("Consistent contributor with {} commits across multiple projects", c),
            c if c > 50 => format!(
                "Active contributor with {} commits indicating regular development activity",
                c
            ),
            c => format!("Moderate contribution level with {} commits", c),
        });

        match languages.len() {
            n if n >= 5 => insights.push(format!(
                "Polyglot developer - proficient in {} different programming languages",
                n
            )),
            n if n >= 3 => insights.push(format!(
                "Multi-language expertise across {}",
                languages[..3].join(", ")
            )),
            n if n >= 1 => insights.push(format!("Specialized in {}", languages.join(", "))),
            _ => {}
        }

        let repo_count = summary.repositories.total;
        let total_stars = summary.repositories.total_stars;
        insights.push(if total_stars > 100 {
            format!(
                "Impactful projects with {}+ stars, demonstrating popular contributions",
                total_stars
            )
        } else if repo_count > 20 {
            format!(
                "Diverse portfolio with {}+ repositories across different domains",
                repo_count
            )
        } else {
            format!("Focused development with {} key repositories", repo_count)
        });

        insights.push(if prs as f64 > commits as f64 * 0.2 {
            "Strong team player with significant pull request contributions".to_string()
        } else if issues as f64 > commits as f64 * 0.2 {
            "Active community participant engaged in issue tracking and resolution".to_string()
        } else {
            "Independent builder focused on code contributions and development".to_string()
        });

        (sentence, insights)
    }
}

impl Default for SummaryFormatter {
    fn default() -> Self {
        Self::new()
    }
}
