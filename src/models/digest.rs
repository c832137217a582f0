use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::activity::{ActivitySummary, FetchDiagnostic};
use super::profile::RepositorySummary;
use super::score::Score;

/// Derived descriptive fields for an activity summary. The deterministic
/// formatter always produces all of them; an enrichment pass may replace
/// only `summary` and `insights`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityDigest {
    pub summary: String,
    pub insights: Vec<String>,
    pub languages: Vec<String>,
    pub top_projects: Vec<RepositorySummary>,
    pub contribution_areas: Vec<String>,
    pub development_style: DevelopmentStyle,
    pub enriched: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DevelopmentStyle {
    Collaborative,
    CommunityFocused,
    Prolific,
    Balanced,
}

impl std::fmt::Display for DevelopmentStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DevelopmentStyle::Collaborative => {
                write!(f, "Collaborative - Strong focus on code review and teamwork")
            }
            DevelopmentStyle::CommunityFocused => write!(
                f,
                "Community-focused - Active in discussions and issue resolution"
            ),
            DevelopmentStyle::Prolific => write!(
                f,
                "Prolific contributor - High commit volume and productivity"
            ),
            DevelopmentStyle::Balanced => write!(
                f,
                "Balanced - Mix of commits, PRs, and community engagement"
            ),
        }
    }
}

/// Result of an enrichment call; overrides the digest's narrative fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrichment {
    pub summary: String,
    pub insights: Vec<String>,
}

/// The complete output of one pipeline run, consumed as a plain immutable
/// value by persistence and minting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredActivity {
    pub subject: String,
    pub summary: ActivitySummary,
    pub score: Score,
    pub digest: ActivityDigest,
    pub diagnostics: Vec<FetchDiagnostic>,
    pub scored_at: DateTime<Utc>,
}
