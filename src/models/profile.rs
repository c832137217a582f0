use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subject profile as returned by `GET /users/:login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectProfile {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub followers: u32,
    pub following: u32,
    pub public_repos: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stargazers_count: u32,
    pub forks_count: u32,
    #[serde(default)]
    pub fork: bool,
    pub updated_at: Option<DateTime<Utc>>,
    pub owner: RepositoryOwner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

/// Display projection of a repository, used in overviews and digests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stars: u32,
    pub forks: u32,
}

impl From<&Repository> for RepositorySummary {
    fn from(repo: &Repository) -> Self {
        Self {
            name: repo.name.clone(),
            url: repo.html_url.clone(),
            description: repo.description.clone(),
            language: repo.language.clone(),
            stars: repo.stargazers_count,
            forks: repo.forks_count,
        }
    }
}

/// One row from the `/search/issues` endpoint. `merged_at` is only ever
/// populated for pull requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchItem {
    pub title: String,
    pub url: String,
    pub repo: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
}
