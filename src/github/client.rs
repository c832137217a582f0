use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{header, Client, Response, StatusCode};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::github::paginator::Paginator;
use crate::github::rate_limiter::RateLimiter;
use crate::github::{SearchKind, SourcePlatform};
use crate::models::{CommitRecord, Repository, RepositorySummary, SearchItem, SubjectProfile};

use async_trait::async_trait;

const REQUEST_TIMEOUT_SECS: u64 = 30;

pub struct GitHubClient {
    client: Client,
    rate_limiter: RateLimiter,
    base_url: String,
}

impl GitHubClient {
    /// A missing credential is a configuration error at construction, not
    /// a per-call failure.
    pub fn new(token: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(Error::Config("GitHub token must not be empty".to_string()));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("devscore/0.1"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(),
            base_url: "https://api.github.com".to_string(),
        })
    }

    async fn check_status(&self, response: Response) -> Result<Response> {
        let status = response.status();

        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            let exhausted = response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                .map(|v| v == "0")
                .unwrap_or(false);
            if exhausted {
                return Err(Error::RateLimited(self.rate_limiter.reset_in_secs().await));
            }
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api(format!("{} - {}", status, body)));
        }

        Ok(response)
    }
}

pub(crate) fn search_query(subject: &str, kind: SearchKind, since: DateTime<Utc>) -> String {
    format!(
        "author:{} {} created:>{}",
        subject,
        kind.qualifier(),
        since.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

fn repo_name_from_url(repository_url: &str) -> String {
    repository_url
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl SourcePlatform for GitHubClient {
    async fn get_profile(&self, subject: &str) -> Result<SubjectProfile> {
        self.rate_limiter.acquire().await;
        let url = format!("{}/users/{}", self.base_url, subject);
        tracing::info!("Fetching profile: {}", subject);

        let response = self.client.get(&url).send().await?;
        self.rate_limiter.observe(&response).await;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::SubjectNotFound(subject.to_string()));
        }

        let response = self.check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn list_repositories(&self, subject: &str, limit: u32) -> Result<Vec<Repository>> {
        let url = format!(
            "{}/users/{}/repos?type=owner&sort=updated",
            self.base_url, subject
        );
        tracing::debug!("Listing repositories for: {}", subject);
        let paginator = Paginator::new(&self.client, &self.rate_limiter);
        paginator.fetch_limited(&url, 100, limit).await
    }

    async fn list_commits(
        &self,
        repo: &Repository,
        author: &str,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<CommitRecord>> {
        let url = format!(
            "{}/repos/{}/commits?author={}&since={}",
            self.base_url,
            repo.full_name,
            author,
            since.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        tracing::debug!("Fetching commits for: {}", repo.full_name);

        let paginator = Paginator::new(&self.client, &self.rate_limiter);
        let commits: Vec<ApiCommit> = paginator.fetch_limited(&url, 100, limit).await?;

        Ok(commits
            .into_iter()
            .map(|c| CommitRecord {
                repo: repo.name.clone(),
                message: c.commit.message,
                authored_at: c.commit.author.date,
                url: c.html_url,
            })
            .collect())
    }

    async fn search_authored(
        &self,
        subject: &str,
        kind: SearchKind,
        since: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<SearchItem>> {
        self.rate_limiter.acquire().await;
        let url = format!("{}/search/issues", self.base_url);
        let query = search_query(subject, kind, since);
        let per_page = limit.to_string();
        tracing::debug!("Searching: {}", query);

        let response = self
            .client
            .get(&url)
            .query(&[("q", query.as_str()), ("per_page", per_page.as_str())])
            .send()
            .await?;
        self.rate_limiter.observe(&response).await;
        let response = self.check_status(response).await?;

        let result: SearchResponse = response.json().await?;
        Ok(result
            .items
            .into_iter()
            .map(|item| SearchItem {
                title: item.title,
                url: item.html_url,
                repo: repo_name_from_url(&item.repository_url),
                state: item.state,
                created_at: item.created_at,
                merged_at: item.pull_request.and_then(|pr| pr.merged_at),
            })
            .collect())
    }

    async fn list_starred(
        &self,
        subject: &str,
        limit: u32,
    ) -> Result<Vec<RepositorySummary>> {
        let url = format!("{}/users/{}/starred?sort=updated", self.base_url, subject);
        tracing::debug!("Listing starred repositories for: {}", subject);

        let paginator = Paginator::new(&self.client, &self.rate_limiter);
        let repos: Vec<Repository> = paginator.fetch_limited(&url, 100, limit).await?;
        Ok(repos.iter().map(RepositorySummary::from).collect())
    }
}

#[derive(Deserialize)]
struct ApiCommit {
    html_url: String,
    commit: ApiCommitDetails,
}

#[derive(Deserialize)]
struct ApiCommitDetails {
    message: String,
    author: ApiCommitAuthor,
}

#[derive(Deserialize)]
struct ApiCommitAuthor {
    date: DateTime<Utc>,
}

#[derive(Deserialize)]
struct SearchResponse {
    items: Vec<ApiSearchItem>,
}

#[derive(Deserialize)]
struct ApiSearchItem {
    title: String,
    html_url: String,
    repository_url: String,
    state: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    pull_request: Option<ApiPullRequestRef>,
}

#[derive(Deserialize)]
struct ApiPullRequestRef {
    merged_at: Option<DateTime<Utc>>,
}
