//! Profile-search client: GitHub user search, profile detail and repository listing.
//!
//! Pipeline stages depend on `dyn ProfileSearch`; `GitHubClient` is the production backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

pub mod models;

pub use models::{ProfileCandidate, Repository, SearchRequest, SearchResult, UserDetail};
use models::UserSearchResponse;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = "sourcing-api";
const DEFAULT_MIN_REPOS: u32 = 5;
const DEFAULT_MAX_RESULTS: usize = 10;
/// Search page size. Larger than the result ceiling so detail-fetch attrition still fills it.
const SEARCH_PAGE_SIZE: u32 = 100;
/// Repository listing page size. The endpoint cannot sort by stars, so a full
/// page is fetched and ranked locally.
const REPO_PAGE_SIZE: u32 = 100;

/// Typed failure from the profile-search backend.
/// A well-formed empty result is never an error.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limited by profile-search backend")]
    RateLimited,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait ProfileSearch: Send + Sync {
    /// Searches profiles and resolves each hit's detail, up to `max_results`.
    async fn search_users(&self, request: &SearchRequest) -> Result<SearchResult, SearchError>;

    async fn get_user_detail(&self, username: &str) -> Result<UserDetail, SearchError>;

    /// Fetches at most `max_count` repositories, sorted by star count descending.
    async fn get_repositories(
        &self,
        username: &str,
        max_count: usize,
    ) -> Result<Vec<Repository>, SearchError>;
}

/// GitHub REST API client.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    lookup_timeout: Duration,
    search_timeout: Duration,
}

impl GitHubClient {
    pub fn new(
        base_url: String,
        token: Option<String>,
        lookup_timeout: Duration,
        search_timeout: Duration,
    ) -> Result<Self, SearchError> {
        Ok(Self {
            client: Client::builder().user_agent(USER_AGENT).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            lookup_timeout,
            search_timeout,
        })
    }

    fn get(&self, path: &str, timeout: Duration) -> RequestBuilder {
        let request = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("Accept", "application/vnd.github.v3+json")
            .timeout(timeout);

        match &self.token {
            Some(token) => request.header("Authorization", format!("token {token}")),
            None => request,
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, SearchError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let remaining = response
                .headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, remaining.as_deref(), what, body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SearchError::InvalidResponse(format!("{what}: {e}")))
    }
}

/// Maps a non-success status to the typed error taxonomy.
fn classify_failure(
    status: StatusCode,
    ratelimit_remaining: Option<&str>,
    what: &str,
    body: String,
) -> SearchError {
    match status {
        StatusCode::NOT_FOUND => SearchError::NotFound(what.to_string()),
        StatusCode::TOO_MANY_REQUESTS => SearchError::RateLimited,
        StatusCode::FORBIDDEN if ratelimit_remaining == Some("0") => SearchError::RateLimited,
        _ => SearchError::Api {
            status: status.as_u16(),
            message: body,
        },
    }
}

/// Builds the `q` parameter for `/search/users`.
fn build_user_query(request: &SearchRequest) -> String {
    let min_repos = if request.min_repos == 0 {
        DEFAULT_MIN_REPOS
    } else {
        request.min_repos
    };

    let mut parts = vec![
        format!("language:{}", qualifier_value(&request.language)),
        format!("repos:>{min_repos}"),
    ];

    if let Some(location) = request.location.as_deref().filter(|l| !l.trim().is_empty()) {
        parts.push(format!("location:{}", qualifier_value(location)));
    }

    if let Some(followers) = request.followers.as_deref().map(str::trim) {
        if is_valid_range(followers) {
            parts.push(format!("followers:{followers}"));
        } else if !followers.is_empty() {
            warn!("Ignoring unusable followers filter {followers:?}");
        }
    }

    parts.join(" ")
}

/// Quotes multi-word qualifier values ("san francisco").
fn qualifier_value(value: &str) -> String {
    let value = value.trim();
    if value.contains(char::is_whitespace) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

/// Accepts GitHub range syntax: `10`, `>10`, `>=10`, `<5`, `<=5`, `10..50`.
fn is_valid_range(value: &str) -> bool {
    let digits = value
        .strip_prefix(">=")
        .or_else(|| value.strip_prefix("<="))
        .or_else(|| value.strip_prefix('>'))
        .or_else(|| value.strip_prefix('<'))
        .unwrap_or(value);

    let is_number = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    match digits.split_once("..") {
        Some((lo, hi)) => is_number(lo) && is_number(hi),
        None => is_number(digits),
    }
}

#[async_trait]
impl ProfileSearch for GitHubClient {
    async fn search_users(&self, request: &SearchRequest) -> Result<SearchResult, SearchError> {
        let max_results = if request.max_results == 0 {
            DEFAULT_MAX_RESULTS
        } else {
            request.max_results
        };
        let query = build_user_query(request);
        debug!("GitHub user search: q={query}");

        let search = self
            .get("/search/users", self.search_timeout)
            .query(&[("q", query.as_str())])
            .query(&[("per_page", SEARCH_PAGE_SIZE)]);
        let response: UserSearchResponse = self.send_json(search, "user search").await?;

        debug!(
            "GitHub user search matched {} users ({} in page)",
            response.total_count,
            response.items.len()
        );

        let mut candidates = Vec::new();
        for user in response.items {
            if candidates.len() >= max_results {
                break;
            }

            match self.get_user_detail(&user.login).await {
                Ok(detail) => candidates.push(ProfileCandidate::from(detail)),
                Err(e) => warn!("Failed to get details for user {}: {e}", user.login),
            }
        }

        Ok(SearchResult {
            total_found: candidates.len(),
            candidates,
            criteria: SearchRequest {
                max_results,
                ..request.clone()
            },
        })
    }

    async fn get_user_detail(&self, username: &str) -> Result<UserDetail, SearchError> {
        let request = self.get(&format!("/users/{username}"), self.lookup_timeout);
        self.send_json(request, &format!("user {username}")).await
    }

    async fn get_repositories(
        &self,
        username: &str,
        max_count: usize,
    ) -> Result<Vec<Repository>, SearchError> {
        let request = self
            .get(&format!("/users/{username}/repos"), self.lookup_timeout)
            .query(&[("per_page", REPO_PAGE_SIZE)]);

        let repos: Vec<Repository> = self
            .send_json(request, &format!("repositories of {username}"))
            .await?;

        Ok(most_starred(repos, max_count))
    }
}

/// Keeps the `max_count` most-starred repositories, stars descending.
/// Equal star counts keep listing order.
pub fn most_starred(mut repos: Vec<Repository>, max_count: usize) -> Vec<Repository> {
    repos.sort_by(|a, b| b.stars.cmp(&a.stars));
    repos.truncate(max_count);
    repos
}
