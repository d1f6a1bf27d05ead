use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// GitHub wire types
// ────────────────────────────────────────────────────────────────────────────

/// Response from `GET /search/users`.
#[derive(Debug, Deserialize)]
pub struct UserSearchResponse {
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<UserSummary>,
}

#[derive(Debug, Deserialize)]
pub struct UserSummary {
    pub login: String,
    #[serde(default)]
    pub html_url: String,
}

/// Response from `GET /users/{login}`. GitHub sends `null` for unset profile fields.
#[derive(Debug, Clone, Deserialize)]
pub struct UserDetail {
    pub login: String,
    pub name: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub public_repos: u32,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub html_url: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// A repository as returned by `GET /users/{login}/repos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(rename = "stargazers_count", default)]
    pub stars: u32,
    #[serde(default)]
    pub topics: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Search request / result
// ────────────────────────────────────────────────────────────────────────────

/// One bounded user search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub language: String,
    pub location: Option<String>,
    pub followers: Option<String>,
    /// Echoed back in `SearchResult::criteria`; the user search endpoint cannot filter on them.
    pub keywords: Option<String>,
    pub min_repos: u32,
    pub max_results: usize,
}

/// A profile returned by a search, with detail fields already resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileCandidate {
    pub username: String,
    pub name: String,
    pub location: String,
    pub bio: String,
    pub public_repos: u32,
    pub followers: u32,
    pub profile_url: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<UserDetail> for ProfileCandidate {
    fn from(detail: UserDetail) -> Self {
        Self {
            name: detail.name.unwrap_or_default(),
            location: detail.location.unwrap_or_default(),
            bio: detail.bio.unwrap_or_default(),
            public_repos: detail.public_repos,
            followers: detail.followers,
            profile_url: detail.html_url,
            created_at: detail.created_at,
            username: detail.login,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub candidates: Vec<ProfileCandidate>,
    /// Number of candidates returned (after the result ceiling).
    pub total_found: usize,
    pub criteria: SearchRequest,
}
