//! Candidate Acquirer/Enricher: runs the search cascade, fetches repositories
//! per candidate and scores them.
//!
//! Flow: cascade(primary, fallbacks...) → per-candidate repo fetch (bounded
//! parallelism, failures skip the candidate) → relevance scoring → envelope.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::github::{ProfileCandidate, ProfileSearch, Repository, SearchRequest, SearchResult};
use crate::sourcing::cascade::{run_cascade, CascadeOutcome};
use crate::sourcing::models::{
    EnrichedCandidate, EnrichedCandidates, ExperienceIndicators, Requirements, RelevantRepository,
    SearchMetadata, SearchQuery, SearchStrategy,
};
use crate::sourcing::relevance::{analyze_repository_relevance, POPULAR_STAR_THRESHOLD};

/// Result ceiling for every search attempt.
pub const SEARCH_RESULT_CEILING: usize = 15;
/// Repositories fetched per candidate, most-starred first.
pub const MAX_REPOS_PER_CANDIDATE: usize = 10;
const BASE_MATCH_SCORE: f64 = 0.5;
const RELEVANT_REPO_BONUS: f64 = 0.2;

/// Everything enrichment needs besides the candidate and its repositories.
struct EnrichContext<'a> {
    required_skills: &'a [String],
    nice_to_have: &'a [String],
    keywords: &'a [String],
    now: DateTime<Utc>,
}

/// Executes the search plan and enriches every candidate found.
///
/// Only a backend failure on every attempted query is fatal; an exhausted
/// cascade yields an empty envelope, and a failed repository fetch drops just
/// that candidate.
pub async fn find_and_enrich_candidates(
    strategy: &SearchStrategy,
    requirements: &Requirements,
    profiles: &dyn ProfileSearch,
    concurrency: usize,
) -> Result<EnrichedCandidates, AppError> {
    let keywords = relevance_keywords(strategy, requirements);
    let joined_keywords = (!keywords.is_empty()).then(|| keywords.join(" "));

    let cascade = run_cascade(
        strategy.queries(),
        |query| {
            let request = build_search_request(query, strategy, joined_keywords.clone());
            async move { profiles.search_users(&request).await }
        },
        |result: &SearchResult| !result.candidates.is_empty(),
    )
    .await;

    let searches_executed = cascade.attempts;
    let candidates = match cascade.outcome {
        CascadeOutcome::Found { index, value } => {
            info!(
                "Search {} returned {} candidates after {} attempts",
                index,
                value.candidates.len(),
                searches_executed
            );
            value.candidates
        }
        CascadeOutcome::Exhausted | CascadeOutcome::Empty => {
            warn!("All {searches_executed} searches returned no candidates");
            Vec::new()
        }
        CascadeOutcome::AllFailed(e) => {
            return Err(AppError::Search(format!(
                "All {searches_executed} searches failed; last error: {e}"
            )));
        }
    };

    let total_profiles_found = candidates.len();
    let context = EnrichContext {
        required_skills: &requirements.required_skills,
        nice_to_have: &requirements.nice_to_have,
        keywords: &keywords,
        now: Utc::now(),
    };

    let fetched: Vec<Option<EnrichedCandidate>> = stream::iter(candidates)
        .map(|candidate| fetch_and_enrich(candidate, profiles, &context))
        .buffered(concurrency.max(1))
        .collect()
        .await;
    let enriched: Vec<EnrichedCandidate> = fetched.into_iter().flatten().collect();

    info!(
        "Enriched {}/{} candidates",
        enriched.len(),
        total_profiles_found
    );

    Ok(EnrichedCandidates {
        search_metadata: SearchMetadata {
            searches_executed,
            total_profiles_found,
            profiles_analyzed: enriched.len(),
        },
        candidates: enriched,
    })
}

/// Keywords used for repository relevance: the planner's repository keywords,
/// or the extracted requirement keywords when the planner gave none.
fn relevance_keywords(strategy: &SearchStrategy, requirements: &Requirements) -> Vec<String> {
    let planned = &strategy.repository_search.keywords;
    let source = if planned.iter().any(|k| !k.trim().is_empty()) {
        planned
    } else {
        &requirements.keywords
    };

    source
        .iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}

fn build_search_request(
    query: &SearchQuery,
    strategy: &SearchStrategy,
    keywords: Option<String>,
) -> SearchRequest {
    SearchRequest {
        language: query.language.clone(),
        location: query.location.clone(),
        followers: query.followers.clone(),
        keywords,
        min_repos: strategy.post_filters.min_repos,
        max_results: SEARCH_RESULT_CEILING,
    }
}

async fn fetch_and_enrich(
    candidate: ProfileCandidate,
    profiles: &dyn ProfileSearch,
    context: &EnrichContext<'_>,
) -> Option<EnrichedCandidate> {
    match profiles
        .get_repositories(&candidate.username, MAX_REPOS_PER_CANDIDATE)
        .await
    {
        Ok(repos) => Some(enrich_candidate(candidate, &repos, context)),
        Err(e) => {
            warn!("Failed to get repos for {}: {e}; skipping", candidate.username);
            None
        }
    }
}

fn enrich_candidate(
    candidate: ProfileCandidate,
    repos: &[Repository],
    context: &EnrichContext<'_>,
) -> EnrichedCandidate {
    let mut relevant_repositories: Vec<RelevantRepository> = repos
        .iter()
        .filter_map(|repo| {
            let analysis =
                analyze_repository_relevance(repo, context.required_skills, context.keywords);
            analysis.is_relevant().then(|| RelevantRepository {
                name: repo.name.clone(),
                description: repo.description.clone().unwrap_or_default(),
                language: repo.language.clone().unwrap_or_default(),
                url: format!("{}/{}", candidate.profile_url.trim_end_matches('/'), repo.name),
                stars: repo.stars,
                topics: repo.topics.clone(),
                relevance_score: analysis.score,
                relevance_reasons: analysis.reasons,
            })
        })
        .collect();
    relevant_repositories.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));

    let initial_match_score = if relevant_repositories.is_empty() {
        BASE_MATCH_SCORE
    } else {
        BASE_MATCH_SCORE + RELEVANT_REPO_BONUS
    };

    let experience_indicators = ExperienceIndicators {
        account_age_years: account_age_years(candidate.created_at, context.now),
        total_stars: repos.iter().map(|r| r.stars).sum(),
        has_popular_project: repos.iter().any(|r| r.stars > POPULAR_STAR_THRESHOLD),
    };

    let skills_found = skills_found(&candidate, repos, context);

    EnrichedCandidate {
        username: candidate.username,
        name: candidate.name,
        profile_url: candidate.profile_url,
        location: candidate.location,
        bio: candidate.bio,
        public_repos: candidate.public_repos,
        followers: candidate.followers,
        relevant_repositories,
        skills_found,
        experience_indicators,
        initial_match_score,
    }
}

/// Years since account creation, one decimal. 0 when unknown.
fn account_age_years(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(created_at) = created_at else {
        return 0.0;
    };
    let days = (now - created_at).num_days().max(0) as f64;
    (days / 365.25 * 10.0).round() / 10.0
}

/// Required and nice-to-have skills evidenced by a repository language, the
/// bio or a repository topic. Original order, no duplicates.
fn skills_found(
    candidate: &ProfileCandidate,
    repos: &[Repository],
    context: &EnrichContext<'_>,
) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();

    for skill in context.required_skills.iter().chain(context.nice_to_have) {
        let skill = skill.trim();
        if skill.is_empty() || found.iter().any(|f| f.eq_ignore_ascii_case(skill)) {
            continue;
        }

        let in_languages = repos
            .iter()
            .filter_map(|r| r.language.as_deref())
            .any(|l| l.eq_ignore_ascii_case(skill));
        let in_bio = mentions(&candidate.bio, skill);
        let in_topics = repos
            .iter()
            .flat_map(|r| r.topics.iter())
            .any(|t| mentions(t, skill));

        if in_languages || in_bio || in_topics {
            found.push(skill.to_string());
        }
    }

    found
}

/// Whole-word, case-insensitive mention. Multi-word skills match as substrings.
fn mentions(text: &str, skill: &str) -> bool {
    if skill.contains(char::is_whitespace) {
        return text.to_lowercase().contains(&skill.to_lowercase());
    }

    text.split(|c: char| !(c.is_alphanumeric() || matches!(c, '+' | '#' | '.')))
        .map(|token| token.trim_end_matches('.'))
        .any(|token| token.eq_ignore_ascii_case(skill))
}
