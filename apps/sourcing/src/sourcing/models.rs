//! Data passed between pipeline stages. Each stage produces one of these and
//! never mutates an earlier stage's output.

use serde::{Deserialize, Deserializer, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Stage 1: Requirements
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default)]
    pub required_skills: Vec<String>,
    /// junior | mid | senior | lead, or empty when the query does not say.
    #[serde(default)]
    pub experience_level: String,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub nice_to_have: Vec<String>,
    #[serde(default, alias = "unclear")]
    pub unclear_request: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarification_question: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 2: Search strategy
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStrategy {
    pub primary_search: SearchQuery,
    /// Tried in this exact order, only while earlier queries yield nothing.
    #[serde(default, deserialize_with = "null_as_default")]
    pub fallback_searches: Vec<SearchQuery>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub repository_search: RepositorySearch,
    #[serde(default, deserialize_with = "null_as_default")]
    pub post_filters: PostFilters,
    #[serde(default, deserialize_with = "null_as_default")]
    pub strategy_notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default, deserialize_with = "null_as_default")]
    pub language: String,
    #[serde(default)]
    pub location: Option<String>,
    /// GitHub range syntax, e.g. ">10". Models sometimes emit a bare number.
    #[serde(default, deserialize_with = "string_or_number")]
    pub followers: Option<String>,
    /// Presentation only; never affects execution order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositorySearch {
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub min_stars: Option<u32>,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostFilters {
    #[serde(default, deserialize_with = "null_as_default")]
    pub min_repos: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bio_keywords: Vec<String>,
    #[serde(default)]
    pub recent_activity_days: Option<u32>,
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 3: Enriched candidates
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct EnrichedCandidates {
    pub candidates: Vec<EnrichedCandidate>,
    pub search_metadata: SearchMetadata,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchMetadata {
    pub searches_executed: usize,
    pub total_profiles_found: usize,
    pub profiles_analyzed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichedCandidate {
    pub username: String,
    pub name: String,
    pub profile_url: String,
    pub location: String,
    pub bio: String,
    pub public_repos: u32,
    pub followers: u32,
    pub relevant_repositories: Vec<RelevantRepository>,
    pub skills_found: Vec<String>,
    pub experience_indicators: ExperienceIndicators,
    /// Heuristic in [0,1]. Only used by the degraded ranking path.
    pub initial_match_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelevantRepository {
    pub name: String,
    pub description: String,
    pub language: String,
    pub url: String,
    pub stars: u32,
    pub topics: Vec<String>,
    pub relevance_score: f64,
    pub relevance_reasons: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ExperienceIndicators {
    pub account_age_years: f64,
    pub total_stars: u32,
    pub has_popular_project: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 4: Ranked result
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct FinalResult {
    pub top_candidates: Vec<RankedCandidate>,
    pub summary: ResultSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    /// 1-based, dense.
    pub rank: usize,
    pub username: String,
    pub name: String,
    pub location: String,
    pub profile_url: String,
    pub final_match_score: f64,
    pub match_breakdown: MatchBreakdown,
    pub key_qualifications: Vec<String>,
    pub top_relevant_projects: Vec<RelevantProject>,
    pub match_reasoning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potential_concerns: Option<String>,
}

/// The four component scores, each in [0,1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchBreakdown {
    pub required_skills_score: f64,
    pub repository_relevance_score: f64,
    pub experience_score: f64,
    pub profile_quality_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchWeights {
    pub required_skills: f64,
    pub repository_relevance: f64,
    pub experience: f64,
    pub profile_quality: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            required_skills: 0.4,
            repository_relevance: 0.3,
            experience: 0.2,
            profile_quality: 0.1,
        }
    }
}

impl MatchBreakdown {
    /// Combined match score: 0.4*skills + 0.3*repos + 0.2*experience + 0.1*quality
    pub fn weighted_score(&self, weights: &MatchWeights) -> f64 {
        weights.required_skills * self.required_skills_score
            + weights.repository_relevance * self.repository_relevance_score
            + weights.experience * self.experience_score
            + weights.profile_quality * self.profile_quality_score
    }

    pub fn clamped(self) -> Self {
        let unit = |v: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            required_skills_score: unit(self.required_skills_score),
            repository_relevance_score: unit(self.repository_relevance_score),
            experience_score: unit(self.experience_score),
            profile_quality_score: unit(self.profile_quality_score),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevantProject {
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub why_relevant: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSummary {
    pub total_candidates_found: usize,
    pub candidates_presented: usize,
    pub average_match_score: f64,
    pub search_quality: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient field decoders for model output
// ────────────────────────────────────────────────────────────────────────────

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) if s.trim().is_empty() || s.trim() == "null" => None,
        Some(Raw::Text(s)) => Some(s.trim().to_string()),
        Some(Raw::Number(n)) => Some(format!(">={n}")),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_score_full() {
        let breakdown = MatchBreakdown {
            required_skills_score: 1.0,
            repository_relevance_score: 1.0,
            experience_score: 1.0,
            profile_quality_score: 1.0,
        };
        let score = breakdown.weighted_score(&MatchWeights::default());
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_score_partial() {
        // 0.4*0.9 + 0.3*0.5 + 0.2*0.5 + 0.1*1.0 = 0.36 + 0.15 + 0.10 + 0.10 = 0.71
        let breakdown = MatchBreakdown {
            required_skills_score: 0.9,
            repository_relevance_score: 0.5,
            experience_score: 0.5,
            profile_quality_score: 1.0,
        };
        let score = breakdown.weighted_score(&MatchWeights::default());
        assert!((score - 0.71).abs() < 1e-9, "Score was {score}");
    }

    #[test]
    fn test_clamped_bounds_each_component() {
        let breakdown = MatchBreakdown {
            required_skills_score: 85.0,
            repository_relevance_score: -0.2,
            experience_score: f64::NAN,
            profile_quality_score: 0.4,
        }
        .clamped();
        assert_eq!(breakdown.required_skills_score, 1.0);
        assert_eq!(breakdown.repository_relevance_score, 0.0);
        assert_eq!(breakdown.experience_score, 0.0);
        assert_eq!(breakdown.profile_quality_score, 0.4);
    }

    #[test]
    fn test_requirements_accepts_unclear_alias() {
        let req: Requirements = serde_json::from_str(
            r#"{"unclear": true, "clarification_question": "Which language?"}"#,
        )
        .unwrap();
        assert!(req.unclear_request);
        assert!(req.required_skills.is_empty());
    }

    #[test]
    fn test_strategy_tolerates_nulls_and_numeric_followers() {
        let strategy: SearchStrategy = serde_json::from_str(
            r#"{
                "primary_search": {"language": "go", "location": "lima", "followers": 10},
                "fallback_searches": null,
                "repository_search": {"keywords": ["microservices"], "min_stars": null, "language": "go"},
                "post_filters": {"min_repos": null, "bio_keywords": null, "recent_activity_days": null},
                "strategy_notes": null
            }"#,
        )
        .unwrap();
        assert_eq!(strategy.primary_search.followers.as_deref(), Some(">=10"));
        assert!(strategy.fallback_searches.is_empty());
        assert_eq!(strategy.post_filters.min_repos, 0);
        assert_eq!(strategy.repository_search.keywords, vec!["microservices"]);
    }

    #[test]
    fn test_strategy_without_primary_search_fails() {
        let result: Result<SearchStrategy, _> =
            serde_json::from_str(r#"{"fallback_searches": [{"language": "go"}]}"#);
        assert!(result.is_err(), "primary_search is required");
    }

    #[test]
    fn test_followers_null_string_is_none() {
        let query: SearchQuery =
            serde_json::from_str(r#"{"language": "go", "followers": "null"}"#).unwrap();
        assert!(query.followers.is_none());
    }
}
