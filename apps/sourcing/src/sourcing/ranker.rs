//! Ranker/Presenter: final weighted ranking, with a deterministic degraded mode.
//!
//! The model supplies component scores and prose; the combination is always
//! recomputed here. If the ranking call fails for any reason the result is
//! built from the enrichment heuristic instead, so a run that found candidates
//! always returns them.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::with_json_only;
use crate::llm_client::{call_json, LlmBackend};
use crate::sourcing::models::{
    EnrichedCandidate, EnrichedCandidates, FinalResult, MatchBreakdown, MatchWeights,
    RankedCandidate, RelevantProject, Requirements, ResultSummary,
};
use crate::sourcing::prompts::{RANKING_PROMPT_TEMPLATE, RANKING_SYSTEM};

/// Degraded mode presents at most this many candidates, in enrichment order.
pub const FALLBACK_MAX_CANDIDATES: usize = 10;
pub const FALLBACK_REASONING: &str =
    "Ranking step unavailable; score is based on initial keyword match.";
/// `ResultSummary::search_quality` in degraded mode.
pub const DEGRADED_SEARCH_QUALITY: &str = "Fallback (Ranking Unavailable)";
pub const NO_CANDIDATES_SEARCH_QUALITY: &str = "No Candidates Found";
const UNASSESSED_SEARCH_QUALITY: &str = "Not Assessed";

// ────────────────────────────────────────────────────────────────────────────
// Model output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RankingOutput {
    top_candidates: Vec<ModelRanking>,
    #[serde(default)]
    summary: Option<ModelSummary>,
}

/// Any `final_match_score` the model adds is ignored.
#[derive(Debug, Deserialize)]
struct ModelRanking {
    username: String,
    match_breakdown: MatchBreakdown,
    #[serde(default)]
    key_qualifications: Vec<String>,
    #[serde(default)]
    top_relevant_projects: Vec<RelevantProject>,
    #[serde(default)]
    match_reasoning: String,
    #[serde(default)]
    potential_concerns: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelSummary {
    #[serde(default)]
    search_quality: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Ranking
// ────────────────────────────────────────────────────────────────────────────

/// Ranks enriched candidates. Never fails: ranking errors switch to degraded mode.
pub async fn rank_and_present(
    candidates: &EnrichedCandidates,
    requirements: &Requirements,
    llm: &dyn LlmBackend,
) -> FinalResult {
    if candidates.candidates.is_empty() {
        info!("No candidates to rank");
        return FinalResult {
            top_candidates: Vec::new(),
            summary: summarize(candidates, &[], NO_CANDIDATES_SEARCH_QUALITY.to_string()),
        };
    }

    match rank_with_llm(candidates, requirements, llm).await {
        Ok(result) => result,
        Err(e) => {
            warn!("Ranking step failed, presenting fallback ranking: {e}");
            fallback_result(candidates)
        }
    }
}

async fn rank_with_llm(
    candidates: &EnrichedCandidates,
    requirements: &Requirements,
    llm: &dyn LlmBackend,
) -> Result<FinalResult, AppError> {
    let prompt = build_ranking_prompt(candidates, requirements)?;
    let output: RankingOutput = call_json(llm, &with_json_only(RANKING_SYSTEM), &prompt)
        .await
        .map_err(|e| AppError::Llm(format!("Ranking LLM call failed: {e}")))?;

    let weights = MatchWeights::default();
    let mut seen = HashSet::new();
    let mut ranked = Vec::with_capacity(output.top_candidates.len());

    for entry in output.top_candidates {
        let Some(source) = candidates
            .candidates
            .iter()
            .find(|c| c.username.eq_ignore_ascii_case(entry.username.trim()))
        else {
            warn!("Ranking named unknown candidate {:?}; dropping", entry.username);
            continue;
        };
        if !seen.insert(source.username.clone()) {
            warn!("Ranking listed {} more than once; keeping first", source.username);
            continue;
        }

        let match_breakdown = entry.match_breakdown.clamped();
        ranked.push(RankedCandidate {
            rank: 0,
            username: source.username.clone(),
            name: source.name.clone(),
            location: source.location.clone(),
            profile_url: source.profile_url.clone(),
            final_match_score: match_breakdown.weighted_score(&weights),
            match_breakdown,
            key_qualifications: entry.key_qualifications,
            top_relevant_projects: entry.top_relevant_projects,
            match_reasoning: entry.match_reasoning,
            potential_concerns: entry
                .potential_concerns
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty() && c != "null"),
        });
    }

    if ranked.is_empty() {
        return Err(AppError::Llm(
            "Ranking output contained no known candidates".to_string(),
        ));
    }

    sort_and_rank(&mut ranked);

    let search_quality = output
        .summary
        .and_then(|s| s.search_quality)
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .unwrap_or_else(|| UNASSESSED_SEARCH_QUALITY.to_string());

    info!("Ranked {} candidates", ranked.len());

    Ok(FinalResult {
        summary: summarize(candidates, &ranked, search_quality),
        top_candidates: ranked,
    })
}

fn build_ranking_prompt(
    candidates: &EnrichedCandidates,
    requirements: &Requirements,
) -> Result<String, AppError> {
    let requirements_json = serde_json::to_string_pretty(requirements)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize requirements: {e}")))?;
    let candidates_json = serde_json::to_string_pretty(&candidates.candidates)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize candidates: {e}")))?;

    Ok(RANKING_PROMPT_TEMPLATE
        .replace("{requirements_json}", &requirements_json)
        .replace("{candidates_json}", &candidates_json))
}

/// Stable sort by score descending, then dense 1-based ranks.
fn sort_and_rank(ranked: &mut [RankedCandidate]) {
    ranked.sort_by(|a, b| b.final_match_score.total_cmp(&a.final_match_score));
    for (i, candidate) in ranked.iter_mut().enumerate() {
        candidate.rank = i + 1;
    }
}

fn summarize(
    candidates: &EnrichedCandidates,
    ranked: &[RankedCandidate],
    search_quality: String,
) -> ResultSummary {
    let average_match_score = if ranked.is_empty() {
        0.0
    } else {
        ranked.iter().map(|c| c.final_match_score).sum::<f64>() / ranked.len() as f64
    };

    ResultSummary {
        total_candidates_found: candidates.search_metadata.total_profiles_found,
        candidates_presented: ranked.len(),
        average_match_score,
        search_quality,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Degraded mode
// ────────────────────────────────────────────────────────────────────────────

/// Builds a result from enrichment data alone: first 10 candidates, score =
/// initial match score × 100, fixed reasoning, degraded quality label.
pub fn fallback_result(candidates: &EnrichedCandidates) -> FinalResult {
    let mut ranked: Vec<RankedCandidate> = candidates
        .candidates
        .iter()
        .take(FALLBACK_MAX_CANDIDATES)
        .map(fallback_candidate)
        .collect();

    sort_and_rank(&mut ranked);

    FinalResult {
        summary: summarize(candidates, &ranked, DEGRADED_SEARCH_QUALITY.to_string()),
        top_candidates: ranked,
    }
}

fn fallback_candidate(candidate: &EnrichedCandidate) -> RankedCandidate {
    RankedCandidate {
        rank: 0,
        username: candidate.username.clone(),
        name: candidate.name.clone(),
        location: candidate.location.clone(),
        profile_url: candidate.profile_url.clone(),
        final_match_score: candidate.initial_match_score * 100.0,
        match_breakdown: MatchBreakdown::default(),
        key_qualifications: candidate.skills_found.clone(),
        top_relevant_projects: candidate
            .relevant_repositories
            .iter()
            .map(|repo| RelevantProject {
                name: repo.name.clone(),
                url: repo.url.clone(),
                why_relevant: repo.relevance_reasons.join(", "),
            })
            .collect(),
        match_reasoning: FALLBACK_REASONING.to_string(),
        potential_concerns: None,
    }
}
