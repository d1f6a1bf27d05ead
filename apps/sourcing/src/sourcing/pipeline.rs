//! Pipeline Orchestrator: runs the four stages strictly in sequence.
//!
//! extract requirements → (stop if unclear) → plan strategy → search + enrich → rank.
//! Stages 1–3 are fatal on failure; stage 4 degrades instead of failing.

use tracing::info;

use crate::errors::AppError;
use crate::github::ProfileSearch;
use crate::llm_client::LlmBackend;
use crate::sourcing::acquirer::find_and_enrich_candidates;
use crate::sourcing::models::{FinalResult, Requirements, SearchMetadata, SearchStrategy};
use crate::sourcing::ranker::rank_and_present;
use crate::sourcing::requirements::{extract_requirements, DEFAULT_CLARIFICATION};
use crate::sourcing::strategy::plan_strategy;

/// Terminal state of a run.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// The query was too vague; no search was executed.
    NeedsClarification {
        requirements: Requirements,
        question: String,
    },
    Completed {
        requirements: Requirements,
        strategy: SearchStrategy,
        search_metadata: SearchMetadata,
        result: FinalResult,
    },
}

/// Executes one sourcing run for `query`.
///
/// `concurrency` bounds the number of repository fetches in flight during enrichment.
pub async fn run_pipeline(
    query: &str,
    llm: &dyn LlmBackend,
    profiles: &dyn ProfileSearch,
    concurrency: usize,
) -> Result<PipelineOutcome, AppError> {
    info!("Stage 1/4: extracting requirements");
    let requirements = extract_requirements(query, llm).await?;

    if !requirements.is_actionable() {
        let question = requirements
            .clarification_question
            .clone()
            .unwrap_or_else(|| DEFAULT_CLARIFICATION.to_string());
        info!("Query needs clarification; stopping before search");
        return Ok(PipelineOutcome::NeedsClarification {
            requirements,
            question,
        });
    }

    info!(
        "Stage 2/4: planning search for skills {:?}",
        requirements.required_skills
    );
    let strategy = plan_strategy(&requirements, llm).await?;

    info!(
        "Stage 3/4: searching ({} queries planned)",
        1 + strategy.fallback_searches.len()
    );
    let enriched =
        find_and_enrich_candidates(&strategy, &requirements, profiles, concurrency).await?;

    info!("Stage 4/4: ranking {} candidates", enriched.candidates.len());
    let result = rank_and_present(&enriched, &requirements, llm).await;

    info!(
        "Run complete: {} candidates presented ({})",
        result.summary.candidates_presented, result.summary.search_quality
    );

    Ok(PipelineOutcome::Completed {
        requirements,
        strategy,
        search_metadata: enriched.search_metadata,
        result,
    })
}
