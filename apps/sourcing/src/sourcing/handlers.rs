//! Axum route handlers for the Sourcing API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::sourcing::models::{FinalResult, Requirements, SearchMetadata, SearchStrategy};
use crate::sourcing::pipeline::{run_pipeline, PipelineOutcome};
use crate::sourcing::requirements::extract_requirements;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SourcingRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchResponse {
    NeedsClarification {
        run_id: Uuid,
        clarification_question: String,
        requirements: Requirements,
    },
    Completed {
        run_id: Uuid,
        requirements: Requirements,
        strategy: SearchStrategy,
        search_metadata: SearchMetadata,
        result: FinalResult,
    },
}

#[derive(Debug, Serialize)]
pub struct RequirementsResponse {
    pub requirements: Requirements,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sourcing/search
///
/// Full pipeline: requirements → strategy → search + enrich → rank.
/// Returns a clarification question instead when the query is too vague to search.
pub async fn handle_search(
    State(state): State<AppState>,
    Json(request): Json<SourcingRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = validated_query(&request)?;
    let run_id = Uuid::new_v4();
    let span = info_span!("sourcing_run", %run_id);

    let outcome = async {
        info!("Starting sourcing run");
        run_pipeline(
            query,
            state.llm.as_ref(),
            state.profiles.as_ref(),
            state.config.enrich_concurrency,
        )
        .await
    }
    .instrument(span)
    .await?;

    let response = match outcome {
        PipelineOutcome::NeedsClarification {
            requirements,
            question,
        } => SearchResponse::NeedsClarification {
            run_id,
            clarification_question: question,
            requirements,
        },
        PipelineOutcome::Completed {
            requirements,
            strategy,
            search_metadata,
            result,
        } => SearchResponse::Completed {
            run_id,
            requirements,
            strategy,
            search_metadata,
            result,
        },
    };

    Ok(Json(response))
}

/// POST /api/v1/sourcing/requirements
///
/// Runs only requirements extraction. Useful for previewing how a query is
/// interpreted before spending search quota on it.
pub async fn handle_requirements(
    State(state): State<AppState>,
    Json(request): Json<SourcingRequest>,
) -> Result<Json<RequirementsResponse>, AppError> {
    let query = validated_query(&request)?;
    let requirements = extract_requirements(query, state.llm.as_ref()).await?;

    Ok(Json(RequirementsResponse { requirements }))
}

fn validated_query(request: &SourcingRequest) -> Result<&str, AppError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("query cannot be empty".to_string()));
    }
    Ok(query)
}
