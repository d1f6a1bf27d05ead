//! Strategy Planner: turns requirements into an ordered search plan.

use tracing::debug;

use crate::errors::AppError;
use crate::llm_client::prompts::with_json_only;
use crate::llm_client::{call_json, LlmBackend};
use crate::sourcing::models::{Requirements, SearchQuery, SearchStrategy};
use crate::sourcing::prompts::{STRATEGY_PROMPT_TEMPLATE, STRATEGY_SYSTEM};

impl SearchStrategy {
    /// Primary first, then fallbacks in planner order.
    pub fn queries(&self) -> impl Iterator<Item = &SearchQuery> {
        std::iter::once(&self.primary_search).chain(self.fallback_searches.iter())
    }

    /// Rejects a plan without a primary language and fills blank fallback
    /// languages from the primary. Fallback order is never changed.
    fn validated(mut self) -> Result<Self, String> {
        let primary_language = self.primary_search.language.trim().to_string();
        if primary_language.is_empty() {
            return Err("primary_search.language is empty".to_string());
        }
        self.primary_search.language = primary_language.clone();

        for query in self
            .queries_mut()
            .filter(|q| q.location.as_deref().is_some_and(|l| l.trim().is_empty()))
        {
            query.location = None;
        }

        for (i, fallback) in self.fallback_searches.iter_mut().enumerate() {
            let language = fallback.language.trim();
            if language.is_empty() {
                debug!("Fallback search {} has no language; using {primary_language}", i + 1);
                fallback.language = primary_language.clone();
            } else {
                fallback.language = language.to_string();
            }
        }

        Ok(self)
    }

    fn queries_mut(&mut self) -> impl Iterator<Item = &mut SearchQuery> {
        std::iter::once(&mut self.primary_search).chain(self.fallback_searches.iter_mut())
    }
}

/// Runs the planning inference call. Transport, parse and validation failures are fatal.
pub async fn plan_strategy(
    requirements: &Requirements,
    llm: &dyn LlmBackend,
) -> Result<SearchStrategy, AppError> {
    let requirements_json = serde_json::to_string_pretty(requirements)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize requirements: {e}")))?;
    let prompt = STRATEGY_PROMPT_TEMPLATE.replace("{requirements_json}", &requirements_json);

    let strategy: SearchStrategy = call_json(llm, &with_json_only(STRATEGY_SYSTEM), &prompt)
        .await
        .map_err(|e| AppError::Llm(format!("Strategy planning failed: {e}")))?;

    strategy
        .validated()
        .map_err(|e| AppError::Llm(format!("Invalid search strategy: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedLlm;

    fn requirements() -> Requirements {
        Requirements {
            required_skills: vec!["Go".to_string()],
            locations: vec!["Lima".to_string()],
            ..Default::default()
        }
    }

    const PLAN: &str = r#"{
        "primary_search": {"language": "go", "location": "lima", "followers": null},
        "fallback_searches": [
            {"language": "go", "location": "peru", "rationale": "z: broaden to country"},
            {"language": "", "location": "", "rationale": "a: drop location"}
        ],
        "repository_search": {"keywords": ["microservices"], "min_stars": 10, "language": "go"},
        "post_filters": {"min_repos": 3, "bio_keywords": ["backend"], "recent_activity_days": 90},
        "strategy_notes": "city, then country, then global"
    }"#;

    #[tokio::test]
    async fn test_plan_preserves_fallback_order() {
        let llm = ScriptedLlm::text(&[PLAN]);
        let strategy = plan_strategy(&requirements(), &llm).await.unwrap();

        let order: Vec<Option<&str>> = strategy.queries().map(|q| q.location.as_deref()).collect();
        assert_eq!(order, vec![Some("lima"), Some("peru"), None]);
        assert_eq!(strategy.post_filters.min_repos, 3);
        assert_eq!(strategy.repository_search.min_stars, Some(10));
    }

    #[tokio::test]
    async fn test_blank_fallback_language_inherits_primary() {
        let llm = ScriptedLlm::text(&[PLAN]);
        let strategy = plan_strategy(&requirements(), &llm).await.unwrap();
        assert_eq!(strategy.fallback_searches[1].language, "go");
    }

    #[tokio::test]
    async fn test_empty_primary_language_is_fatal() {
        let llm = ScriptedLlm::text(&[r#"{"primary_search": {"language": "  ", "location": "lima"}}"#]);
        let err = plan_strategy(&requirements(), &llm).await.unwrap_err();
        match err {
            AppError::Llm(msg) => assert!(msg.contains("primary_search.language")),
            other => panic!("expected LLM error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_primary_search_is_fatal() {
        let llm = ScriptedLlm::text(&[r#"{"fallback_searches": []}"#]);
        assert!(plan_strategy(&requirements(), &llm).await.is_err());
    }

    #[tokio::test]
    async fn test_prompt_carries_requirements() {
        let llm = ScriptedLlm::text(&[PLAN]);
        plan_strategy(&requirements(), &llm).await.unwrap();

        let calls = llm.calls.lock().unwrap();
        let user = serde_json::to_string(&calls[0][1]).unwrap();
        assert!(user.contains("Lima"));
        assert!(user.contains("required_skills"));
    }
}
