//! Requirements Extractor: turns a free-text hiring query into structured `Requirements`.

use serde_json::Value;
use tracing::warn;

use crate::errors::AppError;
use crate::llm_client::prompts::with_json_only;
use crate::llm_client::{call_json, LlmBackend, RAW_EXCERPT_CHARS};
use crate::sourcing::models::Requirements;
use crate::sourcing::prompts::{REQUIREMENTS_PROMPT_TEMPLATE, REQUIREMENTS_SYSTEM};

/// Asked when the model flags a query as unclear without saying what is missing,
/// or names no skill at all.
pub const DEFAULT_CLARIFICATION: &str =
    "Which programming language or technology should the developers you are looking for know?";

impl Requirements {
    /// Whether downstream stages may run.
    pub fn is_actionable(&self) -> bool {
        !self.unclear_request && !self.required_skills.is_empty()
    }

    /// Enforces the extraction contract: either at least one required skill, or
    /// `unclear_request` with a non-empty clarification question.
    fn enforce_contract(mut self) -> Self {
        normalize_list(&mut self.required_skills);
        normalize_list(&mut self.locations);
        normalize_list(&mut self.keywords);
        normalize_list(&mut self.nice_to_have);
        self.experience_level = self.experience_level.trim().to_lowercase();

        if !self.unclear_request && self.required_skills.is_empty() {
            warn!("Requirements named no skill but were not flagged unclear; asking for clarification");
            self.unclear_request = true;
        }

        if self.unclear_request {
            let has_question = self
                .clarification_question
                .as_deref()
                .is_some_and(|q| !q.trim().is_empty());
            if !has_question {
                self.clarification_question = Some(DEFAULT_CLARIFICATION.to_string());
            }
        } else {
            self.clarification_question = None;
        }

        self
    }
}

/// Trims entries, drops blanks and removes case-insensitive duplicates, keeping first occurrence.
fn normalize_list(items: &mut Vec<String>) {
    let mut seen = Vec::<String>::new();
    items.retain_mut(|item| {
        *item = item.trim().to_string();
        let key = item.to_lowercase();
        if item.is_empty() || seen.contains(&key) {
            false
        } else {
            seen.push(key);
            true
        }
    });
}

/// Runs the extraction inference call. Transport and parse failures are fatal.
pub async fn extract_requirements(
    query: &str,
    llm: &dyn LlmBackend,
) -> Result<Requirements, AppError> {
    let prompt = REQUIREMENTS_PROMPT_TEMPLATE.replace("{query}", query.trim());
    let reply: Value = call_json(llm, &with_json_only(REQUIREMENTS_SYSTEM), &prompt)
        .await
        .map_err(|e| AppError::Llm(format!("Requirements extraction failed: {e}")))?;

    if !has_required_fields(&reply) {
        return Err(AppError::Llm(format!(
            "Requirements extraction failed: reply has neither required_skills nor unclear_request: {}",
            excerpt(&reply)
        )));
    }

    let requirements: Requirements = serde_json::from_value(reply.clone()).map_err(|e| {
        AppError::Llm(format!(
            "Requirements extraction failed: {e}: {}",
            excerpt(&reply)
        ))
    })?;

    Ok(requirements.enforce_contract())
}

/// A reply must carry the skill list or an explicit unclear flag.
/// Every other field may be omitted.
fn has_required_fields(reply: &Value) -> bool {
    let skills = reply
        .get("required_skills")
        .is_some_and(Value::is_array);
    let unclear = ["unclear_request", "unclear"]
        .iter()
        .any(|key| reply.get(key).is_some_and(Value::is_boolean));
    skills || unclear
}

fn excerpt(reply: &Value) -> String {
    reply.to_string().chars().take(RAW_EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedLlm;
    use crate::llm_client::LlmError;

    #[tokio::test]
    async fn test_extracts_clear_requirements() {
        let llm = ScriptedLlm::text(&[r#"```json
        {
            "required_skills": ["Go", " go ", "PostgreSQL", ""],
            "experience_level": "Senior",
            "locations": ["Lima"],
            "keywords": ["microservices"],
            "nice_to_have": ["Kubernetes"],
            "unclear_request": false
        }
        ```"#]);

        let req = extract_requirements("Find senior Go developers in Lima", &llm)
            .await
            .unwrap();

        assert!(req.is_actionable());
        assert_eq!(req.required_skills, vec!["Go", "PostgreSQL"]);
        assert_eq!(req.experience_level, "senior");
        assert_eq!(req.locations, vec!["Lima"]);
        assert!(req.clarification_question.is_none());
    }

    #[tokio::test]
    async fn test_query_is_embedded_in_prompt() {
        let llm = ScriptedLlm::text(&[r#"{"required_skills": ["Rust"]}"#]);
        extract_requirements("  Rust folks in Berlin  ", &llm).await.unwrap();

        let calls = llm.calls.lock().unwrap();
        let user = serde_json::to_string(&calls[0][1]).unwrap();
        assert!(user.contains("Rust folks in Berlin"));
    }

    #[tokio::test]
    async fn test_unclear_request_keeps_model_question() {
        let llm = ScriptedLlm::text(&[
            r#"{"unclear_request": true, "clarification_question": "Which language do you need?"}"#,
        ]);
        let req = extract_requirements("find developers", &llm).await.unwrap();

        assert!(!req.is_actionable());
        assert_eq!(
            req.clarification_question.as_deref(),
            Some("Which language do you need?")
        );
    }

    #[tokio::test]
    async fn test_wrong_shape_reply_is_an_error() {
        let llm = ScriptedLlm::text(&[r#"{"skills": ["Go"], "level": "senior", "location": "Lima"}"#]);
        let err = extract_requirements("Find senior Go developers in Lima", &llm)
            .await
            .unwrap_err();

        match err {
            AppError::Llm(msg) => {
                assert!(msg.contains("required_skills"));
                assert!(msg.contains(r#""skills":["Go"]"#), "raw reply missing: {msg}");
            }
            other => panic!("expected LLM error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_object_is_an_error() {
        let llm = ScriptedLlm::text(&["{}"]);
        assert!(matches!(
            extract_requirements("Go developers", &llm).await,
            Err(AppError::Llm(_))
        ));
    }

    #[tokio::test]
    async fn test_mistyped_field_is_an_error() {
        let llm = ScriptedLlm::text(&[r#"{"required_skills": "Go"}"#]);
        assert!(extract_requirements("Go developers", &llm).await.is_err());

        let llm = ScriptedLlm::text(&[r#"{"required_skills": ["Go"], "locations": "Lima"}"#]);
        assert!(extract_requirements("Go developers", &llm).await.is_err());
    }

    #[tokio::test]
    async fn test_unclear_without_question_gets_default() {
        let llm = ScriptedLlm::text(&[r#"{"unclear_request": true, "clarification_question": "  "}"#]);
        let req = extract_requirements("search github", &llm).await.unwrap();
        assert_eq!(req.clarification_question.as_deref(), Some(DEFAULT_CLARIFICATION));
    }

    #[tokio::test]
    async fn test_no_skills_is_forced_unclear() {
        let llm = ScriptedLlm::text(&[r#"{"required_skills": [], "experience_level": "senior"}"#]);
        let req = extract_requirements("find a senior person", &llm).await.unwrap();

        assert!(req.unclear_request);
        assert!(!req.is_actionable());
        assert!(req.clarification_question.is_some());
    }

    #[tokio::test]
    async fn test_malformed_json_is_fatal() {
        let llm = ScriptedLlm::text(&["Sure! The developer needs Go."]);
        let err = extract_requirements("Go devs", &llm).await.unwrap_err();
        match err {
            AppError::Llm(msg) => assert!(msg.contains("Sure! The developer needs Go.")),
            other => panic!("expected LLM error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_fatal() {
        let llm = ScriptedLlm::new(vec![Err(LlmError::Api {
            status: 401,
            message: "invalid x-api-key".into(),
        })]);
        let err = extract_requirements("Go devs", &llm).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }
}
