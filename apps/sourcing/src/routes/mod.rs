pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::sourcing::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Sourcing API
        .route("/api/v1/sourcing/search", post(handlers::handle_search))
        .route(
            "/api/v1/sourcing/requirements",
            post(handlers::handle_requirements),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::github::testing::{repo, FakeProfiles, ScriptedSearch};
    use crate::llm_client::testing::ScriptedLlm;

    fn state(llm: ScriptedLlm, profiles: FakeProfiles) -> AppState {
        AppState {
            llm: Arc::new(llm),
            profiles: Arc::new(profiles),
            config: Config {
                anthropic_api_key: "test".to_string(),
                github_token: None,
                github_api_url: "http://localhost".to_string(),
                llm_timeout: Duration::from_secs(1),
                github_timeout: Duration::from_secs(1),
                github_search_timeout: Duration::from_secs(1),
                enrich_concurrency: 2,
                port: 0,
                rust_log: "info".to_string(),
            },
        }
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(state(ScriptedLlm::text(&[]), FakeProfiles::default()));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["service"], "sourcing-api");
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected_before_any_call() {
        let llm = Arc::new(ScriptedLlm::text(&[]));
        let app = build_router(AppState {
            llm: llm.clone(),
            ..state(ScriptedLlm::text(&[]), FakeProfiles::default())
        });

        let response = app
            .oneshot(post_json("/api/v1/sourcing/search", r#"{"query": "   "}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unclear_query_returns_clarification() {
        let llm = ScriptedLlm::text(&[r#"{"unclear_request": true}"#]);
        let app = build_router(state(llm, FakeProfiles::default()));

        let response = app
            .oneshot(post_json("/api/v1/sourcing/search", r#"{"query": "someone good"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "needs_clarification");
        assert!(body["run_id"].is_string());
        assert!(!body["clarification_question"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_completed_search() {
        let llm = ScriptedLlm::text(&[
            r#"{"required_skills": ["Rust"], "keywords": ["parser"]}"#,
            r#"{"primary_search": {"language": "rust"}}"#,
            r#"not json"#,
        ]);
        let profiles = FakeProfiles::default()
            .on_search("rust", None, ScriptedSearch::Users(vec!["ferris"]))
            .with_repos("ferris", vec![repo("nom-like", "A parser toolkit", "Rust", 10)]);
        let app = build_router(state(llm, profiles));

        let response = app
            .oneshot(post_json("/api/v1/sourcing/search", r#"{"query": "Rust parser people"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "completed");
        assert_eq!(body["search_metadata"]["searches_executed"], 1);
        assert_eq!(body["result"]["top_candidates"][0]["username"], "ferris");
        assert_eq!(body["result"]["top_candidates"][0]["rank"], 1);
        assert_eq!(
            body["result"]["summary"]["search_quality"],
            "Fallback (Ranking Unavailable)"
        );
    }

    #[tokio::test]
    async fn test_llm_failure_maps_to_error_envelope() {
        let llm = ScriptedLlm::text(&["I cannot help with that"]);
        let app = build_router(state(llm, FakeProfiles::default()));

        let response = app
            .oneshot(post_json("/api/v1/sourcing/search", r#"{"query": "Go devs"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "LLM_ERROR");
        // Raw model text stays in the logs.
        assert!(!body.to_string().contains("cannot help"));
    }

    #[tokio::test]
    async fn test_requirements_preview() {
        let llm = ScriptedLlm::text(&[r#"{"required_skills": ["go", "Go", " kafka "]}"#]);
        let app = build_router(state(llm, FakeProfiles::default()));

        let response = app
            .oneshot(post_json(
                "/api/v1/sourcing/requirements",
                r#"{"query": "Go and Kafka engineers"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(
            body["requirements"]["required_skills"],
            serde_json::json!(["go", "kafka"])
        );
    }
}
