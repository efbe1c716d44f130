pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::guide::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/industries", get(handlers::handle_list_industries))
        // Session
        .route("/api/v1/session", get(handlers::handle_get_session))
        .route("/api/v1/session/reset", post(handlers::handle_reset))
        .route(
            "/api/v1/session/notification/dismiss",
            post(handlers::handle_dismiss_notification),
        )
        // Guide
        .route("/api/v1/guide/generate", post(handlers::handle_generate))
        .route("/api/v1/guide/refine", post(handlers::handle_refine))
        .route(
            "/api/v1/guide/active",
            get(handlers::handle_get_active).put(handlers::handle_select_active),
        )
        .route("/api/v1/guide/sections/:id", get(handlers::handle_get_section))
        .route("/api/v1/guide/export", get(handlers::handle_export))
        .route("/api/v1/guide/export.txt", get(handlers::handle_export_text))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::guide::industry::Industry;
    use crate::guide::orchestrator::tests::{MockGenerator, GO_K8S_GUIDE, SQL_REFINEMENT};
    use crate::guide::orchestrator::GenerationOrchestrator;

    fn app(mock: Arc<MockGenerator>) -> Router {
        let config = Config::from_lookup(|key| {
            (key == "GEMINI_API_KEY").then(|| "test-key".to_string())
        })
        .unwrap();
        build_router(AppState {
            orchestrator: Arc::new(GenerationOrchestrator::new(mock, Industry::Tech)),
            config,
        })
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(match body {
                Some(json) => Body::from(json.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn json_body(raw: &str) -> Value {
        serde_json::from_str(raw).unwrap()
    }

    #[tokio::test]
    async fn test_health_is_ok() {
        let mock = Arc::new(MockGenerator::default());
        let app = app(mock.clone());
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "prepguide-api");
        assert_eq!(body["model"], "gemini-2.5-flash-preview-09-2025");
        assert_eq!(body["default_industry"], "Tech");
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_industries_lists_all_with_default() {
        let app = app(Arc::new(MockGenerator::default()));
        let (status, body) = send(&app, Method::GET, "/api/v1/industries", None).await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["default"], "Tech");
        assert_eq!(body["industries"].as_array().unwrap().len(), Industry::ALL.len());
    }

    #[tokio::test]
    async fn test_generate_with_blank_jd_is_400_without_backend_call() {
        let mock = Arc::new(MockGenerator::default());
        let app = app(mock.clone());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/guide/generate",
            Some(json!({"jd_text": "  ", "notes": "keep me"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&body)["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(mock.calls(), 0);

        let (_, session) = send(&app, Method::GET, "/api/v1/session", None).await;
        assert_eq!(json_body(&session)["inputs"]["notes"], "keep me");
    }

    #[tokio::test]
    async fn test_generate_then_export_text() {
        let mock = Arc::new(MockGenerator::replying(vec![Ok(GO_K8S_GUIDE.to_string())]));
        let app = app(mock.clone());

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/guide/generate",
            Some(json!({"jd_text": "Backend engineer, Go, Kubernetes", "industry": "Tech"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["session"]["phase"], "ready");
        assert_eq!(body["active"]["id"], "tech_stack");
        assert_eq!(body["active"]["blocks"][0]["kind"], "stack_group");

        let (status, text) = send(&app, Method::GET, "/api/v1/guide/export.txt", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(text.starts_with("Backend Engineer\n"));
        assert!(text.contains("TECH STACK DRILL"));
        assert!(text.contains("QUESTIONS TO ASK"));
        assert!(text.contains("  ? \"What does on-call look like?\""));
    }

    #[tokio::test]
    async fn test_second_generate_is_409() {
        let mock = Arc::new(MockGenerator::replying(vec![Ok(GO_K8S_GUIDE.to_string())]));
        let app = app(mock.clone());
        let request = json!({"jd_text": "Backend engineer"});

        let (status, _) = send(&app, Method::POST, "/api/v1/guide/generate", Some(request.clone())).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&app, Method::POST, "/api/v1/guide/generate", Some(request)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json_body(&body)["error"]["code"], "CONFLICT");
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_refine_before_generate_is_409() {
        let app = app(Arc::new(MockGenerator::default()));
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/guide/refine",
            Some(json!({"query": "More SQL"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_refine_appends_section_and_activates_it() {
        let mock = Arc::new(MockGenerator::replying(vec![
            Ok(GO_K8S_GUIDE.to_string()),
            Ok(SQL_REFINEMENT.to_string()),
        ]));
        let app = app(mock);
        send(&app, Method::POST, "/api/v1/guide/generate", Some(json!({"jd_text": "Data"}))).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/guide/refine",
            Some(json!({"query": "Harder SQL"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["section"]["title"], "Harder SQL");
        assert_eq!(body["section"]["is_refinement"], true);
        assert_eq!(body["session"]["active_section"], body["section"]["id"]);
        assert_eq!(body["session"]["sidebar"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_select_and_fetch_sections() {
        let mock = Arc::new(MockGenerator::replying(vec![Ok(GO_K8S_GUIDE.to_string())]));
        let app = app(mock);
        send(&app, Method::POST, "/api/v1/guide/generate", Some(json!({"jd_text": "SRE"}))).await;

        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/v1/guide/active",
            Some(json!({"section_id": "reverse"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["id"], "reverse");

        let (_, body) = send(&app, Method::GET, "/api/v1/guide/active", None).await;
        assert_eq!(json_body(&body)["blocks"][0]["kind"], "list");

        let (status, _) = send(&app, Method::GET, "/api/v1/guide/sections/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_backend_failure_is_502_with_generic_message() {
        let mock = Arc::new(MockGenerator::replying(vec![Ok("no json here".to_string())]));
        let app = app(mock);

        let (status, body) = send(&app, Method::POST, "/api/v1/guide/generate", Some(json!({"jd_text": "SRE"}))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let body = json_body(&body);
        assert_eq!(body["error"]["code"], "MALFORMED_RESPONSE");
        assert!(!body["error"]["message"].as_str().unwrap().contains("no json here"));

        let (_, session) = send(&app, Method::GET, "/api/v1/session", None).await;
        let session = json_body(&session);
        assert_eq!(session["phase"], "idle");
        assert_eq!(session["last_error"], "Failed to generate. Please try again.");
    }

    #[tokio::test]
    async fn test_reset_and_export_without_document() {
        let mock = Arc::new(MockGenerator::replying(vec![Ok(GO_K8S_GUIDE.to_string())]));
        let app = app(mock);
        send(&app, Method::POST, "/api/v1/guide/generate", Some(json!({"jd_text": "SRE"}))).await;

        let (status, body) = send(&app, Method::POST, "/api/v1/session/reset", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["phase"], "idle");

        let (status, _) = send(&app, Method::GET, "/api/v1/guide/export", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
