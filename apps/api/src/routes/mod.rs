pub mod health;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::enhance::handlers as enhance;
use crate::session::handlers as draft;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/ai-status", get(enhance::handle_ai_status))
        // Draft model
        .route("/api/v1/draft", get(draft::handle_get_draft))
        .route("/api/v1/preview", get(draft::handle_get_preview))
        .route("/api/v1/draft/personal", patch(draft::handle_edit_personal))
        .route("/api/v1/draft/template", put(draft::handle_set_template))
        .route(
            "/api/v1/draft/experience",
            post(draft::handle_add_experience),
        )
        .route(
            "/api/v1/draft/experience/:index",
            patch(draft::handle_edit_experience).delete(draft::handle_remove_experience),
        )
        .route("/api/v1/draft/education", post(draft::handle_add_education))
        .route(
            "/api/v1/draft/education/:index",
            patch(draft::handle_edit_education).delete(draft::handle_remove_education),
        )
        .route(
            "/api/v1/draft/skills/:category",
            post(draft::handle_add_skill),
        )
        .route(
            "/api/v1/draft/skills/:category/:position",
            axum::routing::delete(draft::handle_remove_skill),
        )
        // Persistence & hand-off
        .route("/api/v1/draft/save", post(draft::handle_save))
        .route("/api/v1/draft/load", post(draft::handle_load))
        .route("/api/v1/draft/finalize", post(draft::handle_finalize))
        // Wizard
        .route("/api/v1/wizard/advance", post(draft::handle_advance))
        .route("/api/v1/wizard/retreat", post(draft::handle_retreat))
        .route("/api/v1/wizard/step/:step", put(draft::handle_go_to_step))
        // Enhancement
        .route(
            "/api/v1/enhance/summary",
            post(enhance::handle_enhance_summary),
        )
        .route(
            "/api/v1/enhance/experience/:index",
            post(enhance::handle_enhance_experience),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    use super::*;
    use crate::draft::ResumeDraft;
    use crate::enhance::{
        AiProvider, AiStatus, EnhanceError, EnhanceRequest, EnhanceResponse, Enhancer,
    };
    use crate::persistence::memory::MemoryDraftStore;
    use crate::session::EditorSession;

    struct DownEnhancer;

    #[async_trait]
    impl Enhancer for DownEnhancer {
        async fn enhance(&self, _: &EnhanceRequest) -> Result<EnhanceResponse, EnhanceError> {
            Err(EnhanceError::RateLimited { retries: 3 })
        }

        fn status(&self) -> AiStatus {
            AiStatus {
                provider: AiProvider::Groq,
                model: "llama-3.3-70b-versatile",
                configured: false,
            }
        }
    }

    fn app() -> Router {
        build_router(AppState {
            session: Arc::new(Mutex::new(EditorSession::new(ResumeDraft::new(), 3))),
            store: Arc::new(MemoryDraftStore::default()),
            enhancer: Arc::new(DownEnhancer),
            render_sink: None,
        })
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_empty_preview() {
        let (status, body) = send(&app(), Method::GET, "/api/v1/preview", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["preview"]["display_name"], "Your Name");
        assert_eq!(body["preview"]["summary"]["visible"], false);
        assert_eq!(body["preview"]["skills"]["visible"], false);
    }

    #[tokio::test]
    async fn test_personal_edit_updates_preview() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::PATCH,
            "/api/v1/draft/personal",
            Some(json!({ "first_name": "Ada", "email": "ada@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["preview"]["display_name"], "Ada Name");
        assert_eq!(body["preview"]["contact_line"], "ada@example.com");

        let (status, _) = send(
            &app,
            Method::PATCH,
            "/api/v1/draft/personal",
            Some(json!({ "shoe_size": "44" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_removing_last_experience_conflicts() {
        let (status, body) =
            send(&app(), Method::DELETE, "/api/v1/draft/experience/1", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "INVARIANT_VIOLATION");
    }

    #[tokio::test]
    async fn test_add_then_remove_experience() {
        let app = app();
        let (_, body) = send(&app, Method::POST, "/api/v1/draft/experience", None).await;
        assert_eq!(body["index"], 2);
        let (status, _) = send(&app, Method::DELETE, "/api/v1/draft/experience/1", None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, view) = send(&app, Method::GET, "/api/v1/draft", None).await;
        let entries = view["draft"]["experience"]["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["index"], 2);
    }

    #[tokio::test]
    async fn test_bad_education_year_is_rejected() {
        let (status, body) = send(
            &app(),
            Method::PATCH,
            "/api/v1/draft/education/1",
            Some(json!({ "start_year": 1820 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_skill_add_and_out_of_range_remove() {
        let app = app();
        let (_, body) = send(
            &app,
            Method::POST,
            "/api/v1/draft/skills/technical",
            Some(json!({ "text": "  Rust " })),
        )
        .await;
        assert_eq!(body["preview"]["skills"]["items"], json!(["Rust"]));

        let (status, _) =
            send(&app, Method::DELETE, "/api/v1/draft/skills/technical/5", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/draft/skills/hobbies",
            Some(json!({ "text": "Chess" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wizard_advance_finalizes_on_last_step() {
        let app = app();
        send(
            &app,
            Method::PATCH,
            "/api/v1/draft/personal",
            Some(json!({ "first_name": "Ada" })),
        )
        .await;
        let (_, first) = send(&app, Method::POST, "/api/v1/wizard/advance", None).await;
        assert_eq!(first["outcome"], "moved");
        assert_eq!(first["step"], 2);

        send(&app, Method::POST, "/api/v1/wizard/advance", None).await;
        let (_, last) = send(&app, Method::POST, "/api/v1/wizard/advance", None).await;
        assert_eq!(last["outcome"], "finalize");
        assert_eq!(last["wizard"]["current"], 3);
        assert_eq!(last["finalized"]["payload"]["first_name"], "Ada");
    }

    #[tokio::test]
    async fn test_go_to_invalid_step() {
        let (status, _) = send(&app(), Method::PUT, "/api/v1/wizard/step/9", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_save_then_load_restores_draft() {
        let app = app();
        send(
            &app,
            Method::PATCH,
            "/api/v1/draft/personal",
            Some(json!({ "last_name": "Lovelace" })),
        )
        .await;
        let (status, _) = send(&app, Method::POST, "/api/v1/draft/save", None).await;
        assert_eq!(status, StatusCode::OK);

        send(
            &app,
            Method::PATCH,
            "/api/v1/draft/personal",
            Some(json!({ "last_name": "" })),
        )
        .await;
        let (_, body) = send(&app, Method::POST, "/api/v1/draft/load", None).await;
        assert_eq!(body["restored"], true);
        assert_eq!(body["preview"]["display_name"], "Your Lovelace");
    }

    #[tokio::test]
    async fn test_load_without_saved_draft_is_not_an_error() {
        let (status, body) = send(&app(), Method::POST, "/api/v1/draft/load", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["restored"], false);
    }

    #[tokio::test]
    async fn test_enhancement_failure_is_reported_not_raised() {
        let app = app();
        send(
            &app,
            Method::PATCH,
            "/api/v1/draft/personal",
            Some(json!({ "summary": "Keep me" })),
        )
        .await;
        let (status, body) = send(&app, Method::POST, "/api/v1/enhance/summary", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applied"], false);
        assert_eq!(body["preview"]["summary"]["text"], "Keep me");
    }

    #[tokio::test]
    async fn test_ai_status() {
        let (_, body) = send(&app(), Method::GET, "/api/v1/ai-status", None).await;
        assert_eq!(body["provider"], "groq");
        assert_eq!(body["configured"], false);
    }
}
