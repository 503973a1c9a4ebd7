use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::agent::{assemble_turn, AgentContext, ChatRequest, ChatResponse};
use crate::state::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "Gestor Familiar API",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Decode attachments, assemble the user turn and run the agent once.
/// Every pipeline failure collapses into a 500 with a `detail` message.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<Value>)> {
    debug!(
        "Chat request: {} bytes, {} files, {} history entries (ignored)",
        request.message.len(),
        request.files().len(),
        request.history_len()
    );

    // PDF parsing is CPU-bound; keep it off the async workers.
    let turn = tokio::task::spawn_blocking(move || {
        assemble_turn(&request.message, request.files())
    })
    .await
    .map_err(|e| internal_error(format!("attachment processing aborted: {}", e)))?;

    let context = AgentContext {
        workflow_input_as_text: turn.text().to_string(),
    };

    match state.agent.execute(turn, context).await {
        Ok(text) => Ok(Json(ChatResponse::success(text))),
        Err(e) => Err(internal_error(e.to_string())),
    }
}

fn internal_error(cause: String) -> (StatusCode, Json<Value>) {
    let detail = format!("Error al procesar la solicitud: {}", cause);
    error!("{}", detail);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": detail })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::attachments::tests::{encode, pdf_with_mistyped_font, pdf_with_pages};
    use crate::agent::runner::testing::RecordingRunner;
    use crate::agent::ContentItem;
    use crate::config::Config;
    use crate::routes::build_app;
    use axum::body::Body;
    use axum::http::{header, Request};
    use axum::Router;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app_with(runner: Arc<RecordingRunner>) -> Router {
        build_app(AppState::with_runner(Config::default(), runner))
    }

    fn post_chat(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = app_with(Arc::new(RecordingRunner::replying("unused")));
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"status": "healthy"}));
    }

    #[tokio::test]
    async fn root_reports_service() {
        let app = app_with(Arc::new(RecordingRunner::replying("unused")));
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "Gestor Familiar API");
        assert_eq!(body["version"], "1.0.0");
    }

    #[tokio::test]
    async fn chat_returns_agent_reply() {
        let runner = Arc::new(RecordingRunner::replying("Hola! En què et puc ajudar?"));
        let app = app_with(runner.clone());

        let response = app.oneshot(post_chat(json!({"message": "Hola"}))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"response": "Hola! En què et puc ajudar?", "status": "success"})
        );

        let requests = runner.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].input[0].content,
            vec![ContentItem::Text {
                text: "Hola".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn history_is_accepted_but_not_forwarded() {
        let runner = Arc::new(RecordingRunner::replying("ok"));
        let app = app_with(runner.clone());

        let response = app
            .oneshot(post_chat(json!({
                "message": "I ara?",
                "conversation_history": [
                    {"role": "user", "content": "Hola"},
                    {"role": "assistant", "content": "Bon dia"}
                ]
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let requests = runner.requests.lock().unwrap();
        assert_eq!(requests[0].input.len(), 1);
        assert_eq!(requests[0].input[0].text(), "I ara?");
    }

    #[tokio::test]
    async fn corrupt_pdf_is_not_fatal() {
        let runner = Arc::new(RecordingRunner::replying("No puc llegir el PDF"));
        let app = app_with(runner.clone());

        let response = app
            .oneshot(post_chat(json!({
                "message": "Llegeix això",
                "files": [{"name": "arbre.pdf", "type": "application/pdf", "data": encode(b"garbage")}]
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let requests = runner.requests.lock().unwrap();
        let sent = requests[0].input[0].text();
        assert!(sent.starts_with("Llegeix això\n\n\n[Contingut del PDF 'arbre.pdf']: [Error al leer PDF:"));
        assert!(requests[0].instructions.contains("[Error al leer PDF:"));
    }

    #[tokio::test]
    async fn pdf_that_crashes_the_parser_is_not_fatal() {
        let runner = Arc::new(RecordingRunner::replying("ok"));
        let app = app_with(runner.clone());

        let response = app
            .oneshot(post_chat(json!({
                "message": "Llegeix això",
                "files": [{"name": "arbre.pdf", "type": "application/pdf", "data": encode(&pdf_with_mistyped_font())}]
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "success");

        let requests = runner.requests.lock().unwrap();
        assert!(requests[0].input[0]
            .text()
            .starts_with("Llegeix això\n\n\n[Contingut del PDF 'arbre.pdf']: [Error al leer PDF:"));
    }

    #[tokio::test]
    async fn cors_mirrors_origin_with_credentials() {
        let app = app_with(Arc::new(RecordingRunner::replying("unused")));
        let req = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://familia.example.org")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://familia.example.org"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[tokio::test]
    async fn cors_preflight_is_answered() {
        let runner = Arc::new(RecordingRunner::replying("unused"));
        let app = app_with(runner.clone());
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/chat")
            .header(header::ORIGIN, "https://familia.example.org")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert!(response.status().is_success());
        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://familia.example.org"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(runner.calls(), 0);
    }

    #[tokio::test]
    async fn pdf_and_image_are_both_forwarded() {
        let runner = Arc::new(RecordingRunner::replying("ok"));
        let app = app_with(runner.clone());
        let pdf = encode(&pdf_with_pages(&["Casament 1975"]));

        let response = app
            .oneshot(post_chat(json!({
                "message": "Mira",
                "files": [
                    {"name": "foto.jpg", "type": "image/jpeg", "data": "SkFQRw=="},
                    {"name": "acta.pdf", "type": "application/pdf", "data": pdf}
                ]
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let requests = runner.requests.lock().unwrap();
        let content = &requests[0].input[0].content;
        assert_eq!(content.len(), 2);
        assert!(requests[0].input[0].text().contains("[Contingut del PDF 'acta.pdf']: "));
        assert!(requests[0].input[0].text().contains("Casament 1975"));
        assert_eq!(
            content[1],
            ContentItem::Image {
                image_url: "data:image/jpeg;base64,SkFQRw==".to_string()
            }
        );
    }

    #[tokio::test]
    async fn runner_failure_maps_to_500() {
        let runner = Arc::new(RecordingRunner::failing("model overloaded"));
        let app = app_with(runner.clone());

        let response = app.oneshot(post_chat(json!({"message": "Hola"}))).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = json_body(response).await;
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.starts_with("Error al procesar la solicitud:"));
        assert!(detail.contains("model overloaded"));
        assert!(body.get("response").is_none());
        assert_eq!(runner.calls(), 1);
    }

    #[tokio::test]
    async fn malformed_body_is_client_error() {
        let runner = Arc::new(RecordingRunner::replying("unused"));
        let app = app_with(runner.clone());

        let req = Request::builder()
            .method("POST")
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert!(response.status().is_client_error());
        assert_eq!(runner.calls(), 0);
    }

    #[tokio::test]
    async fn missing_message_is_client_error() {
        let runner = Arc::new(RecordingRunner::replying("unused"));
        let app = app_with(runner.clone());

        let response = app.oneshot(post_chat(json!({"files": []}))).await.unwrap();
        assert!(response.status().is_client_error());
        assert_eq!(runner.calls(), 0);
    }

    #[tokio::test]
    async fn health_survives_prior_failures() {
        let runner = Arc::new(RecordingRunner::failing("boom"));
        let app = app_with(runner);

        let response = app
            .clone()
            .oneshot(post_chat(json!({"message": "Hola"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
