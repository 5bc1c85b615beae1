//! HTTP endpoint wrapping the extraction engine.
//!
//! `POST /get_form_info` takes a url-encoded `url` field and always answers
//! with the JSON envelope `{success, form_info?, error?}`.

use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use formscope::{ExtractResponse, FormExtractor};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};

/// Shared state handed to every handler.
pub struct AppState {
    pub extractor: FormExtractor,
}

/// Body of `POST /get_form_info`.
#[derive(Debug, Default, Deserialize)]
pub struct FormRequest {
    #[serde(default)]
    pub url: String,
}

/// Build the axum Router.
pub fn router(extractor: FormExtractor) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/get_form_info", post(get_form_info))
        .layer(cors)
        .with_state(Arc::new(AppState { extractor }))
}

/// Serve until the process is stopped.
pub async fn serve(addr: &str, extractor: FormExtractor) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("formscope listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(extractor)).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// A body that is missing or not url-encoded carries no `url` field.
async fn get_form_info(
    State(state): State<Arc<AppState>>,
    form: Result<Form<FormRequest>, FormRejection>,
) -> Json<ExtractResponse> {
    let req = match form {
        Ok(Form(req)) => req,
        Err(rejection) => {
            debug!("unreadable form body: {rejection}");
            FormRequest::default()
        }
    };
    let url = req.url.trim();
    if url.is_empty() {
        return Json(ExtractResponse::failure("URL must not be empty."));
    }

    let result = state.extractor.extract(url).await;
    match &result {
        Ok(info) => info!(url, platform = %info.platform, questions = info.question_count, "extracted form"),
        Err(e) => warn!(url, kind = ?e.kind(), "extraction failed: {e}"),
    }
    Json(result.into())
}
