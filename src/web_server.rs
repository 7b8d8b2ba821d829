//! The single-page web UI: a chat column plus a deployment sidebar.
//! Each handler runs one operation to completion; the session lock
//! keeps the transcript and blueprint mutated by one handler at a
//! time.

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

use crate::blueprint::{build_blueprint, serialize_blueprint};
use crate::constants;
use crate::error::ArchitectError;
use crate::github::RepoClient;
use crate::llm::ModelClient;
use crate::session::Session;

// Shared application state
#[derive(Clone)]
struct AppState {
    templates: Arc<AutoReloader>,
    session: Arc<Mutex<Session>>,
    // Directory packaged by the blueprint builder.
    folder: Arc<PathBuf>,
    openai_api_base: String,
    github_api_base: String,
}

/// Maps core errors onto HTTP responses: precondition failures are the
/// caller's fault, everything remote is a gateway failure.
enum ApiError {
    BadRequest(String),
    Core(ArchitectError),
}

impl From<ArchitectError> for ApiError {
    fn from(e: ArchitectError) -> Self {
        ApiError::Core(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Core(e) => {
                let status = match e {
                    ArchitectError::MissingCredential(_) | ArchitectError::MissingTarget => {
                        StatusCode::BAD_REQUEST
                    }
                    _ => StatusCode::BAD_GATEWAY,
                };
                (status, e.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

// Minijinja Environment setup
fn create_template_env() -> AutoReloader {
    // Use AutoReloader for development convenience
    AutoReloader::new(|notifier| {
        let loader = path_loader("templates");
        let mut env = Environment::new();
        env.set_loader(loader);
        // Watch the templates directory for changes
        notifier.watch_path("templates", true);
        Ok(env)
    })
}

async fn index_handler(
    State(state): State<AppState>,
) -> Result<Html<String>, Html<String>> {
    // Acquire env, get template, and render within the same block
    state
        .templates
        .acquire_env()
        .and_then(|env| {
            env.get_template("index.html").and_then(|tmpl| {
                let context = minijinja::context! {
                    title => "Architect",
                    models => constants::MODELS,
                    default_model => constants::DEFAULT_MODEL.as_str(),
                    default_branch => constants::DEFAULT_BRANCH.as_str(),
                    folder => state.folder.display().to_string(),
                };
                tmpl.render(context)
            })
        })
        .map(Html)
        .map_err(|e| {
            error!("Failed to get or render template: {}", e);
            Html(format!("Internal Server Error: {}", e))
        })
}

async fn history_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let session = state.session.lock().await;
    Json(json!({
        "history": session.history,
        "blueprint_files": session.blueprint.as_ref().map(|b| b.len()),
    }))
}

#[derive(Debug, Deserialize)]
struct MessageRequest {
    message: String,
    #[serde(default)]
    api_key: String,
    #[serde(default)]
    model: String,
}

async fn message_handler(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if request.message.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Please enter a message before sending".to_string(),
        ));
    }
    let api_key = non_empty_or(request.api_key, constants::OPENAI_API_KEY.as_str());
    let model = non_empty_or(request.model, constants::DEFAULT_MODEL.as_str());

    let mut session = state.session.lock().await;
    // The user entry stays in the transcript even when the model call
    // fails.
    session.push_user(request.message);
    let client = ModelClient::with_api_base(&state.openai_api_base, api_key);
    let reply = client.generate_response(&model, &session.history).await?;
    session.push_assistant(reply.clone());
    Ok(Json(json!({ "reply": reply })))
}

async fn blueprint_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let blueprint = build_blueprint(&state.folder);
    let files = blueprint.len();
    // Preview is the first 1k chars of the compact rendering.
    let preview: String = serde_json::to_string(&blueprint)
        .unwrap_or_default()
        .chars()
        .take(1000)
        .collect();
    let mut session = state.session.lock().await;
    session.set_blueprint(blueprint);
    info!("Blueprint built with {} file(s)", files);
    Json(json!({ "files": files, "preview": preview }))
}

#[derive(Debug, Deserialize)]
struct DeployRequest {
    #[serde(default)]
    token: String,
    #[serde(default)]
    repo: String,
    #[serde(default)]
    branch: String,
    #[serde(default)]
    message: String,
}

async fn deploy_handler(
    State(state): State<AppState>,
    Json(request): Json<DeployRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = state.session.lock().await;
    let Some(blueprint) = session.blueprint.as_ref() else {
        return Err(ApiError::BadRequest("Build a blueprint first".to_string()));
    };
    let token = non_empty_or(request.token, constants::GITHUB_TOKEN.as_str());
    let branch = non_empty_or(request.branch, constants::DEFAULT_BRANCH.as_str());
    let message = non_empty_or(request.message, constants::DEFAULT_COMMIT_MESSAGE);

    let client = RepoClient::with_api_base(&state.github_api_base, token);
    client
        .publish_blueprint(&request.repo, blueprint, &message, &branch)
        .await?;
    info!("Deployed blueprint to {} on {}", request.repo, branch);
    Ok(Json(json!({ "deployed": true })))
}

async fn clear_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let mut session = state.session.lock().await;
    session.clear_history();
    Json(json!({ "cleared": true }))
}

async fn download_handler(State(state): State<AppState>) -> Response {
    let session = state.session.lock().await;
    match session.blueprint.as_ref() {
        Some(blueprint) => {
            let payload = serialize_blueprint(blueprint);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/json".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!(
                            "attachment; filename=\"{}\"",
                            constants::BLUEPRINT_FILE_NAME
                        ),
                    ),
                ],
                payload,
            )
                .into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "No blueprint to download" })),
        )
            .into_response(),
    }
}

fn non_empty_or(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

/// Build the application router; exposed separately so handler tests
/// can drive it without binding a socket.
pub fn build_router(folder: PathBuf) -> Router {
    build_router_with_api_bases(
        folder,
        constants::OPENAI_API_BASE.clone(),
        constants::GITHUB_API_BASE.clone(),
    )
}

/// Same router with the vendor endpoints swapped out (used by tests).
pub fn build_router_with_api_bases(
    folder: PathBuf,
    openai_api_base: String,
    github_api_base: String,
) -> Router {
    let state = AppState {
        templates: Arc::new(create_template_env()),
        session: Arc::new(Mutex::new(Session::new())),
        folder: Arc::new(folder),
        openai_api_base,
        github_api_base,
    };

    Router::new()
        .route("/", get(index_handler))
        .route("/api/history", get(history_handler))
        .route("/api/message", post(message_handler))
        .route("/api/blueprint", post(blueprint_handler))
        .route("/api/blueprint/download", get(download_handler))
        .route("/api/deploy", post(deploy_handler))
        .route("/api/clear", post(clear_handler))
        .nest_service("/static", ServeDir::new("static"))
        .with_state(state)
        .layer(TraceLayer::new_for_http()) // Add request logging
}

pub async fn start_web_server(port: u16, folder: PathBuf) -> Result<()> {
    let app = build_router(folder);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
