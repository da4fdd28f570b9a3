//! HTTP surface: JSON endpoint, query form and health check.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use handlebars::TemplateError;
use log::{error, info};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::bridge::{QueryResult, WorklogQuery};
use crate::config::Config;
use crate::error::{Result, WorklogError};
use crate::form::{FormRenderer, FormState, Outcome};
use crate::worklog::WorklogService;

/// Shared handler state. Holds no mutable data.
#[derive(Clone)]
pub struct AppState {
    pub service: WorklogService,
    pub pages: Arc<FormRenderer>,
}

impl AppState {
    pub fn new(service: WorklogService) -> std::result::Result<Self, TemplateError> {
        Ok(Self {
            service,
            pages: Arc::new(FormRenderer::new()?),
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(form_handler))
        .route("/api/worklog", get(worklog_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until the process stops.
pub async fn serve(config: Config) -> std::io::Result<()> {
    let service = WorklogService::from_config(config.jira)
        .map_err(|err| std::io::Error::other(err.to_string()))?;
    let state = AppState::new(service).map_err(|err| std::io::Error::other(err.to_string()))?;
    let app = build_router(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("API server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await
}

async fn worklog_handler(
    State(state): State<AppState>,
    Query(query): Query<WorklogQuery>,
) -> Result<Json<QueryResult>> {
    state
        .service
        .summarize_query(&query)
        .await
        .map(Json)
        .map_err(log_failure)
}

async fn form_handler(
    State(state): State<AppState>,
    Query(query): Query<WorklogQuery>,
) -> Result<Html<String>> {
    if query.is_empty() {
        return render_form(&state, &FormState::default());
    }

    let outcome = match state.service.summarize_query(&query).await {
        Ok(result) => Outcome::Result(result),
        Err(err) => Outcome::Error(log_failure(err).to_string()),
    };
    let form = FormState {
        user_name: query.user_name.unwrap_or_default(),
        date_required: query.date_required.unwrap_or_default(),
        outcome: Some(outcome),
    };
    render_form(&state, &form)
}

fn render_form(state: &AppState, form: &FormState) -> Result<Html<String>> {
    state
        .pages
        .render_page(form)
        .map(Html)
        .map_err(|err| log_failure(err.into()))
}

async fn health_handler() -> impl IntoResponse {
    "ok"
}

fn log_failure(err: WorklogError) -> WorklogError {
    error!("Worklog query failed: {}", err);
    err
}
