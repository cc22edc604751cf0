//! HTTP handlers and wire types for the inbound AI routes

use crate::error::{Error, Result};
use crate::prompts::{ChatContext, TaskBrief};
use crate::service::{EndpointStatus, EnhancedTask, Target};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::stream::Stream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use url::Url;

/// Query parameters of the status route
#[derive(Debug, Deserialize)]
pub struct StatusParams {
    /// Endpoint URL override
    pub url: Option<String>,
}

/// Body of the title generation route
#[derive(Debug, Deserialize)]
pub struct GenerateTitleRequest {
    pub description: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Body of the summary generation route
#[derive(Debug, Deserialize)]
pub struct GenerateSummaryRequest {
    pub tasks: Vec<TaskBrief>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Body of the category suggestion route
#[derive(Debug, Deserialize)]
pub struct GenerateCategoryRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Body of the combined title + description route
#[derive(Debug, Deserialize)]
pub struct EnhanceTaskRequest {
    pub user_input: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Body of the chat route
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub context: ChatContext,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Title response
#[derive(Debug, Serialize)]
pub struct TitleResponse {
    pub title: String,
}

/// Summary response
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

/// Category response, always one of the six fixed names
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub category: &'static str,
}

fn parse_url(url: Option<&str>) -> Result<Option<Url>> {
    url.map(|raw| {
        Url::parse(raw).map_err(|e| Error::invalid_input(format!("invalid url: {e}")))
    })
    .transpose()
}

fn target(model: Option<String>, url: Option<&str>) -> Result<Target> {
    Ok(Target {
        model,
        url: parse_url(url)?,
    })
}

/// `GET /ai/status`: probe the endpoint and list its models
pub async fn status(
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
) -> Result<Json<EndpointStatus>> {
    let url = parse_url(params.url.as_deref())?;
    Ok(Json(state.service.status(url).await))
}

/// `POST /ai/generate-title`
pub async fn generate_title(
    State(state): State<AppState>,
    Json(request): Json<GenerateTitleRequest>,
) -> Result<Json<TitleResponse>> {
    let target = target(request.model, request.url.as_deref())?;
    let title = state
        .service
        .generate_title(&request.description, &target)
        .await?;
    Ok(Json(TitleResponse { title }))
}

/// `POST /ai/generate-summary`
pub async fn generate_summary(
    State(state): State<AppState>,
    Json(request): Json<GenerateSummaryRequest>,
) -> Result<Json<SummaryResponse>> {
    let target = target(request.model, request.url.as_deref())?;
    let summary = state
        .service
        .generate_summary(&request.tasks, &target)
        .await?;
    Ok(Json(SummaryResponse { summary }))
}

/// `POST /ai/generate-category`
pub async fn generate_category(
    State(state): State<AppState>,
    Json(request): Json<GenerateCategoryRequest>,
) -> Result<Json<CategoryResponse>> {
    let target = target(request.model, request.url.as_deref())?;
    let category = state
        .service
        .suggest_category(&request.title, request.description.as_deref(), &target)
        .await?;
    Ok(Json(CategoryResponse {
        category: category.as_str(),
    }))
}

/// `POST /ai/enhance-task`
pub async fn enhance_task(
    State(state): State<AppState>,
    Json(request): Json<EnhanceTaskRequest>,
) -> Result<Json<EnhancedTask>> {
    let target = target(request.model, request.url.as_deref())?;
    let enhanced = state
        .service
        .enhance_task(&request.user_input, &target)
        .await?;
    Ok(Json(enhanced))
}

/// `POST /ai/chat`: streaming chat over Server-Sent Events
///
/// Each frame is `data: <json>` where the payload is one of
/// `{"token": ...}`, `{"done": true}` or `{"error": ...}`; the stream ends
/// after the first terminal frame. When the client disconnects axum drops
/// the stream, which releases the upstream connection.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let target = target(request.model, request.url.as_deref())?;
    let events = state
        .service
        .chat(&request.message, &request.context, &target)?;

    let frames = events.map(|event| Ok(Event::default().data(event.payload().to_string())));
    Ok(Sse::new(frames).keep_alive(KeepAlive::default()))
}
