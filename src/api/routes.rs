use std::time::Instant;

use axum::{
    Json,
    extract::{Query, State},
};

use crate::api::models::{ResponsePayload, SearchParams};
use crate::error::{AppError, Result};
use crate::providers::{self, ProviderBackend};
use crate::query::sanitize;
use crate::{AppState, assemble, extract};

pub async fn health_handler() -> &'static str {
    "OK"
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ResponsePayload>> {
    let query = sanitize(params.q.as_deref().unwrap_or(""));
    if query.is_empty() {
        return Err(AppError::MissingQuery);
    }

    tracing::info!(%query, "looking up car price");
    let start = Instant::now();

    let payload = lookup(state.backend.as_ref(), &query).await.map_err(|e| {
        tracing::error!(%query, error = %e, "lookup failed");
        e
    })?;

    tracing::info!(%query, elapsed = ?start.elapsed(), "lookup complete");
    Ok(Json(payload))
}

/// The full pipeline for one request: both searches in parallel, then
/// extraction over the web snippets, then assembly.
pub async fn lookup(backend: &dyn ProviderBackend, query: &str) -> Result<ResponsePayload> {
    let web_query = format!("{} price India variants ex-showroom", query);
    let image_query = format!("{} car India", query);
    let (web_results, image_candidates) = tokio::try_join!(
        backend.web_search(&web_query),
        backend.image_search(&image_query),
    )?;

    let record = extract::run(backend, query, &web_results).await?;
    let image = providers::pick_best_image(&image_candidates);

    Ok(assemble::assemble(query, record, image, &web_results))
}
