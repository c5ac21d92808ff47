//! Same-origin feed relay.
//!
//! `GET /api/rss?url=<feed>` fetches the feed server-side with the fixed
//! client identifier and hands back the raw XML. Failures carry the
//! upstream cause in the `error` field.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::app::Result;
use crate::fetcher::Fetcher;

#[derive(Clone)]
pub struct RelayState {
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
}

#[derive(Debug, Deserialize)]
pub struct RelayQuery {
    url: Option<String>,
}

pub fn router(fetcher: Arc<dyn Fetcher + Send + Sync>) -> Router {
    Router::new()
        .route("/api/rss", get(relay_feed))
        .with_state(RelayState { fetcher })
}

pub async fn serve(addr: SocketAddr, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Relay listening on http://{}/api/rss", listener.local_addr()?);
    axum::serve(listener, router(fetcher)).await?;
    Ok(())
}

async fn relay_feed(
    State(state): State<RelayState>,
    Query(query): Query<RelayQuery>,
) -> Response {
    let url = match query.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => return error_response(StatusCode::BAD_REQUEST, "URL parameter is required"),
    };

    match state.fetcher.fetch(&url).await {
        Ok(body) => (
            [(header::CONTENT_TYPE, "application/xml")],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!("Relay fetch failed for {}: {}", url, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
