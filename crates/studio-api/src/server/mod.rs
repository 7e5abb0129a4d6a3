//! HTTP presentation surface: the renderer reads snapshots and pushes raw
//! command strings; nothing here mutates kernel state outside the facade.

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Request, State};
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use contracts::{
    ApiError, ErrorCode, Snapshot, StudioCommand, StudioConfig, StudioMode, StudioStatus,
    SCHEMA_VERSION_V1,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::{CommandAuditEntry, EngineApi};

const DEFAULT_AUTO_INTERVAL_MS: u64 = 3_000;
const MIN_AUTO_INTERVAL_MS: u64 = 250;

include!("error.rs");
include!("state.rs");
include!("routes/control.rs");
include!("routes/query.rs");

pub async fn serve(addr: SocketAddr) -> Result<(), ServerError> {
    let state = AppState::new();
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/runs", post(create_run))
        .route("/api/v1/runs/{run_id}/status", get(get_status))
        .route("/api/v1/runs/{run_id}/snapshot", get(get_snapshot))
        .route(
            "/api/v1/runs/{run_id}/commands",
            post(submit_command).get(get_commands),
        )
        .route("/api/v1/runs/{run_id}/turn", post(advance_turn))
        .route("/api/v1/runs/{run_id}/auto", post(set_auto_progress))
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

async fn cors_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = Response::new(axum::body::Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}

fn apply_cors_headers(headers: &mut axum::http::HeaderMap) {
    headers.insert(
        HeaderName::from_static("access-control-allow-origin"),
        HeaderValue::from_static("*"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-methods"),
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-headers"),
        HeaderValue::from_static("*"),
    );
}
