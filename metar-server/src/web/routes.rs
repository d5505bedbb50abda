//! HTTP route handlers.

use std::net::SocketAddr;
use std::sync::Arc;

use askama::Template;
use axum::{
    Router,
    extract::{ConnectInfo, Query, Request, State, rejection::QueryRejection},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tower_http::CompressionLevel;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::domain::{ReportKind, StationCode};
use crate::manager::{Manager, QueryError};

use super::dto::{ApiResponse, ApiStatus, ReportQuery};
use super::limit::KeyedLimiter;
use super::state::AppState;
use super::templates::ReportsTemplate;

/// Create the application router.
///
/// Responses are gzip-compressed at `gzip_level` (0-9).
pub fn create_router(state: AppState, gzip_level: u8) -> Router {
    let mut api = Router::new()
        .route("/api/v1/metar", get(query_metar))
        .route("/api/v1/taf", get(query_taf));

    if let Some(limiter) = &state.limiter {
        api = api.route_layer(middleware::from_fn_with_state(
            Arc::clone(limiter),
            rate_limit,
        ));
    }

    api.route("/health", get(health))
        .layer(
            CompressionLayer::new()
                .gzip(true)
                .quality(CompressionLevel::Precise(i32::from(gzip_level))),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn query_metar(
    State(state): State<AppState>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    lookup(&state.metar, query).await
}

async fn query_taf(
    State(state): State<AppState>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    lookup(&state.taf, query).await
}

/// Shared body of the report endpoints.
///
/// One code is a strict lookup (404 when absent); several codes are a
/// best-effort batch whose failures are left out.
async fn lookup(
    manager: &Manager,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(req) = query.map_err(|e| AppError::BadRequest {
        message: e.body_text(),
    })?;
    let kind = manager.kind();

    let reports = match req.codes().as_slice() {
        [code] => {
            let code = StationCode::parse_normalized(code).map_err(|e| AppError::BadRequest {
                message: e.to_string(),
            })?;
            let report = manager
                .query(code.as_str())
                .await
                .map_err(|e| AppError::from_query(kind, e))?;
            vec![report]
        }
        codes => {
            // Invalid codes would only be dropped by the batch anyway.
            let valid: Vec<StationCode> = codes
                .iter()
                .filter_map(|c| StationCode::parse_normalized(c).ok())
                .collect();
            debug!(%kind, requested = codes.len(), valid = valid.len(), "batch lookup");
            manager.batch_query(valid.iter().map(StationCode::as_str)).await
        }
    };

    if req.raw {
        let html = ReportsTemplate { reports: &reports }
            .render()
            .map_err(|e| AppError::Internal {
                message: format!("Template error: {}", e),
            })?;
        return Ok(Html(html).into_response());
    }

    Ok(ApiResponse::success(reports).into_response())
}

/// Reject requests over the per-client, per-path limit.
async fn rate_limit(
    State(limiter): State<Arc<KeyedLimiter>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let ip = connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let key = format!("{ip}|{}", request.uri().path());

    if !limiter.allow(&key) {
        return AppError::RateLimited { key }.into_response();
    }

    next.run(request).await
}

/// Application error type, rendered as the JSON envelope.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { kind: ReportKind },
    RateLimited { key: String },
    Internal { message: String },
}

impl AppError {
    fn from_query(kind: ReportKind, e: QueryError) -> Self {
        match e {
            QueryError::InvalidCode(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            QueryError::NotFound(_) => AppError::NotFound { kind },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest { message } => {
                debug!(%message, "rejected request parameters");
                ApiStatus::ParamError
            }
            AppError::NotFound { kind } => ApiStatus::NotFound(*kind),
            AppError::RateLimited { key } => {
                warn!(%key, "rate limit exceeded");
                ApiStatus::RateLimitExceeded
            }
            AppError::Internal { message } => {
                error!(%message, "request failed");
                ApiStatus::ServerError
            }
        };

        ApiResponse::<Vec<String>>::failure(status).into_response()
    }
}
