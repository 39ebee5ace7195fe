//! HTTP hosting: database bootstrap, middleware stack and graceful shutdown.

use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, Request, Response, StatusCode};
use axum::routing::get;
use divelog::DiveLogModule;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::field::Empty;
use tracing::{Span, info};

use crate::config::{AppConfig, DatabaseConfig, ServerConfig};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Connect, migrate, mount and serve until a shutdown signal arrives.
///
/// # Errors
/// Returns an error when the database, migrations or the listener fail.
pub async fn run(config: &AppConfig) -> Result<()> {
    config.validate()?;

    let db = connect(&config.database).await?;
    let module = DiveLogModule::new(db, &config.divelog)?;
    module.migrate().await?;

    let app = build_app(&module, &config.server);
    let listener = TcpListener::bind(config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    info!(addr = %config.server.bind_addr, "HTTP server bound");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = wait_for_shutdown().await {
                tracing::error!(error = %e, "Signal handling failed, shutting down");
            }
        })
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn connect(cfg: &DatabaseConfig) -> Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(cfg.dsn.clone());
    opts.max_connections(cfg.max_connections)
        .connect_timeout(cfg.connect_timeout)
        .sqlx_logging(false);
    let db = Database::connect(opts)
        .await
        .context("failed to connect to the database")?;
    info!(backend = ?db.get_database_backend(), "Database connected");
    Ok(db)
}

/// Module routes plus `/health`, wrapped in the HTTP middleware stack.
///
/// Runtime order, outermost first: set request id, propagate request id,
/// trace, timeout, body limit, routes.
#[must_use]
pub fn build_app(module: &DiveLogModule, cfg: &ServerConfig) -> Router {
    let header = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(module.router())
        .layer(DefaultBodyLimit::max(cfg.body_limit_bytes))
        .layer(RequestBodyLimitLayer::new(cfg.body_limit_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            cfg.request_timeout,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<axum::body::Body>| {
                    let rid = req
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("n/a");
                    tracing::info_span!(
                        "http_request",
                        method = %req.method(),
                        path = %req.uri().path(),
                        request_id = %rid,
                        status = Empty,
                        latency_ms = Empty,
                    )
                })
                .on_response(|res: &Response<axum::body::Body>, latency: Duration, span: &Span| {
                    span.record("status", res.status().as_u16());
                    span.record("latency_ms", latency.as_millis());
                }),
        )
        .layer(PropagateRequestIdLayer::new(header.clone()))
        .layer(SetRequestIdLayer::new(header, MakeRequestUuid))
}

/// Wait for Ctrl+C or SIGTERM.
///
/// # Errors
/// Returns an error if a signal handler cannot be installed.
pub async fn wait_for_shutdown() -> Result<()> {
    tokio::select! {
        result = signal::ctrl_c() => {
            result.context("Ctrl+C handler failed")?;
            info!("Received Ctrl+C signal");
        }
        result = wait_sigterm() => {
            result?;
            info!("Received SIGTERM signal");
        }
    }
    info!("Shutdown signal received, initiating graceful shutdown");
    Ok(())
}

#[cfg(unix)]
async fn wait_sigterm() -> Result<()> {
    let mut handler = signal::unix::signal(signal::unix::SignalKind::terminate())
        .context("failed to install SIGTERM handler")?;
    handler.recv().await;
    Ok(())
}

#[cfg(not(unix))]
async fn wait_sigterm() -> Result<()> {
    std::future::pending::<Result<()>>().await
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use axum::body::Body;
    use tower::ServiceExt;

    async fn app() -> Router {
        let mut config = AppConfig::default();
        config.database.dsn = "sqlite::memory:".to_owned();
        config.database.max_connections = 1;
        config.divelog.session_secret = "server-test-secret-0123456789abcdef".to_owned().into();

        let db = connect(&config.database).await.unwrap();
        let module = DiveLogModule::new(db, &config.divelog).unwrap();
        module.migrate().await.unwrap();
        build_app(&module, &config.server)
    }

    #[tokio::test]
    async fn health_answers_and_request_id_is_echoed() {
        let res = app()
            .await
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[tokio::test]
    async fn incoming_request_id_is_kept() {
        let res = app()
            .await
            .oneshot(
                Request::get("/health")
                    .header(REQUEST_ID_HEADER, "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.headers()[REQUEST_ID_HEADER], "abc-123");
    }

    #[tokio::test]
    async fn module_routes_are_mounted() {
        let res = app()
            .await
            .oneshot(
                Request::get("/divelog/v1/certification-definitions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
