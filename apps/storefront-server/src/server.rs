//! HTTP ingress: router assembly, middleware stack, bind and graceful
//! shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{HeaderName, Request},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::field::Empty;

use commerce::domain::{AccountsService, CatalogService, CheckoutService};
use commerce::infra::password::BcryptHasher;
use commerce::CommerceConfig;
use db::DbHandle;
use runtime::ServerConfig;

fn request_id_header() -> HeaderName {
    HeaderName::from_static("x-request-id")
}

#[derive(Clone, Default)]
struct MakeReqId;

impl MakeRequestId for MakeReqId {
    fn make_request_id<B>(&mut self, _req: &Request<B>) -> Option<RequestId> {
        let id = nanoid::nanoid!();
        Some(RequestId::new(id.parse().ok()?))
    }
}

/// Build the application router: commerce routes, the health endpoint and
/// the shared middleware stack.
pub fn build_router(server: &ServerConfig, db: &DbHandle, commerce_cfg: &CommerceConfig) -> Router {
    let conn = db.sea();
    let catalog = Arc::new(CatalogService::new(conn.clone()));
    let accounts = Arc::new(AccountsService::new(
        conn.clone(),
        Arc::new(BcryptHasher::new(commerce_cfg.bcrypt_cost)),
    ));
    let checkout = Arc::new(CheckoutService::new(conn));

    let mut router = Router::new()
        .route("/health", get(health_check))
        .merge(commerce::api::rest::routes::router(
            catalog, accounts, checkout,
        ));

    // Request flow (outermost to innermost):
    // PropagateRequestId -> SetRequestId -> Trace -> Timeout -> CORS -> BodyLimit.
    // Axum treats the last added layer as the outermost, so they are stacked
    // in reverse.

    // Body limit - 16MB
    router = router.layer(RequestBodyLimitLayer::new(16 * 1024 * 1024));

    router = router.layer(CorsLayer::permissive());

    // Per-request timeout; 0 disables it
    if server.timeout_sec > 0 {
        router = router.layer(TimeoutLayer::new(Duration::from_secs(server.timeout_sec)));
    }

    // Trace with request_id; SetRequestId has already run by the time the
    // span is created, so the header is always present.
    router = router.layer(
        TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
            let rid = req
                .headers()
                .get(request_id_header())
                .and_then(|v| v.to_str().ok())
                .unwrap_or("n/a");
            tracing::info_span!(
                "http_request",
                method = %req.method(),
                uri = %req.uri().path(),
                version = ?req.version(),
                request_id = %rid,
                status = Empty,
                latency_ms = Empty
            )
        }),
    );

    // Generate x-request-id when the client did not send one, and echo it
    // back on the response.
    let x_request_id = request_id_header();
    router = router.layer(SetRequestIdLayer::new(x_request_id.clone(), MakeReqId));
    router = router.layer(PropagateRequestIdLayer::new(x_request_id));

    router
}

/// Bind the listener and serve until a shutdown signal arrives.
pub async fn serve(server: &ServerConfig, router: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((server.host.as_str(), server.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", server.host, server.port))?;
    tracing::info!("HTTP server bound on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            wait_for_shutdown().await;
            tracing::info!("HTTP server shutting down gracefully");
        })
        .await
        .context("HTTP server failed")
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "storefront-server",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {},
                    _ = sigint.recv() => {},
                }
            }
            // Signal registration failed; Ctrl+C is still handled by tokio.
            _ => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
