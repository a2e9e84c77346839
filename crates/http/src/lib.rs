//! HTTP server facade for Shopfront: Axum router, error envelope, and
//! graceful shutdown.

use std::future::Future;

use anyhow::Context;
use axum::Router;

use shopfront_db::Database;
use shopfront_kernel::{settings::Settings, ModuleRegistry};

pub mod error;
pub mod router;
mod system;

pub use error::AppError;
use router::RouterBuilder;

/// Bind, serve until `shutdown` resolves, then drain in-flight requests.
pub async fn start_server<S>(
    registry: &ModuleRegistry,
    settings: &Settings,
    database: &Database,
    shutdown: S,
) -> anyhow::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let app = build_router(registry, settings, database);

    let address = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind to {address}"))?;

    tracing::info!(
        environment = %settings.environment,
        origins = ?settings.server.allowed_origins,
        "HTTP server listening on http://{}",
        address
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Build the main router: system routes, every module under `/api/{name}`,
/// the OpenAPI document, then the middleware stack.
pub fn build_router(
    registry: &ModuleRegistry,
    settings: &Settings,
    database: &Database,
) -> Router {
    let mut router_builder =
        RouterBuilder::new().merge(system::routes(database.clone(), settings.environment));

    for module in registry.modules() {
        let module_name = module.name();
        tracing::info!(
            module = module_name,
            "mounting module routes under /api/{}",
            module_name
        );
        router_builder = router_builder.mount_module(module_name, module.routes());
    }

    router_builder
        .with_openapi(registry)
        .with_method_not_allowed_fallback()
        .with_not_found_fallback()
        .with_body_limit(settings.server.body_limit_bytes)
        .with_timeout(settings.server.request_timeout_ms)
        .with_cors(&settings.server.allowed_origins)
        .with_tracing()
        .with_request_id()
        .build()
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("interrupt received, shutting down"),
        _ = terminate => tracing::info!("terminate received, shutting down"),
    }
}
