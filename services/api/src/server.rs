use crate::cli::ServeArgs;
use crate::infra::{in_memory_store, AppState, RecordStore};
use crate::routes::{endpoint_not_found, handle_panic, request_span, with_service_routes};
use axum::extract::Request;
use axum::{Extension, Router, ServiceExt};
use axum_prometheus::PrometheusMetricLayer;
use formation::config::AppConfig;
use formation::error::AppError;
use formation::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::NormalizePath;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = build_app(in_memory_store(), app_state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "BVI Company Formation API server is running on port {}", addr.port());
    info!("Health check: http://localhost:{}/", addr.port());

    axum::serve(listener, ServiceExt::<Request>::into_make_service(normalize_paths(app)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped, in-memory records discarded");
    Ok(())
}

/// Full application: record routes, info and operational endpoints, middleware.
pub(crate) fn build_app(store: Arc<RecordStore>, state: AppState) -> Router {
    with_middleware(with_service_routes(store), state)
}

/// Trims a trailing slash before routing, so `/companies/` lists companies.
pub(crate) fn normalize_paths(app: Router) -> NormalizePath<Router> {
    NormalizePath::trim_trailing_slash(app)
}

/// Fallbacks and the middleware stack, outermost last: CORS, request ids,
/// tracing, then panic capture closest to the handlers.
pub(crate) fn with_middleware(routes: Router, state: AppState) -> Router {
    routes
        .fallback(endpoint_not_found)
        .method_not_allowed_fallback(endpoint_not_found)
        .layer(Extension(state))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
