//! HTTP boundary: `POST /context` and `GET /health`.
crate::reexport!(api);
use crate::*;
use axum::{
    Router,
    extract::Request,
    http::HeaderValue,
    routing::{get, post},
};
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tower_http::{
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};

pub struct AppState {
    pub service: ContextService,
}

/// Sequential `x-request-id` values for requests that arrive without one.
#[derive(Clone, Default)]
struct Counter(Arc<AtomicU64>);

impl MakeRequestId for Counter {
    fn make_request_id<B>(&mut self, _: &axum::http::Request<B>) -> Option<RequestId> {
        let id = self.0.fetch_add(1, Ordering::Relaxed) + 1;
        Some(RequestId::new(HeaderValue::from(id)))
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/context", post(post_context))
        .route("/health", get(get_health))
        .with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id,
            )
        }))
        .layer(SetRequestIdLayer::x_request_id(Counter::default()))
}

/// Serve until Ctrl+C.
pub async fn serve(config: Config) -> Result {
    let service = ContextService::from_config(&config).await?;
    let app = router(Arc::new(AppState { service }));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Cannot listen for Ctrl+C, shutdown needs a kill: {e}");
        std::future::pending::<()>().await;
    }
}
