//! HTTP front end for the hierarchical todo service.
//!
//! # Design
//! Routes live under `/api/v1`. Handlers are thin: decode, validate through
//! `todo_core`, call the injected [`TodoStore`](todo_core::TodoStore) under a
//! deadline, wrap the result in `{"data": ...}`. The layers added by
//! [`apply_layers`] give every request a tracing span with a request id, turn
//! handler panics into the `internal` error envelope, and cap body size.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;
pub mod telemetry;

use std::any::Any;
use std::future::Future;

use axum::extract::DefaultBodyLimit;
use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};
use uuid::Uuid;

pub use error::AppError;
pub use extract::MAX_BODY_BYTES;
pub use handlers::Envelope;
pub use state::AppState;

/// Routes without layers or state.
pub fn routes() -> Router<AppState> {
    let todos = Router::new()
        .route(
            "/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route("/todos/children", post(handlers::create_child_todo))
        .route(
            "/todos/{id}",
            get(handlers::get_todo)
                .patch(handlers::update_todo)
                .delete(handlers::delete_todo),
        );

    Router::new()
        .route("/healthz", get(health))
        .nest("/api/v1", todos)
}

/// The complete application.
pub fn app(state: AppState) -> Router {
    apply_layers(routes().with_state(state))
}

/// Body limit, panic recovery and per-request tracing.
pub fn apply_layers(router: Router) -> Router {
    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

pub async fn run(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}

/// Serve until `shutdown` resolves, then let in-flight requests finish.
pub async fn serve<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn health() -> &'static str {
    "OK"
}

fn request_span(request: &Request) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %Uuid::new_v4(),
    )
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "non-string panic payload".to_string()
    };
    AppError::Internal(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}
