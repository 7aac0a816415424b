use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    timeout::{RequestBodyTimeoutLayer, TimeoutLayer},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, Level};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::subscription::{SubscriptionRepository, SubscriptionService};

use crate::errors::ApiError;
use crate::openapi::ApiDoc;

pub mod subscriptions;

/// Shared handler state
#[derive(Clone)]
pub struct ServerState {
    pub subscriptions: Arc<SubscriptionService<dyn SubscriptionRepository>>,
}

impl ServerState {
    pub fn new(repo: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions: Arc::new(SubscriptionService::new(repo)) }
    }
}

/// Request deadlines applied by the middleware stack
#[derive(Debug, Clone, Copy)]
pub struct HttpTimeouts {
    /// Upper bound for receiving the request body
    pub read: Duration,
    /// Upper bound for producing the whole response
    pub write: Duration,
}

impl From<&configs::ServerConfig> for HttpTimeouts {
    fn from(cfg: &configs::ServerConfig) -> Self {
        Self { read: cfg.read_timeout(), write: cfg.write_timeout() }
    }
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up", body = Health)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

/// Subscription API routes plus health, without middleware
pub fn api_routes(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/subscriptions", get(subscriptions::list).post(subscriptions::create))
        .route("/subscriptions/summary", get(subscriptions::summary))
        .route(
            "/subscriptions/:id",
            get(subscriptions::get)
                .put(subscriptions::update)
                .delete(subscriptions::delete),
        )
        .with_state(state)
}

/// Build the full application router: API routes, docs and the middleware stack
pub fn build_router(state: ServerState, timeouts: HttpTimeouts) -> Router {
    let app = api_routes(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));
    with_middleware(app, timeouts)
}

/// Wrap `router` with tracing, panic recovery, CORS and timeouts.
pub fn with_middleware(router: Router, timeouts: HttpTimeouts) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    // 每次请求创建 span，包含方法和路径等
                    .make_span_with(
                        DefaultMakeSpan::new()
                            .level(Level::INFO)
                            .include_headers(false),
                    )
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    // 响应返回时打点，包含状态码与耗时
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .include_headers(false),
                    )
                    // 5xx 以 ERROR 记录
                    .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
            )
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(middleware::from_fn(mark_request))
            .layer(CorsLayer::very_permissive())
            .layer(middleware::map_response(timeout_as_json))
            .layer(TimeoutLayer::new(timeouts.write))
            .layer(RequestBodyTimeoutLayer::new(timeouts.read)),
    )
}

tokio::task_local! {
    static IN_REQUEST: ();
}

/// True while polling a request behind [`with_middleware`]; panics raised here
/// are recovered and logged by the panic layer.
pub fn in_request_scope() -> bool {
    IN_REQUEST.try_with(|_| ()).is_ok()
}

async fn mark_request(req: Request, next: Next) -> Response {
    IN_REQUEST.scope((), next.run(req)).await
}

// TimeoutLayer 返回的 408 没有响应体，统一成 {"error": ...}
async fn timeout_as_json(res: Response) -> Response {
    if res.status() == StatusCode::REQUEST_TIMEOUT {
        return ApiError::new(StatusCode::REQUEST_TIMEOUT, "request timeout").into_response();
    }
    res
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(event = "panic", panic = %detail, "request handler panicked");
    ApiError::internal().into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn request_scope_only_inside_marked_future() {
        assert!(!in_request_scope());
        IN_REQUEST.scope((), async { assert!(in_request_scope()) }).await;
        assert!(!in_request_scope());
    }
}
