//! HTTP route definitions

use crate::{handlers, middleware, ApiError, AppState};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Method, Uri},
    middleware as axum_middleware,
    response::Response,
    routing::any,
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Create the main router
pub fn create_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/", any(object_handler))
        .route("/{*key}", any(object_handler))
        // Innermost first: body limit only applies once auth has passed
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::auth_middleware,
        ))
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware));

    let router = if state.config.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::PUT, Method::GET, Method::DELETE])
            .allow_headers(Any)
            .expose_headers(Any);
        router.layer(cors)
    } else {
        router
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Object key for a request: the path with its leading `/` stripped, undecoded
pub fn object_key(uri: &Uri) -> &str {
    let path = uri.path();
    path.strip_prefix('/').unwrap_or(path)
}

/// Dispatch on method: PUT, GET, DELETE, anything else is 405
async fn object_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, ApiError> {
    let key = object_key(&uri);

    match method {
        Method::PUT => handlers::put_object(state, key, &headers, body).await,
        Method::GET => handlers::get_object(state, key, &headers).await,
        Method::DELETE => handlers::delete_object(state, key).await,
        other => Err(ApiError::method_not_allowed(other.as_str())),
    }
}
