use crate::{
    config::GatewayConfig,
    handlers::{index, session_auth, users},
    middleware::auth_middleware,
    state::GatewayState,
};
use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, post, MethodRouter},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

pub const API_PREFIX: &str = "/api/v1";

/// Register `path` both with and without a trailing slash.
fn route_lenient(
    router: Router<GatewayState>,
    path: &str,
    method_router: MethodRouter<GatewayState>,
) -> Router<GatewayState> {
    router
        .route(path, method_router.clone())
        .route(&format!("{path}/"), method_router)
}

/// Status, stats and error-page routes
pub fn index_routes() -> Router<GatewayState> {
    let router = route_lenient(Router::new(), "/status", get(index::status));
    let router = route_lenient(router, "/stats", get(index::stats));
    let router = route_lenient(router, "/unauthorized", get(index::unauthorized));
    route_lenient(router, "/forbidden", get(index::forbidden))
}

/// Session login and logout routes
pub fn session_routes() -> Router<GatewayState> {
    let router = route_lenient(Router::new(), "/auth_session/login", post(session_auth::login));
    route_lenient(router, "/auth_session/logout", delete(session_auth::logout))
}

pub fn user_routes() -> Router<GatewayState> {
    route_lenient(Router::new(), "/users/me", get(users::me))
}

pub fn create_cors_layer(config: &GatewayConfig) -> CorsLayer {
    let origins = if config.allows_any_origin() {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
}

/// Full router: every API route behind the auth gate, CORS around the gate
/// (preflights never reach it) and request tracing outermost.
pub fn create_routes(state: GatewayState) -> Router {
    let api = Router::new()
        .merge(index_routes())
        .merge(session_routes())
        .merge(user_routes());

    Router::new()
        .nest(API_PREFIX, api)
        .fallback(index::not_found)
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .layer(create_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
