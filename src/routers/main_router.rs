use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{
    handlers::{root::root_handler, signup::signup_handler},
    init::state::ServerState,
};

use super::middleware::logging::log_middleware;

pub fn build_router(state: Arc<ServerState>) -> axum::Router {
    let log_middleware = from_fn_with_state(state.clone(), log_middleware);

    Router::new()
        .route("/", get(root_handler))
        .route("/signup", post(signup_handler))
        .layer(log_middleware)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
