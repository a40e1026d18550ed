use axum::Router;
use axum::extract::State;
use std::path::Path;
use std::sync::Arc;

pub mod api;
pub mod app_env;
pub mod client;
pub mod domain;
pub mod dto;
pub mod external_connections;
pub mod hashing;
pub mod logging;
pub mod persistence;
pub mod routing_utils;

/// Shared state made available to every request handler
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
    pub password_hasher: hashing::Argon2PasswordHasher,
}

pub type AppState = State<Arc<SharedData>>;

/// Assembles the full application: REST endpoints under /api, API documentation, and the
/// frontend served out of `assets_dir` for every other path.
pub fn build_router(shared_data: Arc<SharedData>, assets_dir: impl AsRef<Path>) -> Router {
    let api_routes = Router::new()
        .merge(api::user::user_routes())
        .merge(api::task_list::task_list_routes())
        .merge(api::task::task_routes())
        .fallback(api::spa::api_not_found);

    let router = Router::new()
        .nest("/api", api_routes)
        .merge(api::swagger_main::build_documentation())
        .fallback_service(api::spa::spa_service(assets_dir))
        .with_state(shared_data);

    logging::attach_tracing_http(router)
}
