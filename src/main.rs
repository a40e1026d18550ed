use anyhow::Context;
use dotenv::dotenv;
use std::env;
use std::sync::Arc;
use task_board::{SharedData, app_env, build_router, hashing, logging, persistence};
use tokio::net::TcpListener;
use tracing::info;

fn env_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_owned())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv_loaded = dotenv().is_ok();

    logging::setup_logging_and_tracing(
        logging::init_env_filter()?,
        logging::exporters_from_env()?,
    );
    if !dotenv_loaded {
        info!("No .env file found, configuring from the environment only.");
    }

    let data_store_path = env_or_default(
        app_env::DATA_STORE_PATH,
        app_env::defaults::DATA_STORE_PATH,
    );
    let assets_dir = env_or_default(
        app_env::STATIC_ASSETS_DIR,
        app_env::defaults::STATIC_ASSETS_DIR,
    );
    let listen_address =
        env_or_default(app_env::LISTEN_ADDRESS, app_env::defaults::LISTEN_ADDRESS);

    let shared_data = Arc::new(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(&data_store_path),
        password_hasher: hashing::Argon2PasswordHasher::new(),
    });
    let router = build_router(shared_data, &assets_dir);

    let listener = TcpListener::bind(&listen_address)
        .await
        .with_context(|| format!("could not bind to {listen_address}"))?;
    info!(
        store = %data_store_path,
        assets = %assets_dir,
        "Listening on {listen_address}"
    );

    axum::serve(listener, router)
        .await
        .context("server terminated unexpectedly")
}
