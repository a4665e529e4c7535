use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Extension, Router,
};
use config::{Config, Environment, File};
use resources::config::MonitorConfig;
use tokio::sync::mpsc;

mod aggregate;
mod collector;
mod handler;
mod poller;
mod prometheus;
mod render;
mod state;

use state::DashboardState;

pub struct AppState {
    config: MonitorConfig,
    state: RwLock<DashboardState>,
    refresh_tx: mpsc::Sender<()>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // read config
    let config = Config::builder()
        .add_source(File::with_name("/etc/gpu-dashboard/config.yaml").required(false))
        .add_source(Environment::default())
        .build()?
        .try_deserialize::<MonitorConfig>()
        .with_context(|| "Failed to parse config".to_string())?;

    // init tracing
    std::env::set_var("RUST_LOG", format!("dashboard={}", config.log_level));
    tracing_subscriber::fmt::init();

    // init app state
    let (refresh_tx, refresh_rx) = mpsc::channel::<()>(16);
    let shared_state = Arc::new(AppState {
        config: config.clone(),
        state: RwLock::new(DashboardState::new()),
        refresh_tx,
    });

    let poller = poller::Poller::new(shared_state.clone(), refresh_rx);
    tokio::spawn(async move { poller.run().await });

    let app = Router::new()
        .route("/", get(handler::page::dashboard))
        .route("/api/v1/nodes", get(handler::node::list))
        .route("/api/v1/pods", get(handler::pod::list))
        .route("/api/v1/hardware", get(handler::hardware::list))
        .route("/api/v1/status", get(handler::status::get))
        .route("/api/v1/refresh", post(handler::status::refresh))
        .layer(Extension(shared_state));

    let addr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Failed to parse listen address {}", config.listen_addr))?;
    tracing::info!("Listening at {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown())
        .await?;

    Ok(())
}

async fn shutdown() {
    tokio::signal::ctrl_c()
        .await
        .expect("expect tokio signal ctrl-c");
    tracing::info!("Shutting Down");
}
