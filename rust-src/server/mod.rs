//! HTTP surface over the record store.

mod handlers;
mod problem;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderName, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

use crate::storage::PomoStore;

use handlers::{
    get_month, healthcheck, home, increment_month, list_months, put_month, save_pomodoros, stats,
    years,
};


#[derive(Clone)]
pub struct AppState {
    store: Arc<PomoStore>,
}


impl AppState {
    pub fn new(store: Arc<PomoStore>) -> Self {
        Self { store }
    }
}


pub fn build_router(state: AppState) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .route("/", get(home))
        .route("/health", get(healthcheck))
        .route("/pomo", get(list_months))
        .route("/pomo/{year}/{month}", get(get_month).put(put_month))
        .route("/pomo/{year}/{month}/increment", post(increment_month))
        .route("/api/save-pomodoros", post(save_pomodoros))
        .route("/api/stats", get(stats))
        .route("/api/years", get(years))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS]),
        )
        .with_state(state)
}


/// Serve the API until Ctrl+C or SIGTERM.
pub async fn serve(store: Arc<PomoStore>, bind_addr: SocketAddr) -> Result<()> {
    let location = store.location().display().to_string();
    let backend = store.kind();
    let app = build_router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    info!(%bind_addr, %backend, data_path = %location, "pomo tracker API started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("pomo tracker API stopped");
    Ok(())
}


async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install ctrl+c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install sigterm handler");
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
}
