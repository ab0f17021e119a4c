//! Serve command - run the HTTP API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::StoreSettings;
use crate::server;


/// Run the serve command.
pub fn run(settings: &StoreSettings, bind: SocketAddr) -> Result<()> {
    let store = Arc::new(settings.open_store());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    println!("\x1b[1m\x1b[36mPomo Tracker API\x1b[0m");
    println!("Listening on http://{}", bind);
    println!("Data: {} ({})", settings.data_path.display(), store.kind());
    println!("\x1b[2mPress Ctrl+C to stop.\x1b[0m\n");

    runtime.block_on(server::serve(store, bind))
}
