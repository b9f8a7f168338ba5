/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

//! # minidb
//!
//! A minimal in-memory key/value server. See the module tree for the codec,
//! the typed store, and the per-connection dispatcher that ties them
//! together; everything under `dbnet` and `config` is the server glue that
//! feeds bytes to that core.

mod actions;
mod config;
mod corestore;
mod dbnet;
mod dispatcher;
mod protocol;
mod util;

use config::Config;
use corestore::Store;
use libsky::{URL, VERSION};
use std::env;
use std::process;
use std::sync::Arc;
use tokio::signal;

fn main() {
    env_logger::Builder::new()
        .parse_filters(&env::var("MINIDB_LOG").unwrap_or_else(|_| "info".to_owned()))
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            log::error!("startup failure: {e}");
            process::exit(1);
        }
    };

    let _ = libsky::util::write_info(format!("minidb v{VERSION} | {URL}\n"));
    log::info!(
        "starting on {}:{} (max {} connections)",
        config.host,
        config.port,
        config.max_connections
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .thread_name("minidb-worker")
        .enable_all()
        .build()
        .expect("failed to start the tokio runtime");

    let db = Arc::new(Store::new());

    let result = runtime.block_on(dbnet::run(
        config.host,
        config.port,
        config.max_connections,
        db,
        shutdown_signal(),
    ));

    drop(runtime);

    match result {
        Ok(()) => {
            log::info!("shutdown complete");
        }
        Err(e) => {
            log::error!("fatal runtime error: {e}");
            process::exit(1);
        }
    }
}

/// Resolves once SIGINT or (on unix) SIGTERM is received, so [`dbnet::run`]
/// can stop accepting and drain in-flight connections.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
