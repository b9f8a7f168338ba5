/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

//! The base TCP listener: owns the bound socket plus everything a
//! connection handler needs a clone/subscribe of to participate in graceful
//! shutdown and admission control.

use crate::corestore::Store;
use crate::util::error::{Error, SkyResult};
use std::net::IpAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc, Semaphore};

pub struct BaseListener {
    pub db: Arc<Store>,
    pub listener: TcpListener,
    pub climit: Arc<Semaphore>,
    pub signal: broadcast::Sender<()>,
    pub terminate_tx: mpsc::Sender<()>,
    pub terminate_rx: mpsc::Receiver<()>,
}

impl BaseListener {
    pub async fn init(
        db: Arc<Store>,
        host: IpAddr,
        port: u16,
        semaphore: Arc<Semaphore>,
        signal: broadcast::Sender<()>,
    ) -> SkyResult<Self> {
        let (terminate_tx, terminate_rx) = mpsc::channel(1);
        let listener = TcpListener::bind((host, port))
            .await
            .map_err(|e| Error::ioerror_extra(e, format!("binding to port {port}")))?;
        Ok(Self {
            db,
            listener,
            climit: semaphore,
            signal,
            terminate_tx,
            terminate_rx,
        })
    }

    /// Drops the sender halves this listener owns, then waits for every
    /// connection handler's cloned sender to drop too (signalling that
    /// in-flight work has drained) before returning.
    pub async fn release_self(self) {
        let Self {
            mut terminate_rx,
            terminate_tx,
            signal,
            ..
        } = self;
        drop(signal);
        drop(terminate_tx);
        let _ = terminate_rx.recv().await;
    }
}

/// Binds the listener for the configured host/port and wraps it with an
/// admission-control semaphore and a shutdown broadcaster.
pub async fn connect(
    host: IpAddr,
    port: u16,
    max_connections: usize,
    db: Arc<Store>,
    signal: broadcast::Sender<()>,
) -> SkyResult<BaseListener> {
    let climit = Arc::new(Semaphore::new(max_connections));
    let base = BaseListener::init(db, host, port, climit, signal).await?;
    log::info!("server started on {host}:{port}");
    Ok(base)
}
