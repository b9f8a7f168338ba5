/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

//! Connection lifecycle and the accept loop. The codec and the store don't
//! know this module exists; it exists only to turn bytes-in-flight into
//! [`Dispatcher`](crate::dispatcher::Dispatcher) calls and back.

mod connection;
mod listener;
mod tcp;

use crate::corestore::Store;
use connection::Connection;
use std::cell::Cell;
use std::io::Result as IoResult;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, Semaphore};
use tokio::time;

pub use listener::connect;
pub use tcp::RawListener;

/// An exponential backoff used by the accept loop: on a run of accept
/// errors it waits longer between retries, up to a point, then gives up
/// and tears the listener down rather than spinning forever.
struct NetBackoff {
    c: Cell<u8>,
}

impl NetBackoff {
    const MAX_BACKOFF: u8 = 64;

    const fn new() -> Self {
        Self { c: Cell::new(1) }
    }

    async fn spin(&self) {
        time::sleep(Duration::from_secs(self.c.get() as u64)).await;
        self.c.set(self.c.get().saturating_mul(2));
    }

    fn should_disconnect(&self) -> bool {
        self.c.get() > Self::MAX_BACKOFF
    }
}

/// Owns one accepted socket. Runs until the peer disconnects, QUIT asks for
/// closure, or a shutdown signal arrives. A protocol error only resets the
/// dispatcher's buffer and replies with an error; it never closes this
/// connection on its own.
struct ConnectionHandler {
    db: Arc<Store>,
    con: Connection<TcpStream>,
    climit: Arc<Semaphore>,
    termination_signal: broadcast::Receiver<()>,
    _term_sig_tx: mpsc::Sender<()>,
}

impl ConnectionHandler {
    fn new(
        db: Arc<Store>,
        stream: TcpStream,
        climit: Arc<Semaphore>,
        termination_signal: broadcast::Receiver<()>,
        _term_sig_tx: mpsc::Sender<()>,
    ) -> Self {
        Self {
            db,
            con: Connection::new(stream),
            climit,
            termination_signal,
            _term_sig_tx,
        }
    }

    async fn run(&mut self) -> IoResult<()> {
        loop {
            let outcome = tokio::select! {
                outcome = self.con.turn(&self.db) => outcome,
                _ = self.termination_signal.recv() => return Ok(()),
            };
            match outcome? {
                connection::ReadOutcome::Continue => {}
                connection::ReadOutcome::Disconnected => return Ok(()),
            }
        }
    }
}

impl Drop for ConnectionHandler {
    fn drop(&mut self) {
        // Always give the permit back, including on panic unwind, so one
        // wedged connection can't shrink the admitted-connection pool.
        self.climit.add_permits(1);
    }
}

/// Runs the server until `shutdown` resolves, then drains in-flight
/// connections before returning.
pub async fn run(
    host: IpAddr,
    port: u16,
    max_connections: usize,
    db: Arc<Store>,
    shutdown: impl std::future::Future<Output = ()>,
) -> crate::util::error::SkyResult<()> {
    let (signal, _) = broadcast::channel(1);
    let base = connect(host, port, max_connections, db, signal.clone()).await?;
    let mut listener = RawListener::new(base);
    tokio::select! {
        res = listener.run() => {
            if let Err(e) = res {
                log::error!("listener stopped with error: {e}");
            }
        }
        _ = shutdown => {
            log::info!("received shutdown signal, stopping accept loop");
        }
    }
    let _ = signal.send(());
    listener.base.release_self().await;
    Ok(())
}
