/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

//! The accept loop: pulls one permit from the admission-control semaphore
//! per spawned connection, backs off on repeated accept errors instead of
//! taking the whole listener down.

use super::listener::BaseListener;
use super::{ConnectionHandler, NetBackoff};
use crate::skip_loop_err;
use std::io::Result as IoResult;
use tokio::net::TcpStream;

pub struct RawListener {
    pub base: BaseListener,
}

impl RawListener {
    pub fn new(base: BaseListener) -> Self {
        Self { base }
    }

    async fn accept(&mut self) -> IoResult<TcpStream> {
        let backoff = NetBackoff::new();
        loop {
            match self.base.listener.accept().await {
                Ok((stream, addr)) => {
                    log::debug!("accepted connection from {addr}");
                    return Ok(stream);
                }
                Err(e) => {
                    if backoff.should_disconnect() {
                        return Err(e);
                    }
                }
            }
            backoff.spin().await;
        }
    }

    pub async fn run(&mut self) -> IoResult<()> {
        loop {
            self.base.climit.acquire().await.unwrap().forget();
            let stream = skip_loop_err!(self.accept().await);
            let mut handler = ConnectionHandler::new(
                self.base.db.clone(),
                stream,
                self.base.climit.clone(),
                self.base.signal.subscribe(),
                self.base.terminate_tx.clone(),
            );
            tokio::spawn(async move {
                if let Err(e) = handler.run().await {
                    log::error!("connection error: {e}");
                }
            });
        }
    }
}
