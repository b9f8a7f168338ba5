/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

//! Per-connection I/O: reads chunks off the socket, feeds them to a
//! [`Dispatcher`], and writes back whatever replies it produced.

use crate::corestore::Store;
use crate::dispatcher::{Dispatcher, PostWrite};
use bytes::BytesMut;
use std::io::Result as IoResult;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Marker trait restricting [`Connection`] to stream types that make sense
/// for it; currently only [`TcpStream`] implements it.
pub trait BufferedSocketStream: AsyncReadExt + AsyncWriteExt + Unpin {}

impl BufferedSocketStream for TcpStream {}

pub struct Connection<C> {
    stream: C,
    dispatcher: Dispatcher,
    read_buf: BytesMut,
}

/// What happened while servicing one inbound read.
pub enum ReadOutcome {
    Continue,
    Disconnected,
}

impl<C: BufferedSocketStream> Connection<C> {
    pub fn new(stream: C) -> Self {
        Self {
            stream,
            dispatcher: Dispatcher::new(),
            read_buf: BytesMut::with_capacity(libsky::BUF_CAP),
        }
    }

    /// Reads one chunk from the socket, runs it through the dispatcher, and
    /// writes back any encoded replies. Returns `Disconnected` on EOF or
    /// when a drained command asks for closure — only QUIT does; a protocol
    /// error replies and resets the dispatcher's buffer but keeps the
    /// connection open.
    pub async fn turn(&mut self, db: &Store) -> IoResult<ReadOutcome> {
        self.read_buf.clear();
        self.read_buf.resize(libsky::BUF_CAP, 0);
        let n = self.stream.read(&mut self.read_buf).await?;
        if n == 0 {
            return Ok(ReadOutcome::Disconnected);
        }
        let mut out = BytesMut::new();
        let post = self.dispatcher.poll(&self.read_buf[..n], db, &mut out);
        if !out.is_empty() {
            self.stream.write_all(&out).await?;
            self.stream.flush().await?;
        }
        match post {
            PostWrite::Close => Ok(ReadOutcome::Disconnected),
            PostWrite::Continue => Ok(ReadOutcome::Continue),
        }
    }
}
