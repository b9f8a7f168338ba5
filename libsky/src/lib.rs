/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

//! Shared utilities for the minidb workspace
//!
//! This crate holds the handful of things that don't belong to any one
//! layer of the server: the crate version string and the small terminal
//! color helpers used by the startup banner.

pub mod util;

use std::error::Error;

/// A generic result used at the edges of the process (startup, CLI)
pub type TResult<T> = Result<T, Box<dyn Error>>;

/// The size of the read buffer allocated for a new connection, in bytes
pub const BUF_CAP: usize = 4 * 1024;

/// The crate version, surfaced in startup logs
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A short description of the project used in the startup banner
pub const URL: &str = "https://example.invalid/minidb";
