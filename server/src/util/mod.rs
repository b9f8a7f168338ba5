/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

//! Small cross-cutting utilities shared by the rest of the crate

#[macro_use]
mod macros;
pub mod compiler;
pub mod error;
#[cfg(test)]
pub mod test_utils;
