/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

//! Utilities for terminal I/O, used by the startup banner

use std::fmt;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

pub fn write_with_col<T: fmt::Display>(item: T, color: Option<Color>) -> fmt::Result {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    if stdout.set_color(ColorSpec::new().set_fg(color)).is_err() {
        return Err(fmt::Error);
    }
    if write!(&mut stdout, "{}", item).is_err() {
        return Err(fmt::Error);
    }
    if stdout.reset().is_err() {
        return Err(fmt::Error);
    }
    Ok(())
}

pub fn write_info<T: fmt::Display>(item: T) -> fmt::Result {
    write_with_col(item, Some(Color::Cyan))
}

pub fn write_error<T: fmt::Display>(item: T) -> fmt::Result {
    write_with_col(item, Some(Color::Red))
}
