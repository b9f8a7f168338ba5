/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

//! Command-level error taxonomy. These are distinct from [`crate::util::error::Error`]:
//! a `Store` method failing with one of these never tears down the connection
//! and never touches state, it just becomes an error reply.

use std::fmt;

pub type ActionResult<T> = Result<T, ActionError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    WrongType,
    NonInteger,
    NonFloat,
    SyntaxError,
    InvalidExpireTime,
    WrongArgs(String),
    UnknownCommand(String),
    ProtocolError(String),
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongType => write!(f, "ERR wrong type"),
            Self::NonInteger => write!(f, "ERR value is not an integer or out of range"),
            Self::NonFloat => write!(f, "ERR value is not a valid float"),
            Self::SyntaxError => write!(f, "ERR syntax error"),
            Self::InvalidExpireTime => write!(f, "ERR invalid expire time in set"),
            Self::WrongArgs(name) => {
                write!(f, "ERR wrong number of arguments for '{name}' command")
            }
            Self::UnknownCommand(name) => write!(f, "ERR unknown command '{name}'"),
            Self::ProtocolError(detail) => write!(f, "ERR {detail}"),
        }
    }
}

impl std::error::Error for ActionError {}
