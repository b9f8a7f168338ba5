/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

/// Like the teacher's accept-loop guard: run an expression that yields a
/// `Result`, and on `Err` log it and `continue` the enclosing loop instead
/// of propagating (used so one bad peer can't take the whole listener down)
#[macro_export]
macro_rules! skip_loop_err {
    ($e:expr) => {
        match $e {
            Ok(v) => v,
            Err(e) => {
                log::warn!("accept loop error: {e}");
                continue;
            }
        }
    };
}
