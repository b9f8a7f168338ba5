/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

//! The typed key/value engine. A single [`Store`] instance is shared by
//! every connection; all state lives behind one coarse lock so that
//! multi-table operations (DEL, MGET, SINTER, KEYS) are linearizable
//! without any cross-table coordination protocol.

pub mod data;
pub mod glob;
pub mod zset;

mod hashes;
mod keys;
mod lists;
mod sets;
mod sortedsets;
pub mod strings;

pub use data::Data;

use crate::actions::ActionResult;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};
use zset::ZSet;

/// Computes `now + dur` without panicking when the sum would overflow the
/// monotonic clock's representable range (a client can ask for `EXPIRE k
/// 9223372036854775807`). Halves `dur` until the addition fits rather than
/// picking an arbitrary cap, so the deadline is still as far out as the
/// clock can represent.
pub(crate) fn saturating_deadline(now: Instant, mut dur: Duration) -> Instant {
    loop {
        if let Some(deadline) = now.checked_add(dur) {
            return deadline;
        }
        dur /= 2;
        if dur == Duration::ZERO {
            return now;
        }
    }
}

/// A key's value, tagged by family. Folding all five families into one enum
/// (rather than five parallel tables) makes type-exclusivity (I1) a
/// structural property of the map instead of something each command has to
/// maintain by hand: a key can only ever be bound to one `Value` variant.
#[derive(Debug, Clone)]
pub enum Value {
    Str(Data),
    List(VecDeque<Data>),
    Hash(HashMap<Data, Data>),
    Set(HashSet<Data>),
    ZSet(ZSet),
}

impl Value {
    fn kind_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Hash(_) => "hash",
            Self::Set(_) => "set",
            Self::ZSet(_) => "zset",
        }
    }
}

#[derive(Default)]
struct Inner {
    table: HashMap<Data, Value>,
    expiry: HashMap<Data, Instant>,
}

impl Inner {
    /// Removes `key` and any expiry entry if its deadline has passed.
    /// Must run before any other lookup of `key` within the same operation.
    fn touch(&mut self, key: &[u8]) {
        let expired = self
            .expiry
            .get(key)
            .is_some_and(|deadline| *deadline <= Instant::now());
        if crate::util::compiler::unlikely(expired) {
            self.expiry.remove(key);
            self.table.remove(key);
        }
    }

    fn touch_all<'a>(&mut self, keys: impl Iterator<Item = &'a [u8]>) {
        for k in keys {
            self.touch(k);
        }
    }

    fn remove_all(&mut self, key: &[u8]) -> bool {
        self.expiry.remove(key);
        self.table.remove(key).is_some()
    }

    fn set_expiry(&mut self, key: &Data, deadline: Instant) {
        self.expiry.insert(key.clone(), deadline);
    }
}

/// A single shared, mutex-guarded instance of this type backs every
/// connection in the process. Every public method here is atomic: it takes
/// the lock once, does all its work, and releases it, so composite
/// operations like SINTER or KEYS never observe a torn state.
pub struct Store {
    inner: Mutex<Inner>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    /// `DEL k+`: touch each key, then remove it from whichever table (if
    /// any) holds it. Returns the number of keys actually removed.
    pub fn del(&self, keys: &[Data]) -> ActionResult<i64> {
        let mut inner = self.inner.lock();
        let mut n = 0i64;
        for k in keys {
            inner.touch(k);
            if inner.remove_all(k) {
                n += 1;
            }
        }
        Ok(n)
    }

    /// `EXISTS k+`: touch each key, count how many are present, including
    /// repeats of the same key in the argument list.
    pub fn exists(&self, keys: &[Data]) -> ActionResult<i64> {
        let mut inner = self.inner.lock();
        let mut n = 0i64;
        for k in keys {
            inner.touch(k);
            if inner.table.contains_key(k.as_bytes()) {
                n += 1;
            }
        }
        Ok(n)
    }

    /// `EXPIRE k s`: absent key returns 0; `s <= 0` deletes the key and
    /// returns 1; otherwise sets a new deadline and returns 1.
    pub fn expire(&self, key: &Data, seconds: i64) -> ActionResult<i64> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        if !inner.table.contains_key(key.as_bytes()) {
            return Ok(0);
        }
        if seconds <= 0 {
            inner.remove_all(key);
        } else {
            let deadline = saturating_deadline(Instant::now(), Duration::from_secs(seconds as u64));
            inner.set_expiry(key, deadline);
        }
        Ok(1)
    }

    /// `TTL k`: -2 absent, -1 no deadline, else remaining whole seconds.
    pub fn ttl(&self, key: &Data) -> ActionResult<i64> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        if !inner.table.contains_key(key.as_bytes()) {
            return Ok(-2);
        }
        match inner.expiry.get(key.as_bytes()) {
            None => Ok(-1),
            Some(deadline) => {
                let now = Instant::now();
                let remaining = deadline.saturating_duration_since(now);
                Ok(remaining.as_secs() as i64)
            }
        }
    }
}
