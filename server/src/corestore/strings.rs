/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

//! GET/SET/MGET/MSET and the INCR/DECR family.

use super::{saturating_deadline, Data, Store, Value};
use crate::actions::{ActionError, ActionResult};
use std::time::{Duration, Instant};

/// An expiry option attached to `SET`, already parsed and validated for
/// syntax (duplicate/unknown options) by the dispatcher; `Store::set` still
/// checks the numeric value itself (`s <= 0` is `invalidExpireTime`).
#[derive(Debug, Clone, Copy)]
pub enum Expire {
    Seconds(i64),
    Millis(i64),
}

/// Which direction [`Store::incrby`] moves the stored integer. Keeping the
/// raw, non-negated amount alongside the operation (rather than negating it
/// up front for DECR/DECRBY) means overflow is judged on the real `old ± n`
/// result — negating `i64::MIN` first would overflow even when the actual
/// subtraction wouldn't.
#[derive(Debug, Clone, Copy)]
pub enum Op {
    Add,
    Sub,
}

impl Store {
    pub fn get(&self, key: &Data) -> ActionResult<Option<Data>> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        match inner.table.get(key.as_bytes()) {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s.clone())),
            Some(_) => Err(ActionError::WrongType),
        }
    }

    pub fn set(&self, key: &Data, value: &Data, expire: Option<Expire>) -> ActionResult<()> {
        let deadline = match expire {
            Some(Expire::Seconds(s)) if s <= 0 => return Err(ActionError::InvalidExpireTime),
            Some(Expire::Millis(ms)) if ms <= 0 => return Err(ActionError::InvalidExpireTime),
            Some(Expire::Seconds(s)) => {
                Some(saturating_deadline(Instant::now(), Duration::from_secs(s as u64)))
            }
            Some(Expire::Millis(ms)) => {
                Some(saturating_deadline(Instant::now(), Duration::from_millis(ms as u64)))
            }
            None => None,
        };
        let mut inner = self.inner.lock();
        inner.touch(key);
        inner.remove_all(key);
        inner.table.insert(key.clone(), Value::Str(value.clone()));
        if let Some(deadline) = deadline {
            inner.set_expiry(key, deadline);
        }
        Ok(())
    }

    pub fn mset(&self, pairs: &[(Data, Data)]) -> ActionResult<()> {
        let mut inner = self.inner.lock();
        for (k, v) in pairs {
            inner.touch(k);
            inner.remove_all(k);
            inner.table.insert(k.clone(), Value::Str(v.clone()));
        }
        Ok(())
    }

    pub fn mget(&self, keys: &[Data]) -> ActionResult<Vec<Option<Data>>> {
        let mut inner = self.inner.lock();
        let mut out = Vec::with_capacity(keys.len());
        for k in keys {
            inner.touch(k);
            out.push(match inner.table.get(k.as_bytes()) {
                Some(Value::Str(s)) => Some(s.clone()),
                _ => None,
            });
        }
        Ok(out)
    }

    /// Shared implementation of INCR/DECR/INCRBY/DECRBY. `amount` is always
    /// the non-negated magnitude from the wire; `op` says whether it's added
    /// or subtracted, so overflow is checked against the real `old ± n`.
    pub fn incrby(&self, key: &Data, op: Op, amount: i64) -> ActionResult<i64> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        let current = match inner.table.get(key.as_bytes()) {
            None => 0i64,
            Some(Value::Str(s)) => parse_i64(s.as_bytes()).ok_or(ActionError::NonInteger)?,
            Some(_) => return Err(ActionError::WrongType),
        };
        let new = match op {
            Op::Add => current.checked_add(amount),
            Op::Sub => current.checked_sub(amount),
        }
        .ok_or(ActionError::NonInteger)?;
        inner
            .table
            .insert(key.clone(), Value::Str(Data::from(new.to_string().into_bytes())));
        Ok(new)
    }
}

fn parse_i64(bytes: &[u8]) -> Option<i64> {
    std::str::from_utf8(bytes).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get() {
        let s = Store::new();
        s.set(&Data::from("k"), &Data::from("v"), None).unwrap();
        assert_eq!(s.get(&Data::from("k")).unwrap(), Some(Data::from("v")));
    }

    #[test]
    fn get_on_absent_is_null() {
        let s = Store::new();
        assert_eq!(s.get(&Data::from("nope")).unwrap(), None);
    }

    #[test]
    fn set_clears_expiry() {
        let s = Store::new();
        s.set(&Data::from("k"), &Data::from("v"), Some(Expire::Seconds(10)))
            .unwrap();
        s.set(&Data::from("k"), &Data::from("v2"), None).unwrap();
        assert_eq!(s.ttl(&Data::from("k")).unwrap(), -1);
    }

    #[test]
    fn negative_expire_rejected() {
        let s = Store::new();
        let err = s
            .set(&Data::from("k"), &Data::from("v"), Some(Expire::Seconds(0)))
            .unwrap_err();
        assert_eq!(err, ActionError::InvalidExpireTime);
    }

    #[test]
    fn incr_from_absent() {
        let s = Store::new();
        assert_eq!(s.incrby(&Data::from("n"), Op::Add, 1).unwrap(), 1);
    }

    #[test]
    fn incr_on_non_integer() {
        let s = Store::new();
        s.set(&Data::from("n"), &Data::from("abc"), None).unwrap();
        assert_eq!(
            s.incrby(&Data::from("n"), Op::Add, 1).unwrap_err(),
            ActionError::NonInteger
        );
    }

    #[test]
    fn incr_overflow_is_non_integer() {
        let s = Store::new();
        s.set(&Data::from("n"), &Data::from(i64::MAX.to_string().as_str()), None)
            .unwrap();
        assert_eq!(
            s.incrby(&Data::from("n"), Op::Add, 1).unwrap_err(),
            ActionError::NonInteger
        );
    }

    #[test]
    fn decrby_i64_min_does_not_overflow_when_result_fits() {
        let s = Store::new();
        s.set(&Data::from("n"), &Data::from("-1"), None).unwrap();
        // old=-1, amount=i64::MIN, Sub => -1 - i64::MIN == i64::MAX, which fits
        // even though negating i64::MIN up front would have overflowed.
        assert_eq!(
            s.incrby(&Data::from("n"), Op::Sub, i64::MIN).unwrap(),
            i64::MAX
        );
    }

    #[test]
    fn type_conflict_on_get() {
        let s = Store::new();
        s.lpush(&Data::from("x"), &[Data::from("a")]).unwrap();
        assert_eq!(s.get(&Data::from("x")).unwrap_err(), ActionError::WrongType);
    }
}
