/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

//! LPUSH/RPUSH/LLEN/LRANGE. Lists are `VecDeque<Data>` with index 0 as head.

use super::{Data, Store, Value};
use crate::actions::{ActionError, ActionResult};
use std::collections::VecDeque;

impl Store {
    pub fn lpush(&self, key: &Data, values: &[Data]) -> ActionResult<i64> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        let entry = inner
            .table
            .entry(key.clone())
            .or_insert_with(|| Value::List(VecDeque::new()));
        let list = match entry {
            Value::List(l) => l,
            _ => return Err(ActionError::WrongType),
        };
        for v in values {
            list.push_front(v.clone());
        }
        Ok(list.len() as i64)
    }

    pub fn rpush(&self, key: &Data, values: &[Data]) -> ActionResult<i64> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        let entry = inner
            .table
            .entry(key.clone())
            .or_insert_with(|| Value::List(VecDeque::new()));
        let list = match entry {
            Value::List(l) => l,
            _ => return Err(ActionError::WrongType),
        };
        for v in values {
            list.push_back(v.clone());
        }
        Ok(list.len() as i64)
    }

    pub fn llen(&self, key: &Data) -> ActionResult<i64> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        match inner.table.get(key.as_bytes()) {
            None => Ok(0),
            Some(Value::List(l)) => Ok(l.len() as i64),
            Some(_) => Err(ActionError::WrongType),
        }
    }

    pub fn lrange(&self, key: &Data, start: i64, stop: i64) -> ActionResult<Vec<Data>> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        let list = match inner.table.get(key.as_bytes()) {
            None => return Ok(Vec::new()),
            Some(Value::List(l)) => l,
            Some(_) => return Err(ActionError::WrongType),
        };
        Ok(normalize_range(list.len(), start, stop)
            .map(|(s, e)| list.iter().skip(s).take(e - s + 1).cloned().collect())
            .unwrap_or_default())
    }
}

/// Shared Redis-style index normalization used by LRANGE and ZRANGE:
/// negative indices count from the end, then clamp into bounds. Returns
/// `None` when the resulting range is empty.
pub fn normalize_range(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let len_i = len as i64;
    let norm = |i: i64| if i < 0 { (len_i + i).max(0) } else { i };
    let start = norm(start).max(0);
    let stop = norm(stop).min(len_i - 1);
    if start > stop || start >= len_i {
        None
    } else {
        Some((start as usize, stop as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lpush_prepends() {
        let s = Store::new();
        s.rpush(&Data::from("k"), &[Data::from("a"), Data::from("b")]).unwrap();
        s.lpush(&Data::from("k"), &[Data::from("z")]).unwrap();
        let all = s.lrange(&Data::from("k"), 0, -1).unwrap();
        assert_eq!(all, vec![Data::from("z"), Data::from("a"), Data::from("b")]);
    }

    #[test]
    fn llen_absent_is_zero() {
        let s = Store::new();
        assert_eq!(s.llen(&Data::from("nope")).unwrap(), 0);
    }

    #[test]
    fn lrange_out_of_bounds_empty() {
        let s = Store::new();
        s.rpush(&Data::from("k"), &[Data::from("a")]).unwrap();
        assert_eq!(s.lrange(&Data::from("k"), 5, 10).unwrap(), Vec::<Data>::new());
    }

    #[test]
    fn wrong_type_on_list_op() {
        let s = Store::new();
        s.set(&Data::from("k"), &Data::from("v"), None).unwrap();
        assert_eq!(s.lpush(&Data::from("k"), &[Data::from("a")]).unwrap_err(), ActionError::WrongType);
    }
}
