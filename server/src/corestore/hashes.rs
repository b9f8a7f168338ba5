/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

//! HSET/HGET/HDEL/HEXISTS/HGETALL/HKEYS/HVALS/HLEN.

use super::{Data, Store, Value};
use crate::actions::{ActionError, ActionResult};
use std::collections::HashMap;

impl Store {
    pub fn hset(&self, key: &Data, field: &Data, value: &Data) -> ActionResult<i64> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        let entry = inner
            .table
            .entry(key.clone())
            .or_insert_with(|| Value::Hash(HashMap::new()));
        let hash = match entry {
            Value::Hash(h) => h,
            _ => return Err(ActionError::WrongType),
        };
        Ok(if hash.insert(field.clone(), value.clone()).is_none() {
            1
        } else {
            0
        })
    }

    pub fn hget(&self, key: &Data, field: &Data) -> ActionResult<Option<Data>> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        match inner.table.get(key.as_bytes()) {
            None => Ok(None),
            Some(Value::Hash(h)) => Ok(h.get(field.as_bytes()).cloned()),
            Some(_) => Err(ActionError::WrongType),
        }
    }

    pub fn hdel(&self, key: &Data, fields: &[Data]) -> ActionResult<i64> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        let hash = match inner.table.get_mut(key.as_bytes()) {
            None => return Ok(0),
            Some(Value::Hash(h)) => h,
            Some(_) => return Err(ActionError::WrongType),
        };
        let mut n = 0i64;
        for f in fields {
            if hash.remove(f.as_bytes()).is_some() {
                n += 1;
            }
        }
        if hash.is_empty() {
            inner.table.remove(key.as_bytes());
        }
        Ok(n)
    }

    pub fn hexists(&self, key: &Data, field: &Data) -> ActionResult<i64> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        match inner.table.get(key.as_bytes()) {
            None => Ok(0),
            Some(Value::Hash(h)) => Ok(h.contains_key(field.as_bytes()) as i64),
            Some(_) => Err(ActionError::WrongType),
        }
    }

    pub fn hgetall(&self, key: &Data) -> ActionResult<Vec<Data>> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        match inner.table.get(key.as_bytes()) {
            None => Ok(Vec::new()),
            Some(Value::Hash(h)) => {
                let mut out = Vec::with_capacity(h.len() * 2);
                for (f, v) in h {
                    out.push(f.clone());
                    out.push(v.clone());
                }
                Ok(out)
            }
            Some(_) => Err(ActionError::WrongType),
        }
    }

    pub fn hkeys(&self, key: &Data) -> ActionResult<Vec<Data>> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        match inner.table.get(key.as_bytes()) {
            None => Ok(Vec::new()),
            Some(Value::Hash(h)) => Ok(h.keys().cloned().collect()),
            Some(_) => Err(ActionError::WrongType),
        }
    }

    pub fn hvals(&self, key: &Data) -> ActionResult<Vec<Data>> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        match inner.table.get(key.as_bytes()) {
            None => Ok(Vec::new()),
            Some(Value::Hash(h)) => Ok(h.values().cloned().collect()),
            Some(_) => Err(ActionError::WrongType),
        }
    }

    pub fn hlen(&self, key: &Data) -> ActionResult<i64> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        match inner.table.get(key.as_bytes()) {
            None => Ok(0),
            Some(Value::Hash(h)) => Ok(h.len() as i64),
            Some(_) => Err(ActionError::WrongType),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hset_new_vs_update() {
        let s = Store::new();
        assert_eq!(s.hset(&Data::from("k"), &Data::from("f"), &Data::from("1")).unwrap(), 1);
        assert_eq!(s.hset(&Data::from("k"), &Data::from("f"), &Data::from("2")).unwrap(), 0);
        assert_eq!(s.hget(&Data::from("k"), &Data::from("f")).unwrap(), Some(Data::from("2")));
    }

    #[test]
    fn hgetall_interleaved() {
        let s = Store::new();
        s.hset(&Data::from("k"), &Data::from("f"), &Data::from("v")).unwrap();
        let flat = s.hgetall(&Data::from("k")).unwrap();
        assert_eq!(flat, vec![Data::from("f"), Data::from("v")]);
    }

    #[test]
    fn hdel_counts_removed() {
        let s = Store::new();
        s.hset(&Data::from("k"), &Data::from("a"), &Data::from("1")).unwrap();
        s.hset(&Data::from("k"), &Data::from("b"), &Data::from("2")).unwrap();
        assert_eq!(
            s.hdel(&Data::from("k"), &[Data::from("a"), Data::from("ghost")]).unwrap(),
            1
        );
    }
}
