/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

//! SADD/SMEMBERS/SISMEMBER/SREM/SCARD/SINTER/SUNION.

use super::{Data, Store, Value};
use crate::actions::{ActionError, ActionResult};
use std::collections::HashSet;

impl Store {
    pub fn sadd(&self, key: &Data, members: &[Data]) -> ActionResult<i64> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        let entry = inner
            .table
            .entry(key.clone())
            .or_insert_with(|| Value::Set(HashSet::new()));
        let set = match entry {
            Value::Set(s) => s,
            _ => return Err(ActionError::WrongType),
        };
        let mut n = 0i64;
        for m in members {
            if set.insert(m.clone()) {
                n += 1;
            }
        }
        Ok(n)
    }

    pub fn smembers(&self, key: &Data) -> ActionResult<Vec<Data>> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        match inner.table.get(key.as_bytes()) {
            None => Ok(Vec::new()),
            Some(Value::Set(s)) => Ok(s.iter().cloned().collect()),
            Some(_) => Err(ActionError::WrongType),
        }
    }

    pub fn sismember(&self, key: &Data, member: &Data) -> ActionResult<i64> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        match inner.table.get(key.as_bytes()) {
            None => Ok(0),
            Some(Value::Set(s)) => Ok(s.contains(member.as_bytes()) as i64),
            Some(_) => Err(ActionError::WrongType),
        }
    }

    pub fn srem(&self, key: &Data, members: &[Data]) -> ActionResult<i64> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        let set = match inner.table.get_mut(key.as_bytes()) {
            None => return Ok(0),
            Some(Value::Set(s)) => s,
            Some(_) => return Err(ActionError::WrongType),
        };
        let mut n = 0i64;
        for m in members {
            if set.remove(m.as_bytes()) {
                n += 1;
            }
        }
        if set.is_empty() {
            inner.table.remove(key.as_bytes());
        }
        Ok(n)
    }

    pub fn scard(&self, key: &Data) -> ActionResult<i64> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        match inner.table.get(key.as_bytes()) {
            None => Ok(0),
            Some(Value::Set(s)) => Ok(s.len() as i64),
            Some(_) => Err(ActionError::WrongType),
        }
    }

    pub fn sinter(&self, keys: &[Data]) -> ActionResult<Vec<Data>> {
        let mut inner = self.inner.lock();
        inner.touch_all(keys.iter().map(|k| k.as_bytes()));
        // Scan every key before deciding anything: a wrong-type key later in
        // the list must still fail the whole command even if an earlier key
        // was absent, so absence alone can't short-circuit the loop.
        let mut sets = Vec::with_capacity(keys.len());
        let mut any_absent = false;
        for k in keys {
            match inner.table.get(k.as_bytes()) {
                None => any_absent = true,
                Some(Value::Set(s)) => sets.push(s),
                Some(_) => return Err(ActionError::WrongType),
            }
        }
        if any_absent {
            return Ok(Vec::new());
        }
        let Some((first, rest)) = sets.split_first() else {
            return Ok(Vec::new());
        };
        Ok(first
            .iter()
            .filter(|m| rest.iter().all(|s| s.contains(m.as_bytes())))
            .cloned()
            .collect())
    }

    pub fn sunion(&self, keys: &[Data]) -> ActionResult<Vec<Data>> {
        let mut inner = self.inner.lock();
        inner.touch_all(keys.iter().map(|k| k.as_bytes()));
        let mut out: HashSet<Data> = HashSet::new();
        for k in keys {
            match inner.table.get(k.as_bytes()) {
                None => {}
                Some(Value::Set(s)) => out.extend(s.iter().cloned()),
                Some(_) => return Err(ActionError::WrongType),
            }
        }
        Ok(out.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sadd_counts_new_only() {
        let s = Store::new();
        assert_eq!(s.sadd(&Data::from("k"), &[Data::from("a"), Data::from("a")]).unwrap(), 1);
        assert_eq!(s.sadd(&Data::from("k"), &[Data::from("a"), Data::from("b")]).unwrap(), 1);
    }

    #[test]
    fn sinter_empty_when_key_absent() {
        let s = Store::new();
        s.sadd(&Data::from("a"), &[Data::from("x")]).unwrap();
        assert_eq!(s.sinter(&[Data::from("a"), Data::from("ghost")]).unwrap(), Vec::<Data>::new());
    }

    #[test]
    fn sinter_wrong_type_wins_over_absent_key_earlier_in_the_list() {
        let s = Store::new();
        s.set(&Data::from("s2"), &Data::from("v"), None).unwrap();
        assert_eq!(
            s.sinter(&[Data::from("ghost"), Data::from("s2")]).unwrap_err(),
            ActionError::WrongType
        );
    }

    #[test]
    fn sunion_ignores_absent() {
        let s = Store::new();
        s.sadd(&Data::from("a"), &[Data::from("x")]).unwrap();
        let mut u = s.sunion(&[Data::from("a"), Data::from("ghost")]).unwrap();
        u.sort();
        assert_eq!(u, vec![Data::from("x")]);
    }

    #[test]
    fn scard_matches_members_len() {
        let s = Store::new();
        s.sadd(&Data::from("k"), &[Data::from("a"), Data::from("b")]).unwrap();
        assert_eq!(s.scard(&Data::from("k")).unwrap() as usize, s.smembers(&Data::from("k")).unwrap().len());
    }
}
