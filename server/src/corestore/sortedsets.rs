/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

//! ZADD/ZRANGE/ZRANK/ZREM/ZSCORE/ZCARD.

use super::{Data, Store, Value};
use crate::actions::{ActionError, ActionResult};
use crate::corestore::zset::ZSet;

impl Store {
    pub fn zadd(&self, key: &Data, pairs: &[(f64, Data)]) -> ActionResult<i64> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        let entry = inner
            .table
            .entry(key.clone())
            .or_insert_with(|| Value::ZSet(ZSet::default()));
        let zset = match entry {
            Value::ZSet(z) => z,
            _ => return Err(ActionError::WrongType),
        };
        let mut n = 0i64;
        for (score, member) in pairs {
            if zset.insert(member.clone(), *score) {
                n += 1;
            }
        }
        Ok(n)
    }

    pub fn zrange(&self, key: &Data, start: i64, stop: i64) -> ActionResult<Vec<(Data, f64)>> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        match inner.table.get(key.as_bytes()) {
            None => Ok(Vec::new()),
            Some(Value::ZSet(z)) => Ok(z.range(start, stop)),
            Some(_) => Err(ActionError::WrongType),
        }
    }

    pub fn zrank(&self, key: &Data, member: &Data) -> ActionResult<Option<i64>> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        match inner.table.get(key.as_bytes()) {
            None => Ok(None),
            Some(Value::ZSet(z)) => Ok(z.rank(member.as_bytes()).map(|r| r as i64)),
            Some(_) => Err(ActionError::WrongType),
        }
    }

    pub fn zrem(&self, key: &Data, members: &[Data]) -> ActionResult<i64> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        let zset = match inner.table.get_mut(key.as_bytes()) {
            None => return Ok(0),
            Some(Value::ZSet(z)) => z,
            Some(_) => return Err(ActionError::WrongType),
        };
        let mut n = 0i64;
        for m in members {
            if zset.remove(m.as_bytes()) {
                n += 1;
            }
        }
        if zset.is_empty() {
            inner.table.remove(key.as_bytes());
        }
        Ok(n)
    }

    pub fn zscore(&self, key: &Data, member: &Data) -> ActionResult<Option<f64>> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        match inner.table.get(key.as_bytes()) {
            None => Ok(None),
            Some(Value::ZSet(z)) => Ok(z.score(member.as_bytes())),
            Some(_) => Err(ActionError::WrongType),
        }
    }

    pub fn zcard(&self, key: &Data) -> ActionResult<i64> {
        let mut inner = self.inner.lock();
        inner.touch(key);
        match inner.table.get(key.as_bytes()) {
            None => Ok(0),
            Some(Value::ZSet(z)) => Ok(z.len() as i64),
            Some(_) => Err(ActionError::WrongType),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zadd_counts_new_members_only() {
        let s = Store::new();
        assert_eq!(s.zadd(&Data::from("lb"), &[(2.0, Data::from("bob")), (1.0, Data::from("alice"))]).unwrap(), 2);
        assert_eq!(s.zadd(&Data::from("lb"), &[(5.0, Data::from("bob"))]).unwrap(), 0);
    }

    #[test]
    fn zrange_orders_by_score_then_member() {
        let s = Store::new();
        s.zadd(&Data::from("lb"), &[(2.0, Data::from("bob")), (1.0, Data::from("alice"))]).unwrap();
        let r = s.zrange(&Data::from("lb"), 0, -1).unwrap();
        assert_eq!(r, vec![(Data::from("alice"), 1.0), (Data::from("bob"), 2.0)]);
    }

    #[test]
    fn zrank_of_absent_member_is_none() {
        let s = Store::new();
        s.zadd(&Data::from("lb"), &[(2.0, Data::from("bob"))]).unwrap();
        assert_eq!(s.zrank(&Data::from("lb"), &Data::from("ghost")).unwrap(), None);
    }

    #[test]
    fn ties_broken_by_member_order() {
        let s = Store::new();
        s.zadd(&Data::from("lb"), &[(1.0, Data::from("zed")), (1.0, Data::from("amy"))]).unwrap();
        let r = s.zrange(&Data::from("lb"), 0, -1).unwrap();
        assert_eq!(r[0].0, Data::from("amy"));
    }
}
