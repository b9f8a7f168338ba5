/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

//! KEYS pattern matching over the whole keyspace.

use super::glob::Glob;
use super::{Data, Store};

impl Store {
    /// Touches every key (so expired ones drop out first), then returns the
    /// lexicographically sorted list of keys matching `pattern`. The glob is
    /// compiled once, not per candidate key.
    pub fn keys(&self, pattern: &[u8]) -> Vec<Data> {
        let mut inner = self.inner.lock();
        let all: Vec<Data> = inner.table.keys().cloned().collect();
        inner.touch_all(all.iter().map(|k| k.as_bytes()));
        let glob = Glob::compile(pattern);
        let mut out: Vec<Data> = inner
            .table
            .keys()
            .filter(|k| glob.matches(k.as_bytes()))
            .cloned()
            .collect();
        out.sort();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_question_mark() {
        let s = Store::new();
        s.set(&Data::from("abc"), &Data::from("1"), None).unwrap();
        s.set(&Data::from("axc"), &Data::from("1"), None).unwrap();
        s.set(&Data::from("az"), &Data::from("1"), None).unwrap();
        let mut r = s.keys(b"a?c");
        r.sort();
        assert_eq!(r, vec![Data::from("abc"), Data::from("axc")]);
    }

    #[test]
    fn glob_class() {
        let s = Store::new();
        s.set(&Data::from("abb"), &Data::from("1"), None).unwrap();
        s.set(&Data::from("abc"), &Data::from("1"), None).unwrap();
        s.set(&Data::from("abz"), &Data::from("1"), None).unwrap();
        let mut r = s.keys(b"ab[bc]");
        r.sort();
        assert_eq!(r, vec![Data::from("abb"), Data::from("abc")]);
    }

    #[test]
    fn keys_are_sorted() {
        let s = Store::new();
        s.set(&Data::from("z"), &Data::from("1"), None).unwrap();
        s.set(&Data::from("a"), &Data::from("1"), None).unwrap();
        assert_eq!(s.keys(b"*"), vec![Data::from("a"), Data::from("z")]);
    }
}
