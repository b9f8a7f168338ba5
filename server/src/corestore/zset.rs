/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

//! Sorted-set storage: a member->score map for O(1) score lookup plus a
//! `(score, member)` ordered index keeping iteration in rank order. Rank
//! and rank-range lookups walk the index (`BTreeSet` has no order-statistics
//! support in std), while insert/remove/score stay O(log n) and O(1).

use super::data::Data;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// A total-ordering wrapper around `f64`, using `f64::total_cmp` so NaN
/// (which a client can never actually insert, see below) still has a
/// well-defined place rather than panicking the `BTreeSet`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score(pub f64);

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Default, Clone)]
pub struct ZSet {
    scores: HashMap<Data, Score>,
    index: BTreeSet<(Score, Data)>,
}

impl ZSet {
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn score(&self, member: &[u8]) -> Option<f64> {
        self.scores.get(member).map(|s| s.0)
    }

    /// Inserts or updates `member`'s score. Returns `true` if the member
    /// was newly added (as opposed to an existing member being re-scored).
    pub fn insert(&mut self, member: Data, score: f64) -> bool {
        let new = match self.scores.insert(member.clone(), Score(score)) {
            Some(old) => {
                self.index.remove(&(old, member.clone()));
                false
            }
            None => true,
        };
        self.index.insert((Score(score), member));
        new
    }

    pub fn remove(&mut self, member: &[u8]) -> bool {
        if let Some((_, score)) = self.scores.remove_entry(member) {
            self.index.remove(&(score, Data::from(member)));
            true
        } else {
            false
        }
    }

    /// 0-based rank in ascending score order, or `None` if the member is absent.
    pub fn rank(&self, member: &[u8]) -> Option<usize> {
        let score = *self.scores.get(member)?;
        let key = (score, Data::from(member));
        self.index.iter().position(|e| e == &key)
    }

    /// Members and scores with rank in `[start, stop]` inclusive, Redis-style
    /// negative indices counting from the end (-1 is the highest ranked).
    pub fn range(&self, start: i64, stop: i64) -> Vec<(Data, f64)> {
        let len = self.index.len() as i64;
        if len == 0 {
            return Vec::new();
        }
        let norm = |i: i64| -> i64 {
            if i < 0 {
                (len + i).max(0)
            } else {
                i
            }
        };
        let start = norm(start).max(0);
        let stop = norm(stop).min(len - 1);
        if start > stop || start >= len {
            return Vec::new();
        }
        self.index
            .iter()
            .skip(start as usize)
            .take((stop - start + 1) as usize)
            .map(|(s, m)| (m.clone(), s.0))
            .collect()
    }
}
