/*
 * This file is part of minidb.
 *
 * Copyright (c) 2026 the minidb authors
 *
 * Licensed under the MIT License. See the LICENSE file in the
 * project root for the full license text.
 */

//! Test-only helpers shared by the property tests scattered across
//! `corestore` and `protocol`

use rand::{distributions::Alphanumeric, Rng};

pub fn random_bool(rng: &mut impl Rng) -> bool {
    rng.gen_bool(0.5)
}

pub fn random_string(rng: &mut impl Rng, l: usize) -> String {
    rng.sample_iter(Alphanumeric)
        .take(l)
        .map(char::from)
        .collect()
}
