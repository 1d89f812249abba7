// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use std::collections::BTreeMap;

use crate::broad::{BroadPair, BroadPhase};
use crate::types::aabb::Aabb;

/// A minimal broad phase that tests every pair of boxes.
///
/// Kept as the reference the sweep-and-prune is checked against: same pair
/// identity, same ordering, same inclusive face semantics, no incremental
/// state to get wrong.
#[derive(Debug, Default)]
pub struct AllPairs {
    items: BTreeMap<u64, Aabb>,
}

impl AllPairs {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self { items: BTreeMap::new() }
    }

    /// Number of tracked boxes.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl BroadPhase for AllPairs {
    fn upsert(&mut self, id: u64, aabb: Aabb) {
        self.items.insert(id, aabb);
    }

    fn remove(&mut self, id: u64) {
        self.items.remove(&id);
    }

    fn pairs(&self) -> Vec<BroadPair> {
        let items: Vec<(u64, Aabb)> = self.items.iter().map(|(id, bb)| (*id, *bb)).collect();
        let mut out = Vec::new();
        for (i, (a_id, a_bb)) in items.iter().enumerate() {
            for (b_id, b_bb) in items.iter().skip(i + 1) {
                if a_bb.overlaps(b_bb) {
                    // BTreeMap order already yields a_id < b_id.
                    out.push(BroadPair::new(*a_id, *b_id));
                }
            }
        }
        out
    }
}
