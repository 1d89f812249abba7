// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Broad-phase interfaces, the incremental sweep-and-prune, and an
//! all-pairs reference implementation.
//!
//! Determinism contract (applies to every implementation here):
//! - Pair identity is canonicalized as `(min_id, max_id)`.
//! - The emitted pair list is strictly sorted lexicographically by that tuple.
//! - Overlap is inclusive on faces (touching AABBs are considered overlapping).

use crate::types::aabb::Aabb;

#[doc = "O(n²) all-pairs baseline used as a correctness oracle."]
pub mod all_pairs;
#[doc = "Incremental three-axis sweep-and-prune."]
pub mod sweep_prune;

/// Canonical unordered pair of owner ids (`a < b`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BroadPair {
    a: u64,
    b: u64,
}

impl BroadPair {
    /// Builds the canonical pair for two ids in any order.
    pub fn new(x: u64, y: u64) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    /// Smaller id.
    pub const fn a(&self) -> u64 {
        self.a
    }

    /// Larger id.
    pub const fn b(&self) -> u64 {
        self.b
    }

    /// Returns `true` if `id` is either member.
    pub const fn involves(&self, id: u64) -> bool {
        self.a == id || self.b == id
    }

    /// The member that is not `id`, if `id` belongs to the pair.
    pub const fn other(&self, id: u64) -> Option<u64> {
        if self.a == id {
            Some(self.b)
        } else if self.b == id {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Broad-phase interface for inserting proxies and querying overlapping pairs.
///
/// Implementations must return pairs deterministically: each pair is
/// canonicalized and the list is sorted ascending.
pub trait BroadPhase {
    /// Inserts or updates the single proxy owned by `id`.
    fn upsert(&mut self, id: u64, aabb: Aabb);
    /// Removes every proxy owned by `id`, if present.
    fn remove(&mut self, id: u64);
    /// Returns the canonical, sorted list of overlapping owner pairs.
    fn pairs(&self) -> Vec<BroadPair>;
}
