// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;

use crate::broad::{BroadPair, BroadPhase};
use crate::error::SweepError;
use crate::math::Axis;
use crate::types::aabb::Aabb;

/// Identifier of one tracked sub-volume.
///
/// Allocated from a monotonically increasing counter and never reused, so a
/// stale id can never alias a live proxy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProxyId(u32);

impl ProxyId {
    /// Raw counter value.
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Set of axes on which a proxy pair's intervals overlap.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct AxisSet(u8);

impl AxisSet {
    /// No axes.
    pub const EMPTY: Self = Self(0);
    /// All three axes: the pair's boxes truly overlap.
    pub const FULL: Self = Self(0b111);

    const fn bit(axis: Axis) -> u8 {
        1 << axis.index()
    }

    /// Returns `true` if `axis` is present.
    pub const fn contains(self, axis: Axis) -> bool {
        self.0 & Self::bit(axis) != 0
    }

    /// Adds `axis`; returns `false` if it was already present.
    pub fn insert(&mut self, axis: Axis) -> bool {
        let was = self.contains(axis);
        self.0 |= Self::bit(axis);
        !was
    }

    /// Removes `axis`; returns `false` if it was absent.
    pub fn remove(&mut self, axis: Axis) -> bool {
        let was = self.contains(axis);
        self.0 &= !Self::bit(axis);
        was
    }

    /// Number of axes present.
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns `true` when no axis is present.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` when all three axes are present.
    pub const fn is_full(self) -> bool {
        self.0 == Self::FULL.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Bound {
    Min,
    Max,
}

impl Bound {
    const fn index(self) -> usize {
        match self {
            Self::Min => 0,
            Self::Max => 1,
        }
    }
}

#[derive(Debug, Copy, Clone)]
enum Direction {
    Down,
    Up,
}

#[derive(Debug, Copy, Clone)]
struct Endpoint {
    proxy: ProxyId,
    bound: Bound,
    value: f32,
}

impl Endpoint {
    /// Sort order: by value, and a min sorts before a max at equal value so
    /// touching intervals count as overlapping.
    fn precedes(&self, other: &Self) -> bool {
        self.value < other.value
            || (self.value == other.value && self.bound == Bound::Min && other.bound == Bound::Max)
    }
}

/// Position of a proxy's endpoints: `[axis][bound]`.
type Slots = [[usize; 2]; 3];

/// Per-pair overlap axes plus the subset of pairs overlapping on all three.
#[derive(Debug, Default)]
struct OverlapTable {
    axes: BTreeMap<(ProxyId, ProxyId), AxisSet>,
    full: BTreeSet<(ProxyId, ProxyId)>,
}

impl OverlapTable {
    fn get(&self, key: &(ProxyId, ProxyId)) -> AxisSet {
        self.axes.get(key).copied().unwrap_or(AxisSet::EMPTY)
    }

    fn begin(&mut self, key: (ProxyId, ProxyId), axis: Axis) {
        let set = self.axes.entry(key).or_default();
        let inserted = set.insert(axis);
        debug_assert!(inserted, "{axis:?} already overlapping for {key:?}");
        if set.is_full() {
            self.full.insert(key);
        }
    }

    fn end(&mut self, key: (ProxyId, ProxyId), axis: Axis) {
        self.full.remove(&key);
        let removed = self.axes.get_mut(&key).is_some_and(|set| set.remove(axis));
        debug_assert!(removed, "{axis:?} was not overlapping for {key:?}");
        if self.axes.get(&key).is_some_and(|set| set.is_empty()) {
            self.axes.remove(&key);
        }
    }

    fn purge(&mut self, proxies: &[ProxyId]) {
        let keep = |(a, b): &(ProxyId, ProxyId)| !proxies.contains(a) && !proxies.contains(b);
        self.axes.retain(|key, _| keep(key));
        self.full.retain(keep);
    }
}

/// Incremental sweep-and-prune over three sorted endpoint lists.
///
/// Each tracked proxy contributes a `(min, max)` endpoint pair per axis.
/// Updating a proxy writes the new values and walks each moved endpoint to
/// its sorted position by adjacent swaps; every swap between a min and a
/// max of different proxies toggles that pair's overlap on the current
/// axis. With temporally coherent motion the number of swaps per update is
/// small, so total work stays near-linear instead of re-sorting each tick.
///
/// Invariants, holding after every public call:
/// - each axis list is sorted under the endpoint order;
/// - the overlap map holds, for each proxy pair, exactly the axes on which
///   their intervals overlap, and holds no empty sets;
/// - every id in the lists, the slots, or the overlap map is tracked.
#[derive(Debug, Default)]
pub struct SweepAndPrune {
    axes: [Vec<Endpoint>; 3],
    slots: FxHashMap<ProxyId, Slots>,
    owners: BTreeMap<u64, Vec<ProxyId>>,
    proxy_owner: FxHashMap<ProxyId, u64>,
    overlaps: OverlapTable,
    next_proxy: u32,
}

impl SweepAndPrune {
    /// Creates an empty structure.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking `owner` with one proxy per entry of `volumes`.
    ///
    /// New endpoints are appended and folded into sorted position, which
    /// registers their initial overlaps.
    pub fn add_object(&mut self, owner: u64, volumes: &[Aabb]) -> Result<(), SweepError> {
        if self.owners.contains_key(&owner) {
            return Err(SweepError::DuplicateOwner(owner));
        }
        if volumes.is_empty() {
            return Err(SweepError::NoVolumes(owner));
        }
        self.insert_proxies(owner, volumes);
        Ok(())
    }

    /// Stops tracking `owner`, purging its endpoints and every overlap entry
    /// that references one of its proxies.
    ///
    /// Returns `false` if the owner was not tracked.
    pub fn remove_object(&mut self, owner: u64) -> bool {
        let Some(proxies) = self.owners.remove(&owner) else {
            return false;
        };
        for proxy in &proxies {
            self.slots.remove(proxy);
            self.proxy_owner.remove(proxy);
        }
        for axis in Axis::ALL {
            let list = &mut self.axes[axis.index()];
            list.retain(|ep| !proxies.contains(&ep.proxy));
            for (idx, ep) in list.iter().enumerate() {
                record_slot(&mut self.slots, axis, ep, idx);
            }
        }
        self.overlaps.purge(&proxies);
        true
    }

    /// Re-sweeps every proxy of `owner` against its refreshed bounds.
    ///
    /// `volumes` must list one box per proxy, in the order given to
    /// [`add_object`](Self::add_object).
    pub fn update_object(&mut self, owner: u64, volumes: &[Aabb]) -> Result<(), SweepError> {
        let proxies = self.owners.get(&owner).ok_or(SweepError::UnknownOwner(owner))?.clone();
        if proxies.len() != volumes.len() {
            return Err(SweepError::VolumeCountMismatch {
                owner,
                expected: proxies.len(),
                actual: volumes.len(),
            });
        }
        for (proxy, aabb) in proxies.iter().zip(volumes) {
            for axis in Axis::ALL {
                self.sweep_endpoints(axis, *proxy, aabb)?;
            }
        }
        Ok(())
    }

    /// Writes `aabb`'s interval on `axis` into `proxy`'s endpoints and walks
    /// each to its sorted position, toggling overlap flags on the way.
    ///
    /// The bound that moves outward is processed first (max when the box
    /// grows upward, min otherwise) so the proxy's own min never passes its
    /// own max mid-walk.
    pub fn sweep_endpoints(
        &mut self,
        axis: Axis,
        proxy: ProxyId,
        aabb: &Aabb,
    ) -> Result<(), SweepError> {
        let slots = *self.slots.get(&proxy).ok_or(SweepError::UnknownProxy(proxy.raw()))?;
        let (lo, hi) = aabb.axis_range(axis);
        let list = &mut self.axes[axis.index()];
        let grows_up = hi > list[slots[axis.index()][Bound::Max.index()]].value;
        let order = if grows_up {
            [(Bound::Max, hi), (Bound::Min, lo)]
        } else {
            [(Bound::Min, lo), (Bound::Max, hi)]
        };
        for (bound, value) in order {
            let idx = self.slots.get(&proxy).map_or(0, |s| s[axis.index()][bound.index()]);
            list[idx].value = value;
            walk(list, &mut self.slots, &mut self.overlaps, axis, idx);
        }
        Ok(())
    }

    /// Emits one record per owner pair whose proxies overlap on all three
    /// axes, translating proxies back to owners and dropping self-pairs.
    ///
    /// The result is canonical, deduplicated, and sorted ascending.
    pub fn true_collisions(&self) -> Vec<BroadPair> {
        self.owner_pairs(|_| true)
    }

    /// Like [`true_collisions`](Self::true_collisions), restricted to pairs
    /// with `owner` as a member.
    pub fn collisions_of(&self, owner: u64) -> Vec<BroadPair> {
        self.owner_pairs(|pair| pair.involves(owner))
    }

    fn owner_pairs(&self, keep: impl Fn(&BroadPair) -> bool) -> Vec<BroadPair> {
        let mut out = BTreeSet::new();
        for &(a, b) in &self.overlaps.full {
            let owners = self.proxy_owner.get(&a).zip(self.proxy_owner.get(&b));
            debug_assert!(owners.is_some(), "overlap entry references an untracked proxy");
            let Some((&owner_a, &owner_b)) = owners else {
                continue;
            };
            let pair = BroadPair::new(owner_a, owner_b);
            if owner_a != owner_b && keep(&pair) {
                out.insert(pair);
            }
        }
        out.into_iter().collect()
    }

    /// Axes on which two proxies currently overlap.
    pub fn axes_for(&self, a: ProxyId, b: ProxyId) -> AxisSet {
        self.overlaps.get(&ordered(a, b))
    }

    /// Every non-empty overlap entry, in key order.
    pub fn overlap_entries(&self) -> impl Iterator<Item = ((ProxyId, ProxyId), AxisSet)> + '_ {
        self.overlaps.axes.iter().map(|(k, v)| (*k, *v))
    }

    /// Proxies owned by `owner`, in insertion order.
    pub fn proxies(&self, owner: u64) -> Option<&[ProxyId]> {
        self.owners.get(&owner).map(Vec::as_slice)
    }

    /// Returns `true` if `owner` is tracked.
    pub fn contains(&self, owner: u64) -> bool {
        self.owners.contains_key(&owner)
    }

    /// Number of tracked owners.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Returns `true` when nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Number of endpoints on one axis (two per proxy).
    pub fn endpoint_count(&self, axis: Axis) -> usize {
        self.axes[axis.index()].len()
    }

    /// Checks every structural invariant from scratch in `O(n²)`.
    ///
    /// Diagnostic only; tests call it after each mutation.
    pub fn is_consistent(&self) -> bool {
        let mut intervals: BTreeMap<ProxyId, [(f32, f32); 3]> = BTreeMap::new();
        for axis in Axis::ALL {
            let list = &self.axes[axis.index()];
            if list.len() != 2 * self.slots.len() {
                return false;
            }
            for (idx, ep) in list.iter().enumerate() {
                if idx + 1 < list.len() && list[idx + 1].precedes(ep) {
                    return false;
                }
                let Some(slots) = self.slots.get(&ep.proxy) else {
                    return false;
                };
                if slots[axis.index()][ep.bound.index()] != idx {
                    return false;
                }
                let entry = intervals.entry(ep.proxy).or_insert([(0.0, 0.0); 3]);
                match ep.bound {
                    Bound::Min => entry[axis.index()].0 = ep.value,
                    Bound::Max => entry[axis.index()].1 = ep.value,
                }
            }
        }
        if self.overlaps.axes.keys().any(|(a, b)| !intervals.contains_key(a) || !intervals.contains_key(b)) {
            return false;
        }
        let full_matches = self.overlaps.axes.iter().filter(|(_, set)| set.is_full()).map(|(k, _)| k);
        if !full_matches.eq(self.overlaps.full.iter()) {
            return false;
        }
        let proxies: Vec<(&ProxyId, &[(f32, f32); 3])> = intervals.iter().collect();
        for (i, (a, ia)) in proxies.iter().enumerate() {
            for (b, ib) in proxies.iter().skip(i + 1) {
                let mut expected = AxisSet::EMPTY;
                for axis in Axis::ALL {
                    let (a_lo, a_hi) = ia[axis.index()];
                    let (b_lo, b_hi) = ib[axis.index()];
                    if a_lo <= b_hi && b_lo <= a_hi {
                        expected.insert(axis);
                    }
                }
                if self.axes_for(**a, **b) != expected {
                    return false;
                }
            }
        }
        true
    }

    fn insert_proxies(&mut self, owner: u64, volumes: &[Aabb]) {
        for aabb in volumes {
            let proxy = ProxyId(self.next_proxy);
            self.next_proxy += 1;
            let mut slots: Slots = [[0; 2]; 3];
            for axis in Axis::ALL {
                let list = &mut self.axes[axis.index()];
                let (lo, hi) = aabb.axis_range(axis);
                slots[axis.index()] = [list.len(), list.len() + 1];
                list.push(Endpoint { proxy, bound: Bound::Min, value: lo });
                list.push(Endpoint { proxy, bound: Bound::Max, value: hi });
            }
            self.slots.insert(proxy, slots);
            self.proxy_owner.insert(proxy, owner);
            self.owners.entry(owner).or_default().push(proxy);
            for axis in Axis::ALL {
                let list = &mut self.axes[axis.index()];
                for bound in [Bound::Min, Bound::Max] {
                    let idx = self.slots.get(&proxy).map_or(0, |s| s[axis.index()][bound.index()]);
                    walk(list, &mut self.slots, &mut self.overlaps, axis, idx);
                }
            }
        }
    }
}

impl BroadPhase for SweepAndPrune {
    fn upsert(&mut self, id: u64, aabb: Aabb) {
        match self.update_object(id, &[aabb]) {
            Ok(()) => {}
            Err(SweepError::UnknownOwner(_)) => self.insert_proxies(id, &[aabb]),
            Err(_) => {
                self.remove_object(id);
                self.insert_proxies(id, &[aabb]);
            }
        }
    }

    fn remove(&mut self, id: u64) {
        self.remove_object(id);
    }

    fn pairs(&self) -> Vec<BroadPair> {
        self.true_collisions()
    }
}

fn ordered(a: ProxyId, b: ProxyId) -> (ProxyId, ProxyId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn record_slot(slots: &mut FxHashMap<ProxyId, Slots>, axis: Axis, ep: &Endpoint, idx: usize) {
    if let Some(s) = slots.get_mut(&ep.proxy) {
        s[axis.index()][ep.bound.index()] = idx;
    }
}

/// Insertion-sort step: moves the endpoint at `idx` toward its sorted
/// position one adjacent swap at a time.
fn walk(
    list: &mut [Endpoint],
    slots: &mut FxHashMap<ProxyId, Slots>,
    overlaps: &mut OverlapTable,
    axis: Axis,
    mut idx: usize,
) {
    while idx > 0 && list[idx].precedes(&list[idx - 1]) {
        cross(overlaps, axis, &list[idx], &list[idx - 1], Direction::Down);
        list.swap(idx, idx - 1);
        record_slot(slots, axis, &list[idx], idx);
        record_slot(slots, axis, &list[idx - 1], idx - 1);
        idx -= 1;
    }
    while idx + 1 < list.len() && list[idx + 1].precedes(&list[idx]) {
        cross(overlaps, axis, &list[idx], &list[idx + 1], Direction::Up);
        list.swap(idx, idx + 1);
        record_slot(slots, axis, &list[idx], idx);
        record_slot(slots, axis, &list[idx + 1], idx + 1);
        idx += 1;
    }
}

/// Toggles the overlap flag when `moving` passes `other` in `dir`.
///
/// A min passing a max downward (or a max passing a min upward) starts an
/// overlap on this axis; the opposite crossings end one. Min/min and max/max
/// crossings change nothing.
fn cross(
    overlaps: &mut OverlapTable,
    axis: Axis,
    moving: &Endpoint,
    other: &Endpoint,
    dir: Direction,
) {
    if moving.proxy == other.proxy {
        return;
    }
    let begins = match (moving.bound, other.bound, dir) {
        (Bound::Min, Bound::Max, Direction::Down) | (Bound::Max, Bound::Min, Direction::Up) => true,
        (Bound::Min, Bound::Max, Direction::Up) | (Bound::Max, Bound::Min, Direction::Down) => false,
        _ => return,
    };
    let key = ordered(moving.proxy, other.proxy);
    if begins {
        overlaps.begin(key, axis);
    } else {
        overlaps.end(key, axis);
    }
}
