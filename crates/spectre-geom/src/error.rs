// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use thiserror::Error;

/// Errors emitted by the sweep-and-prune.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SweepError {
    /// The owner is not tracked.
    #[error("owner {0} is not tracked")]
    UnknownOwner(u64),
    /// The owner is already tracked; remove it before re-adding.
    #[error("owner {0} is already tracked")]
    DuplicateOwner(u64),
    /// An owner must contribute at least one volume.
    #[error("owner {0} supplied no volumes")]
    NoVolumes(u64),
    /// An update supplied a different number of volumes than were registered.
    #[error("owner {owner} has {expected} volumes, update supplied {actual}")]
    VolumeCountMismatch {
        /// Owner being updated.
        owner: u64,
        /// Registered volume count.
        expected: usize,
        /// Supplied volume count.
        actual: usize,
    },
    /// The proxy id is not tracked.
    #[error("proxy {0} is not tracked")]
    UnknownProxy(u32),
}
