use crate::{Epoch, Hash256, SignedRoot, Slot};
use serde::{Deserialize, Serialize};
use tree_hash_derive::TreeHash;

/// Casper FFG checkpoint, used in attestations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TreeHash)]
pub struct Checkpoint {
    pub epoch: Epoch,
    pub root: Hash256,
}

/// The data upon which an attestation is based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TreeHash)]
pub struct AttestationData {
    pub slot: Slot,
    #[serde(with = "serde_utils::quoted_u64")]
    pub index: u64,

    // LMD GHOST vote
    pub beacon_block_root: Hash256,

    // FFG Vote
    pub source: Checkpoint,
    pub target: Checkpoint,
}

impl SignedRoot for AttestationData {}

impl AttestationData {
    /// Check if `self` and `other` are distinct votes for the same target epoch.
    pub fn is_double_vote(&self, other: &Self) -> bool {
        self != other && self.target.epoch == other.target.epoch
    }

    /// Check if `self` surrounds `other`, i.e. `self` starts before and ends after `other`.
    pub fn is_surround_vote(&self, other: &Self) -> bool {
        self.source.epoch < other.source.epoch && other.target.epoch < self.target.epoch
    }

    /// Either of the two conditions under which a pair of votes is slashable.
    pub fn is_slashable_with(&self, other: &Self) -> bool {
        self.is_double_vote(other) || self.is_surround_vote(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(source: u64, target: u64, root: u8) -> AttestationData {
        AttestationData {
            slot: Slot::new(target * 8),
            index: 0,
            beacon_block_root: Hash256::repeat_byte(root),
            source: Checkpoint {
                epoch: Epoch::new(source),
                root: Hash256::ZERO,
            },
            target: Checkpoint {
                epoch: Epoch::new(target),
                root: Hash256::ZERO,
            },
        }
    }

    #[test]
    fn double_vote() {
        assert!(data(1, 2, 1).is_double_vote(&data(1, 2, 2)));
        assert!(!data(1, 2, 1).is_double_vote(&data(1, 2, 1)));
        assert!(!data(1, 2, 1).is_double_vote(&data(1, 3, 2)));
    }

    #[test]
    fn surround_vote() {
        assert!(data(1, 5, 1).is_surround_vote(&data(2, 4, 1)));
        assert!(!data(2, 4, 1).is_surround_vote(&data(1, 5, 1)));
        assert!(!data(1, 5, 1).is_surround_vote(&data(1, 4, 1)));
        assert!(data(2, 4, 1).is_slashable_with(&data(2, 4, 3)));
        assert!(!data(1, 2, 1).is_slashable_with(&data(2, 3, 1)));
    }
}
