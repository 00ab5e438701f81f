use std::collections::BTreeSet;
use types::{AttesterSlashing, BeaconState, Epoch};

/// An attester slashing together with the validators it could slash when it was inserted.
///
/// The slashable set is the pool's identity for the slashing: a later slashing whose validators
/// are all slashed by this entry adds nothing, and one that covers this entry replaces it.
#[derive(Debug, Clone, PartialEq)]
pub struct AttesterSlashingEntry {
    pub slashing: AttesterSlashing,
    pub slashable_indices: BTreeSet<u64>,
    /// Set once the slashing has been handed to the network.
    pub published: bool,
}

impl AttesterSlashingEntry {
    pub fn new(slashing: AttesterSlashing, slashable_indices: impl IntoIterator<Item = u64>) -> Self {
        Self {
            slashing,
            slashable_indices: slashable_indices.into_iter().collect(),
            published: false,
        }
    }

    /// Indices in this entry that `state` still considers slashable at `epoch`.
    pub fn still_slashable<'a>(
        &'a self,
        state: &'a BeaconState,
        epoch: Epoch,
    ) -> impl Iterator<Item = u64> + 'a {
        self.slashable_indices.iter().copied().filter(move |&index| {
            state
                .get_validator(index)
                .map_or(false, |validator| validator.is_slashable_at(epoch))
        })
    }

    /// `true` if every index this entry slashes is also slashed by `other`.
    pub fn is_covered_by(&self, other: &BTreeSet<u64>) -> bool {
        self.slashable_indices.is_subset(other)
    }
}
