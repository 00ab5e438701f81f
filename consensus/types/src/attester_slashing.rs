use crate::IndexedAttestation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Two conflicting attestations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttesterSlashing {
    pub attestation_1: IndexedAttestation,
    pub attestation_2: IndexedAttestation,
}

impl AttesterSlashing {
    /// Validator indices present in both attestations, in ascending order.
    pub fn intersecting_indices(&self) -> Vec<u64> {
        let attesting_indices_1 = self
            .attestation_1
            .attesting_indices
            .iter()
            .collect::<BTreeSet<_>>();
        self.attestation_2
            .attesting_indices
            .iter()
            .filter(|index| attesting_indices_1.contains(index))
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
