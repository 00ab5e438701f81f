use crate::{AttestationData, SignatureBytes};
use serde::{Deserialize, Serialize};

/// Details an attestation that can be slashable.
///
/// To be included in an `AttesterSlashing`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexedAttestation {
    /// Lists validator registry indices, not committee indices.
    #[serde(with = "serde_utils::quoted_u64_vec")]
    pub attesting_indices: Vec<u64>,
    pub data: AttestationData,
    pub signature: SignatureBytes,
}

impl IndexedAttestation {
    /// Check if ``attestation_data_1`` and ``attestation_data_2`` have the same target.
    pub fn is_double_vote(&self, other: &Self) -> bool {
        self.data.is_double_vote(&other.data)
    }

    /// Check if ``attestation_data_1`` surrounds ``attestation_data_2``.
    pub fn is_surround_vote(&self, other: &Self) -> bool {
        self.data.is_surround_vote(&other.data)
    }
}
