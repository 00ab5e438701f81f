use crate::{Hash256, SignatureBytes, SignedRoot, Slot};
use serde::{Deserialize, Serialize};
use tree_hash_derive::TreeHash;

/// A header of a `BeaconBlock`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TreeHash)]
pub struct BeaconBlockHeader {
    pub slot: Slot,
    #[serde(with = "serde_utils::quoted_u64")]
    pub proposer_index: u64,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub body_root: Hash256,
}

impl SignedRoot for BeaconBlockHeader {}

/// A signed header of a `BeaconBlock`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignedBeaconBlockHeader {
    pub message: BeaconBlockHeader,
    pub signature: SignatureBytes,
}
