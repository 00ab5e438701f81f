use crate::{ChainSpec, Epoch, Fork, Hash256, Slot, Validator};
use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Clone)]
pub enum BeaconStateError {
    UnknownValidator(u64),
}

/// The subset of the beacon state needed to verify operations and to order the operation pool.
///
/// States are shared behind an `Arc` once they become the head and are never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeaconState {
    #[serde(with = "serde_utils::quoted_u64")]
    pub genesis_time: u64,
    pub genesis_validators_root: Hash256,
    pub slot: Slot,
    pub fork: Fork,
    pub validators: Vec<Validator>,
}

impl BeaconState {
    /// The epoch corresponding to `self.slot`.
    pub fn current_epoch(&self, spec: &ChainSpec) -> Epoch {
        self.slot.epoch(spec.slots_per_epoch)
    }

    /// Safe indexer for the `validators` list.
    pub fn get_validator(&self, validator_index: u64) -> Result<&Validator, BeaconStateError> {
        usize::try_from(validator_index)
            .ok()
            .and_then(|index| self.validators.get(index))
            .ok_or(BeaconStateError::UnknownValidator(validator_index))
    }
}
