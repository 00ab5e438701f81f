use crate::{
    verify_attester_slashing, verify_exit_and_signature, verify_proposer_slashing,
    AttesterSlashingValidationError, ExitValidationError, ProposerSlashingValidationError,
    VerifySignatures,
};
use std::sync::Arc;
use types::{
    AttesterSlashing, BeaconState, ChainSpec, Fork, Hash256, ProposerSlashing,
    SignedVoluntaryExit, Slot, Validator,
};

/// Checks externally-submitted operations against a head state.
///
/// Implementations must be read-only: the same `(object, state)` pair always yields the same
/// result, and they must be safe to call from many threads at once.
pub trait ObjectValidator: Send + Sync + 'static {
    fn verify_attester_slashing(
        &self,
        state: &BeaconState,
        attester_slashing: &AttesterSlashing,
    ) -> Result<(), AttesterSlashingValidationError>;

    fn verify_proposer_slashing(
        &self,
        state: &BeaconState,
        proposer_slashing: &ProposerSlashing,
    ) -> Result<(), ProposerSlashingValidationError>;

    fn verify_exit_and_signature(
        &self,
        validator: &Validator,
        current_slot: Slot,
        fork: &Fork,
        signed_exit: &SignedVoluntaryExit,
        genesis_validators_root: Hash256,
    ) -> Result<(), ExitValidationError>;
}

/// Applies the consensus rules in this crate.
#[derive(Debug, Clone)]
pub struct ConsensusValidator {
    spec: Arc<ChainSpec>,
    verify_signatures: VerifySignatures,
}

impl ConsensusValidator {
    pub fn new(spec: Arc<ChainSpec>) -> Self {
        Self {
            spec,
            verify_signatures: VerifySignatures::True,
        }
    }

    pub fn verify_signatures(mut self, verify_signatures: VerifySignatures) -> Self {
        self.verify_signatures = verify_signatures;
        self
    }
}

impl ObjectValidator for ConsensusValidator {
    fn verify_attester_slashing(
        &self,
        state: &BeaconState,
        attester_slashing: &AttesterSlashing,
    ) -> Result<(), AttesterSlashingValidationError> {
        verify_attester_slashing(state, attester_slashing, self.verify_signatures, &self.spec)
            .map(|_| ())
    }

    fn verify_proposer_slashing(
        &self,
        state: &BeaconState,
        proposer_slashing: &ProposerSlashing,
    ) -> Result<(), ProposerSlashingValidationError> {
        verify_proposer_slashing(proposer_slashing, state, self.verify_signatures, &self.spec)
    }

    fn verify_exit_and_signature(
        &self,
        validator: &Validator,
        current_slot: Slot,
        fork: &Fork,
        signed_exit: &SignedVoluntaryExit,
        genesis_validators_root: Hash256,
    ) -> Result<(), ExitValidationError> {
        verify_exit_and_signature(
            validator,
            current_slot,
            fork,
            signed_exit,
            genesis_validators_root,
            self.verify_signatures,
            &self.spec,
        )
    }
}
