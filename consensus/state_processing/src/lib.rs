//! Verification of slashings and voluntary exits against a beacon state.
//!
//! These checks mirror the `process_*` functions of the consensus specification, minus the
//! state mutation. They never modify the state they are given.

#[macro_use]
mod macros;

pub mod errors;
pub mod signature_sets;

mod is_valid_indexed_attestation;
mod object_validator;
mod verify_attester_slashing;
mod verify_exit;
mod verify_proposer_slashing;

pub use errors::{
    AttesterSlashingInvalid, AttesterSlashingValidationError, BlockOperationError, ExitInvalid,
    ExitValidationError, IndexedAttestationInvalid, IndexedAttestationValidationError,
    ProposerSlashingInvalid, ProposerSlashingValidationError,
};
pub use is_valid_indexed_attestation::is_valid_indexed_attestation;
pub use object_validator::{ConsensusValidator, ObjectValidator};
pub use verify_attester_slashing::{get_slashable_indices, verify_attester_slashing};
pub use verify_exit::{verify_exit, verify_exit_and_signature};
pub use verify_proposer_slashing::verify_proposer_slashing;

/// Whether signatures should be checked.
///
/// Disabling signature verification is only sound for objects whose signatures were verified
/// elsewhere.
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum VerifySignatures {
    True,
    False,
}

impl VerifySignatures {
    pub fn is_true(self) -> bool {
        self == VerifySignatures::True
    }
}
