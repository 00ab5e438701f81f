use super::errors::{BlockOperationError, ExitInvalid};
use super::signature_sets::exit_signature_set;
use crate::VerifySignatures;
use types::{
    BeaconState, ChainSpec, Fork, Hash256, SignedVoluntaryExit, Slot, Validator,
};

type Result<T> = std::result::Result<T, BlockOperationError<ExitInvalid>>;

fn error(reason: ExitInvalid) -> BlockOperationError<ExitInvalid> {
    BlockOperationError::invalid(reason)
}

/// Indicates if an `Exit` is valid to be included in a block in the current epoch of the given
/// state.
///
/// Returns `Ok(())` if the `Exit` is valid, otherwise indicates the reason for invalidity.
pub fn verify_exit(
    state: &BeaconState,
    signed_exit: &SignedVoluntaryExit,
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<()> {
    let validator_index = signed_exit.message.validator_index;
    let validator = state
        .get_validator(validator_index)
        .map_err(|_| error(ExitInvalid::ValidatorUnknown(validator_index)))?;

    verify_exit_and_signature(
        validator,
        state.slot,
        &state.fork,
        signed_exit,
        state.genesis_validators_root,
        verify_signatures,
        spec,
    )
}

/// Verify an exit against an already-resolved `validator` record.
///
/// The caller is responsible for `validator` being the record at `exit.validator_index`.
pub fn verify_exit_and_signature(
    validator: &Validator,
    current_slot: Slot,
    fork: &Fork,
    signed_exit: &SignedVoluntaryExit,
    genesis_validators_root: Hash256,
    verify_signatures: VerifySignatures,
    spec: &ChainSpec,
) -> Result<()> {
    let exit = &signed_exit.message;
    let current_epoch = current_slot.epoch(spec.slots_per_epoch);

    // Verify the validator is active.
    verify!(
        validator.is_active_at(current_epoch),
        ExitInvalid::NotActive(exit.validator_index)
    );

    // Verify that the validator has not yet exited.
    verify!(
        !validator.has_initiated_exit(spec.far_future_epoch),
        ExitInvalid::AlreadyExited(exit.validator_index)
    );

    // Exits must specify an epoch when they become valid; they are not valid before then.
    verify!(
        current_epoch >= exit.epoch,
        ExitInvalid::FutureEpoch {
            state: current_epoch,
            exit: exit.epoch
        }
    );

    // Verify the validator has been active long enough.
    let earliest_exit_epoch = validator.activation_epoch + spec.shard_committee_period;
    verify!(
        current_epoch >= earliest_exit_epoch,
        ExitInvalid::TooYoungToExit {
            current_epoch,
            earliest_exit_epoch,
        }
    );

    if verify_signatures.is_true() {
        verify!(
            exit_signature_set(validator, fork, genesis_validators_root, signed_exit, spec)
                .verify(),
            ExitInvalid::BadSignature
        );
    }

    Ok(())
}
