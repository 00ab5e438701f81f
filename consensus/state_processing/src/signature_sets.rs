//! Builds the `SignatureSet`s an operation must satisfy, without verifying them.
use bls::{PublicKeyBytes, SignatureBytes, SignatureSet};
use types::{
    BeaconState, BeaconStateError, ChainSpec, Domain, Fork, Hash256, IndexedAttestation,
    ProposerSlashing, SignedBeaconBlockHeader, SignedRoot, SignedVoluntaryExit, Validator,
};

pub type Result<T> = std::result::Result<T, BeaconStateError>;

/// Returns the signature set for the given `indexed_attestation`.
pub fn indexed_attestation_signature_set<'a>(
    state: &'a BeaconState,
    signature: &'a SignatureBytes,
    indexed_attestation: &'a IndexedAttestation,
    spec: &ChainSpec,
) -> Result<SignatureSet<'a>> {
    let pubkeys = indexed_attestation
        .attesting_indices
        .iter()
        .map(|&validator_index| {
            state
                .get_validator(validator_index)
                .map(|validator| &validator.pubkey)
        })
        .collect::<Result<Vec<&PublicKeyBytes>>>()?;

    let domain = spec.get_domain(
        indexed_attestation.data.target.epoch,
        Domain::BeaconAttester,
        &state.fork,
        state.genesis_validators_root,
    );
    let message = indexed_attestation.data.signing_root(domain);

    Ok(SignatureSet::multiple_pubkeys(signature, pubkeys, message))
}

/// A signature set that is valid if the block header was signed by the proposer it names.
pub fn block_header_signature_set<'a>(
    state: &'a BeaconState,
    signed_header: &'a SignedBeaconBlockHeader,
    spec: &ChainSpec,
) -> Result<SignatureSet<'a>> {
    let header = &signed_header.message;
    let proposer = state.get_validator(header.proposer_index)?;

    let domain = spec.get_domain(
        header.slot.epoch(spec.slots_per_epoch),
        Domain::BeaconProposer,
        &state.fork,
        state.genesis_validators_root,
    );
    let message = header.signing_root(domain);

    Ok(SignatureSet::single_pubkey(
        &signed_header.signature,
        &proposer.pubkey,
        message,
    ))
}

/// Returns two signature sets, one for each `BlockHeader` included in the `ProposerSlashing`.
pub fn proposer_slashing_signature_set<'a>(
    state: &'a BeaconState,
    proposer_slashing: &'a ProposerSlashing,
    spec: &ChainSpec,
) -> Result<(SignatureSet<'a>, SignatureSet<'a>)> {
    Ok((
        block_header_signature_set(state, &proposer_slashing.signed_header_1, spec)?,
        block_header_signature_set(state, &proposer_slashing.signed_header_2, spec)?,
    ))
}

/// Returns the signature set for the given `exit`, signed by `validator`.
///
/// The exit epoch selects the fork version, so an exit signed before a fork stays valid after it.
pub fn exit_signature_set<'a>(
    validator: &'a Validator,
    fork: &Fork,
    genesis_validators_root: Hash256,
    signed_exit: &'a SignedVoluntaryExit,
    spec: &ChainSpec,
) -> SignatureSet<'a> {
    let exit = &signed_exit.message;
    let domain = spec.get_domain(
        exit.epoch,
        Domain::VoluntaryExit,
        fork,
        genesis_validators_root,
    );
    let message = exit.signing_root(domain);

    SignatureSet::single_pubkey(&signed_exit.signature, &validator.pubkey, message)
}
