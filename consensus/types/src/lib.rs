//! Ethereum consensus types needed to verify and pool slashings and voluntary exits.

mod attestation_data;
mod attester_slashing;
mod beacon_block_header;
mod beacon_state;
mod chain_spec;
mod fork;
mod indexed_attestation;
mod proposer_slashing;
mod signing_data;
mod slot_epoch;
mod validator;
mod voluntary_exit;

pub use attestation_data::{AttestationData, Checkpoint};
pub use attester_slashing::AttesterSlashing;
pub use beacon_block_header::{BeaconBlockHeader, SignedBeaconBlockHeader};
pub use beacon_state::{BeaconState, BeaconStateError};
pub use chain_spec::{ChainSpec, Domain};
pub use fork::{Fork, ForkData};
pub use indexed_attestation::IndexedAttestation;
pub use proposer_slashing::ProposerSlashing;
pub use signing_data::{SignedRoot, SigningData};
pub use slot_epoch::{Epoch, Slot};
pub use validator::Validator;
pub use voluntary_exit::{SignedVoluntaryExit, VoluntaryExit};

pub use bls::{PublicKeyBytes, SignatureBytes};

pub type Hash256 = alloy_primitives::B256;
