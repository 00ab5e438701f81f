//! A beacon state populated with deterministic keypairs, able to sign every operation the node
//! accepts. Intended for tests only.
use bls::{aggregate_signatures, Keypair};
use std::sync::Arc;
use types::{
    AttestationData, AttesterSlashing, BeaconBlockHeader, BeaconState, ChainSpec, Checkpoint,
    Domain, Epoch, Fork, Hash256, IndexedAttestation, ProposerSlashing, SignedBeaconBlockHeader,
    SignedRoot, SignedVoluntaryExit, Validator, VoluntaryExit,
};

pub const DEFAULT_ETH1_BALANCE: u64 = 32_000_000_000;

pub struct StateHarness {
    pub spec: Arc<ChainSpec>,
    pub keypairs: Vec<Keypair>,
    pub state: BeaconState,
}

impl StateHarness {
    /// A minimal-spec state whose validators are all active and old enough to exit.
    pub fn new(validator_count: usize) -> Self {
        Self::with_spec(ChainSpec::minimal(), validator_count)
    }

    pub fn with_spec(spec: ChainSpec, validator_count: usize) -> Self {
        let keypairs = (0..validator_count)
            .map(Keypair::deterministic)
            .collect::<Vec<_>>();

        let validators = keypairs
            .iter()
            .map(|keypair| Validator {
                pubkey: keypair.pk,
                withdrawal_credentials: Hash256::ZERO,
                effective_balance: DEFAULT_ETH1_BALANCE,
                slashed: false,
                activation_eligibility_epoch: Epoch::new(0),
                activation_epoch: Epoch::new(0),
                exit_epoch: spec.far_future_epoch,
                withdrawable_epoch: spec.far_future_epoch,
            })
            .collect();

        let current_epoch = Epoch::new(spec.shard_committee_period + 1);
        let state = BeaconState {
            genesis_time: 1_606_824_023,
            genesis_validators_root: Hash256::repeat_byte(0x42),
            slot: current_epoch.start_slot(spec.slots_per_epoch),
            fork: Fork {
                previous_version: spec.genesis_fork_version,
                current_version: spec.genesis_fork_version,
                epoch: Epoch::new(0),
            },
            validators,
        };

        Self {
            spec: Arc::new(spec),
            keypairs,
            state,
        }
    }

    pub fn current_epoch(&self) -> Epoch {
        self.state.current_epoch(&self.spec)
    }

    /// A copy of the current state, as it would be shared by the canonical head.
    pub fn shared_state(&self) -> Arc<BeaconState> {
        Arc::new(self.state.clone())
    }

    pub fn slash_validator(&mut self, validator_index: usize) {
        self.state.validators[validator_index].slashed = true;
    }

    pub fn initiate_validator_exit(&mut self, validator_index: usize, exit_epoch: Epoch) {
        let validator = &mut self.state.validators[validator_index];
        validator.exit_epoch = exit_epoch;
        validator.withdrawable_epoch = exit_epoch + 256;
    }

    fn attestation_data(&self, source: u64, target: u64, block_root: u8) -> AttestationData {
        AttestationData {
            slot: Epoch::new(target).start_slot(self.spec.slots_per_epoch),
            index: 0,
            beacon_block_root: Hash256::repeat_byte(block_root),
            source: Checkpoint {
                epoch: Epoch::new(source),
                root: Hash256::repeat_byte(0xaa),
            },
            target: Checkpoint {
                epoch: Epoch::new(target),
                root: Hash256::repeat_byte(0xbb),
            },
        }
    }

    /// Signs `data` with the keys of every validator in `indices`.
    pub fn make_indexed_attestation(
        &self,
        indices: &[u64],
        data: AttestationData,
    ) -> IndexedAttestation {
        let mut attesting_indices = indices.to_vec();
        attesting_indices.sort_unstable();
        attesting_indices.dedup();

        let domain = self.spec.get_domain(
            data.target.epoch,
            Domain::BeaconAttester,
            &self.state.fork,
            self.state.genesis_validators_root,
        );
        let message = data.signing_root(domain);
        let signatures = attesting_indices
            .iter()
            .map(|&index| self.keypairs[index as usize].sign(message))
            .collect::<Vec<_>>();
        let signature =
            aggregate_signatures(&signatures).expect("test attestations have at least one signer");

        IndexedAttestation {
            attesting_indices,
            data,
            signature,
        }
    }

    /// A double vote by every validator in `indices`.
    pub fn make_attester_slashing(&self, indices: &[u64]) -> AttesterSlashing {
        self.make_attester_slashing_with_indices(indices, indices)
    }

    /// A double vote between two attestations with different signers. Only validators in both
    /// sets are slashable.
    pub fn make_attester_slashing_with_indices(
        &self,
        indices_1: &[u64],
        indices_2: &[u64],
    ) -> AttesterSlashing {
        let target = self.current_epoch().as_u64() - 1;
        AttesterSlashing {
            attestation_1: self
                .make_indexed_attestation(indices_1, self.attestation_data(target - 1, target, 1)),
            attestation_2: self
                .make_indexed_attestation(indices_2, self.attestation_data(target - 1, target, 2)),
        }
    }

    /// The first attestation surrounds the second.
    pub fn make_surround_vote_slashing(&self, indices: &[u64]) -> AttesterSlashing {
        let target = self.current_epoch().as_u64() - 1;
        AttesterSlashing {
            attestation_1: self
                .make_indexed_attestation(indices, self.attestation_data(target - 4, target, 1)),
            attestation_2: self.make_indexed_attestation(
                indices,
                self.attestation_data(target - 3, target - 1, 1),
            ),
        }
    }

    pub fn sign_block_header(&self, header: BeaconBlockHeader) -> SignedBeaconBlockHeader {
        let domain = self.spec.get_domain(
            header.slot.epoch(self.spec.slots_per_epoch),
            Domain::BeaconProposer,
            &self.state.fork,
            self.state.genesis_validators_root,
        );
        let signature = self.keypairs[header.proposer_index as usize].sign(header.signing_root(domain));
        SignedBeaconBlockHeader {
            message: header,
            signature,
        }
    }

    /// Two different blocks proposed by `proposer_index` in the previous slot.
    pub fn make_proposer_slashing(&self, proposer_index: u64) -> ProposerSlashing {
        let header = |body_root: u8| BeaconBlockHeader {
            slot: self.state.slot - 1,
            proposer_index,
            parent_root: Hash256::repeat_byte(0x01),
            state_root: Hash256::repeat_byte(0x02),
            body_root: Hash256::repeat_byte(body_root),
        };

        ProposerSlashing {
            signed_header_1: self.sign_block_header(header(0x10)),
            signed_header_2: self.sign_block_header(header(0x20)),
        }
    }

    pub fn make_voluntary_exit(&self, validator_index: u64, epoch: Epoch) -> SignedVoluntaryExit {
        let message = VoluntaryExit {
            epoch,
            validator_index,
        };
        let domain = self.spec.get_domain(
            epoch,
            Domain::VoluntaryExit,
            &self.state.fork,
            self.state.genesis_validators_root,
        );
        let signature = self.keypairs[validator_index as usize].sign(message.signing_root(domain));
        SignedVoluntaryExit { message, signature }
    }

    /// An exit whose signature was produced by a different validator.
    pub fn make_voluntary_exit_with_bad_signature(
        &self,
        validator_index: u64,
        epoch: Epoch,
    ) -> SignedVoluntaryExit {
        let signer = (validator_index + 1) % self.keypairs.len() as u64;
        SignedVoluntaryExit {
            message: VoluntaryExit {
                epoch,
                validator_index,
            },
            signature: self.make_voluntary_exit(signer, epoch).signature,
        }
    }
}
