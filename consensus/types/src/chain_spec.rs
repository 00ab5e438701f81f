use crate::{Epoch, Fork, ForkData, Hash256};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tree_hash::TreeHash;

/// Each of the BLS signature domains.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Domain {
    BeaconProposer,
    BeaconAttester,
    VoluntaryExit,
}

/// Holds all the "constants" for a beacon chain that matter to operation verification and the
/// operation pool.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ChainSpec {
    pub config_name: Option<String>,

    #[serde(with = "serde_utils::quoted_u64")]
    pub slots_per_epoch: u64,
    pub far_future_epoch: Epoch,
    /// Number of epochs a validator must have been active before it may exit.
    #[serde(with = "serde_utils::quoted_u64")]
    pub shard_committee_period: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub max_validators_per_committee: u64,

    #[serde(with = "serde_utils::quoted_u64")]
    pub max_proposer_slashings: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub max_attester_slashings: u64,
    #[serde(with = "serde_utils::quoted_u64")]
    pub max_voluntary_exits: u64,

    #[serde(with = "serde_utils::bytes_4_hex")]
    pub genesis_fork_version: [u8; 4],

    #[serde(with = "serde_utils::quoted_u32")]
    pub domain_beacon_proposer: u32,
    #[serde(with = "serde_utils::quoted_u32")]
    pub domain_beacon_attester: u32,
    #[serde(with = "serde_utils::quoted_u32")]
    pub domain_voluntary_exit: u32,
}

impl ChainSpec {
    /// Get the domain number, unmodified by the fork.
    pub fn get_domain_constant(&self, domain: Domain) -> u32 {
        match domain {
            Domain::BeaconProposer => self.domain_beacon_proposer,
            Domain::BeaconAttester => self.domain_beacon_attester,
            Domain::VoluntaryExit => self.domain_voluntary_exit,
        }
    }

    /// Get the domain that represents the fork meta and signature domain.
    pub fn get_domain(
        &self,
        epoch: Epoch,
        domain: Domain,
        fork: &Fork,
        genesis_validators_root: Hash256,
    ) -> Hash256 {
        let fork_version = fork.get_fork_version(epoch);
        self.compute_domain(domain, fork_version, genesis_validators_root)
    }

    /// Compute a domain by applying the given `fork_version`.
    pub fn compute_domain(
        &self,
        domain: Domain,
        fork_version: [u8; 4],
        genesis_validators_root: Hash256,
    ) -> Hash256 {
        let domain_constant = self.get_domain_constant(domain);

        let mut domain = [0; 32];
        domain[0..4].copy_from_slice(&domain_constant.to_le_bytes());
        domain[4..].copy_from_slice(
            &Self::compute_fork_data_root(fork_version, genesis_validators_root)[..28],
        );

        Hash256::from(domain)
    }

    /// Return the 32-byte fork data root for the `current_version` and `genesis_validators_root`.
    pub fn compute_fork_data_root(
        current_version: [u8; 4],
        genesis_validators_root: Hash256,
    ) -> Hash256 {
        ForkData {
            current_version,
            genesis_validators_root,
        }
        .tree_hash_root()
    }

    /// Returns a `ChainSpec` compatible with the Ethereum Foundation specification.
    pub fn mainnet() -> Self {
        Self {
            config_name: Some("mainnet".to_string()),
            slots_per_epoch: 32,
            far_future_epoch: Epoch::max_value(),
            shard_committee_period: 256,
            max_validators_per_committee: 2048,
            max_proposer_slashings: 16,
            max_attester_slashings: 2,
            max_voluntary_exits: 16,
            genesis_fork_version: [0; 4],
            domain_beacon_proposer: 0,
            domain_beacon_attester: 1,
            domain_voluntary_exit: 4,
        }
    }

    /// Ethereum Foundation minimal spec, as defined in the consensus-specs repo.
    pub fn minimal() -> Self {
        Self {
            config_name: Some("minimal".to_string()),
            slots_per_epoch: 8,
            shard_committee_period: 64,
            genesis_fork_version: [0x00, 0x00, 0x00, 0x01],
            ..ChainSpec::mainnet()
        }
    }
}

impl FromStr for ChainSpec {
    type Err = String;

    /// Looks up a built-in preset by name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(Self::mainnet()),
            "minimal" => Ok(Self::minimal()),
            other => Err(format!("unknown network: {}", other)),
        }
    }
}

impl Default for ChainSpec {
    fn default() -> Self {
        Self::mainnet()
    }
}
