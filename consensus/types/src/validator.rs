use crate::{Epoch, Hash256, PublicKeyBytes};
use serde::{Deserialize, Serialize};

/// Information about a `BeaconChain` validator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Validator {
    pub pubkey: PublicKeyBytes,
    pub withdrawal_credentials: Hash256,
    #[serde(with = "serde_utils::quoted_u64")]
    pub effective_balance: u64,
    pub slashed: bool,
    pub activation_eligibility_epoch: Epoch,
    pub activation_epoch: Epoch,
    pub exit_epoch: Epoch,
    pub withdrawable_epoch: Epoch,
}

impl Validator {
    /// Returns `true` if the validator is considered active at some epoch.
    pub fn is_active_at(&self, epoch: Epoch) -> bool {
        self.activation_epoch <= epoch && epoch < self.exit_epoch
    }

    /// Returns `true` if the validator is slashable at some epoch.
    pub fn is_slashable_at(&self, epoch: Epoch) -> bool {
        !self.slashed && self.activation_epoch <= epoch && epoch < self.withdrawable_epoch
    }

    /// Returns `true` if the validator is considered exited at some epoch.
    pub fn is_exited_at(&self, epoch: Epoch) -> bool {
        self.exit_epoch <= epoch
    }

    /// Returns `true` if an exit has been initiated for the validator.
    pub fn has_initiated_exit(&self, far_future_epoch: Epoch) -> bool {
        self.exit_epoch != far_future_epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> Validator {
        Validator {
            pubkey: PublicKeyBytes::empty(),
            withdrawal_credentials: Hash256::ZERO,
            effective_balance: 32_000_000_000,
            slashed: false,
            activation_eligibility_epoch: Epoch::new(0),
            activation_epoch: Epoch::new(2),
            exit_epoch: Epoch::new(10),
            withdrawable_epoch: Epoch::new(20),
        }
    }

    #[test]
    fn is_active_at() {
        let v = validator();
        assert!(!v.is_active_at(Epoch::new(1)));
        assert!(v.is_active_at(Epoch::new(2)));
        assert!(v.is_active_at(Epoch::new(9)));
        assert!(!v.is_active_at(Epoch::new(10)));
    }

    #[test]
    fn is_slashable_at() {
        let mut v = validator();
        assert!(v.is_slashable_at(Epoch::new(15)));
        assert!(!v.is_slashable_at(Epoch::new(20)));
        v.slashed = true;
        assert!(!v.is_slashable_at(Epoch::new(15)));
    }

    #[test]
    fn exit_status() {
        let v = validator();
        assert!(v.is_exited_at(Epoch::new(10)));
        assert!(v.has_initiated_exit(Epoch::max_value()));
    }
}
