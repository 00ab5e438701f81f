//! Tracks the state at the tip of the canonical chain.
//!
//! Readers receive an `Arc` to the state that was the head when they asked. A new head replaces
//! the `Arc` and never mutates a state that has already been handed out, so a reader's snapshot
//! stays consistent for as long as it holds it.
use crate::BeaconChainError;
use parking_lot::RwLock;
use slog::{debug, Logger};
use std::sync::Arc;
use std::time::Duration;
use types::{BeaconState, Slot};

/// The maximum time to wait for the head lock. Writers hold it only to swap an `Arc`.
pub const HEAD_LOCK_TIMEOUT: Duration = Duration::from_secs(1);

/// Supplies an immutable snapshot of the current head state.
///
/// Implementations must be safe to call concurrently from many request handlers.
pub trait HeadStateProvider: Send + Sync + 'static {
    fn head_state(&self) -> Result<Arc<BeaconState>, BeaconChainError>;
}

pub struct CanonicalHead {
    cached_head: RwLock<Option<Arc<BeaconState>>>,
    log: Logger,
}

impl CanonicalHead {
    /// A canonical head with no state, as before genesis.
    pub fn new(log: Logger) -> Self {
        Self {
            cached_head: RwLock::new(None),
            log,
        }
    }

    pub fn from_state(state: Arc<BeaconState>, log: Logger) -> Self {
        Self {
            cached_head: RwLock::new(Some(state)),
            log,
        }
    }

    /// Replace the head. Snapshots already handed out are unaffected.
    pub fn update_head(&self, state: Arc<BeaconState>) -> Result<(), BeaconChainError> {
        let slot = state.slot;
        let validator_count = state.validators.len();
        *self
            .cached_head
            .try_write_for(HEAD_LOCK_TIMEOUT)
            .ok_or(BeaconChainError::CanonicalHeadLockTimeout)? = Some(state);

        debug!(
            self.log,
            "Updated canonical head";
            "slot" => slot,
            "validators" => validator_count,
        );
        Ok(())
    }

    pub fn head_slot(&self) -> Option<Slot> {
        self.cached_head
            .try_read_for(HEAD_LOCK_TIMEOUT)
            .and_then(|head| head.as_ref().map(|state| state.slot))
    }
}

impl HeadStateProvider for CanonicalHead {
    fn head_state(&self) -> Result<Arc<BeaconState>, BeaconChainError> {
        self.cached_head
            .try_read_for(HEAD_LOCK_TIMEOUT)
            .ok_or(BeaconChainError::CanonicalHeadLockTimeout)?
            .clone()
            .ok_or(BeaconChainError::HeadUnavailable)
    }
}
