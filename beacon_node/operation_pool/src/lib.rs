//! Pools of slashings and voluntary exits waiting for block inclusion.
//!
//! The pools only store operations; they trust their callers to have verified them. Each pool
//! holds its own lock, so inserts and reads for different kinds never contend.
mod attester_slashing;

pub use attester_slashing::AttesterSlashingEntry;

use hashlink::LinkedHashMap;
use parking_lot::RwLock;
use state_processing::{get_slashable_indices, AttesterSlashingValidationError};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use types::{
    AttesterSlashing, BeaconState, ChainSpec, ProposerSlashing, SignedVoluntaryExit, Slot,
};

#[derive(Debug, Clone, PartialEq)]
pub enum OpPoolError {
    GetSlashableIndices(AttesterSlashingValidationError),
}

impl fmt::Display for OpPoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpPoolError::GetSlashableIndices(e) => {
                write!(f, "unable to compute slashable indices: {}", e)
            }
        }
    }
}

/// The result of inserting an operation into a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The operation adds something the pool did not already have.
    New,
    /// The pool already holds an operation with the same identity. Nothing changed.
    AlreadyKnown {
        /// Whether the held operation has been marked as published.
        published: bool,
    },
}

impl InsertOutcome {
    pub fn is_new(self) -> bool {
        self == InsertOutcome::New
    }

    /// `false` only if the pool already holds a published operation with the same identity.
    pub fn should_publish(self) -> bool {
        !matches!(self, InsertOutcome::AlreadyKnown { published: true })
    }
}

/// An operation held in a pool, and whether it has been published.
#[derive(Debug, Clone, PartialEq)]
struct PooledOperation<T> {
    operation: T,
    published: bool,
}

impl<T> PooledOperation<T> {
    fn new(operation: T) -> Self {
        Self {
            operation,
            published: false,
        }
    }
}

/// Storage for pending attester and proposer slashings.
///
/// Implementations must be safe for concurrent use. Inserts take the head state that the caller
/// verified the operation against, so merging decisions agree with verification.
///
/// Operations are unpublished when inserted. Inserting a duplicate of an unpublished operation
/// reports `AlreadyKnown { published: false }` until one of the `mark_*_published` methods is
/// called for it.
pub trait SlashingPool: Send + Sync + 'static {
    fn insert_attester_slashing(
        &self,
        state: &BeaconState,
        slashing: AttesterSlashing,
    ) -> Result<InsertOutcome, OpPoolError>;

    /// Slashings that are still useful against `state`, in pool order. When `unlimited` is false
    /// the result is capped at what a single block can hold.
    fn pending_attester_slashings(
        &self,
        state: &BeaconState,
        unlimited: bool,
    ) -> Vec<AttesterSlashing>;

    fn insert_proposer_slashing(
        &self,
        state: &BeaconState,
        slashing: ProposerSlashing,
    ) -> Result<InsertOutcome, OpPoolError>;

    fn pending_proposer_slashings(
        &self,
        state: &BeaconState,
        unlimited: bool,
    ) -> Vec<ProposerSlashing>;

    /// Record that `slashing` has been published. Only an entry equal to `slashing` is marked.
    fn mark_attester_slashing_published(&self, slashing: &AttesterSlashing);

    /// Record that a slashing of this proposer has been published.
    fn mark_proposer_slashing_published(&self, slashing: &ProposerSlashing);
}

/// Storage for pending voluntary exits. Same concurrency contract as `SlashingPool`.
pub trait VoluntaryExitPool: Send + Sync + 'static {
    fn insert_voluntary_exit(
        &self,
        state: &BeaconState,
        exit: SignedVoluntaryExit,
    ) -> Result<InsertOutcome, OpPoolError>;

    /// Exits that can be included in a block at `slot`, in pool order.
    fn pending_voluntary_exits(
        &self,
        state: &BeaconState,
        slot: Slot,
        unlimited: bool,
    ) -> Vec<SignedVoluntaryExit>;

    /// Record that an exit for this validator has been published.
    fn mark_voluntary_exit_published(&self, exit: &SignedVoluntaryExit);
}

pub struct OperationPool {
    /// Attester slashings, in insertion order.
    attester_slashings: RwLock<Vec<AttesterSlashingEntry>>,
    /// Map from proposer index to slashing.
    proposer_slashings: RwLock<LinkedHashMap<u64, PooledOperation<ProposerSlashing>>>,
    /// Map from exiting validator to their exit data.
    voluntary_exits: RwLock<LinkedHashMap<u64, PooledOperation<SignedVoluntaryExit>>>,
    spec: Arc<ChainSpec>,
}

impl OperationPool {
    /// Create a new operation pool.
    pub fn new(spec: Arc<ChainSpec>) -> Self {
        Self {
            attester_slashings: RwLock::new(vec![]),
            proposer_slashings: RwLock::new(LinkedHashMap::new()),
            voluntary_exits: RwLock::new(LinkedHashMap::new()),
            spec,
        }
    }

    fn limit(unlimited: bool, max: u64) -> usize {
        if unlimited {
            usize::MAX
        } else {
            usize::try_from(max).unwrap_or(usize::MAX)
        }
    }

    /// Prune attester slashings for which no validator is slashable any more.
    pub fn prune_attester_slashings(&self, head_state: &BeaconState) {
        let epoch = head_state.current_epoch(&self.spec);
        self.attester_slashings
            .write()
            .retain(|entry| entry.still_slashable(head_state, epoch).next().is_some());
    }

    /// Prune proposer slashings for validators which are exited or already slashed.
    pub fn prune_proposer_slashings(&self, head_state: &BeaconState) {
        let epoch = head_state.current_epoch(&self.spec);
        self.proposer_slashings.write().retain(|&index, _| {
            head_state
                .get_validator(index)
                .map_or(false, |validator| validator.is_slashable_at(epoch))
        });
    }

    /// Prune exits for validators whose exit has been processed on chain.
    pub fn prune_voluntary_exits(&self, head_state: &BeaconState) {
        let far_future_epoch = self.spec.far_future_epoch;
        self.voluntary_exits.write().retain(|&index, _| {
            head_state
                .get_validator(index)
                .map_or(false, |validator| {
                    !validator.has_initiated_exit(far_future_epoch)
                })
        });
    }

    /// Prune all types of transactions given the latest head state.
    pub fn prune_all(&self, head_state: &BeaconState) {
        self.prune_attester_slashings(head_state);
        self.prune_proposer_slashings(head_state);
        self.prune_voluntary_exits(head_state);
    }

    /// Total number of attester slashings in the pool.
    pub fn num_attester_slashings(&self) -> usize {
        self.attester_slashings.read().len()
    }

    /// Total number of proposer slashings in the pool.
    pub fn num_proposer_slashings(&self) -> usize {
        self.proposer_slashings.read().len()
    }

    /// Total number of voluntary exits in the pool.
    pub fn num_voluntary_exits(&self) -> usize {
        self.voluntary_exits.read().len()
    }
}

impl SlashingPool for OperationPool {
    fn insert_attester_slashing(
        &self,
        state: &BeaconState,
        slashing: AttesterSlashing,
    ) -> Result<InsertOutcome, OpPoolError> {
        let slashable_indices = get_slashable_indices(state, &slashing, &self.spec)
            .map_err(OpPoolError::GetSlashableIndices)?;
        let entry = AttesterSlashingEntry::new(slashing, slashable_indices);

        let mut attester_slashings = self.attester_slashings.write();

        if let Some(existing) = attester_slashings
            .iter()
            .find(|existing| entry.is_covered_by(&existing.slashable_indices))
        {
            return Ok(InsertOutcome::AlreadyKnown {
                published: existing.published,
            });
        }

        // Entries that slash nothing beyond the new slashing are superseded by it.
        attester_slashings.retain(|existing| !existing.is_covered_by(&entry.slashable_indices));
        attester_slashings.push(entry);

        Ok(InsertOutcome::New)
    }

    fn pending_attester_slashings(
        &self,
        state: &BeaconState,
        unlimited: bool,
    ) -> Vec<AttesterSlashing> {
        let epoch = state.current_epoch(&self.spec);
        let limit = Self::limit(unlimited, self.spec.max_attester_slashings);

        let mut to_be_slashed = HashSet::new();
        let mut pending = vec![];
        for entry in self.attester_slashings.read().iter() {
            if pending.len() >= limit {
                break;
            }
            let fresh = entry
                .still_slashable(state, epoch)
                .filter(|index| !to_be_slashed.contains(index))
                .collect::<Vec<_>>();
            if fresh.is_empty() {
                continue;
            }
            to_be_slashed.extend(fresh);
            pending.push(entry.slashing.clone());
        }
        pending
    }

    fn insert_proposer_slashing(
        &self,
        _state: &BeaconState,
        slashing: ProposerSlashing,
    ) -> Result<InsertOutcome, OpPoolError> {
        let mut proposer_slashings = self.proposer_slashings.write();
        let proposer_index = slashing.proposer_index();
        if let Some(existing) = proposer_slashings.get(&proposer_index) {
            return Ok(InsertOutcome::AlreadyKnown {
                published: existing.published,
            });
        }
        proposer_slashings.insert(proposer_index, PooledOperation::new(slashing));
        Ok(InsertOutcome::New)
    }

    fn pending_proposer_slashings(
        &self,
        state: &BeaconState,
        unlimited: bool,
    ) -> Vec<ProposerSlashing> {
        let epoch = state.current_epoch(&self.spec);
        let limit = Self::limit(unlimited, self.spec.max_proposer_slashings);

        self.proposer_slashings
            .read()
            .iter()
            .filter(|(&index, _)| {
                state
                    .get_validator(index)
                    .map_or(false, |validator| validator.is_slashable_at(epoch))
            })
            .map(|(_, pooled)| pooled.operation.clone())
            .take(limit)
            .collect()
    }

    fn mark_attester_slashing_published(&self, slashing: &AttesterSlashing) {
        for entry in self
            .attester_slashings
            .write()
            .iter_mut()
            .filter(|entry| entry.slashing == *slashing)
        {
            entry.published = true;
        }
    }

    fn mark_proposer_slashing_published(&self, slashing: &ProposerSlashing) {
        if let Some(pooled) = self
            .proposer_slashings
            .write()
            .get_mut(&slashing.proposer_index())
        {
            pooled.published = true;
        }
    }
}

impl VoluntaryExitPool for OperationPool {
    fn insert_voluntary_exit(
        &self,
        _state: &BeaconState,
        exit: SignedVoluntaryExit,
    ) -> Result<InsertOutcome, OpPoolError> {
        let mut voluntary_exits = self.voluntary_exits.write();
        let validator_index = exit.message.validator_index;
        if let Some(existing) = voluntary_exits.get(&validator_index) {
            return Ok(InsertOutcome::AlreadyKnown {
                published: existing.published,
            });
        }
        voluntary_exits.insert(validator_index, PooledOperation::new(exit));
        Ok(InsertOutcome::New)
    }

    fn pending_voluntary_exits(
        &self,
        state: &BeaconState,
        slot: Slot,
        unlimited: bool,
    ) -> Vec<SignedVoluntaryExit> {
        let epoch = slot.epoch(self.spec.slots_per_epoch);
        let far_future_epoch = self.spec.far_future_epoch;
        let limit = Self::limit(unlimited, self.spec.max_voluntary_exits);

        self.voluntary_exits
            .read()
            .iter()
            .filter(|(&index, pooled)| {
                pooled.operation.message.epoch <= epoch
                    && state
                        .get_validator(index)
                        .map_or(false, |validator| {
                            !validator.has_initiated_exit(far_future_epoch)
                        })
            })
            .map(|(_, pooled)| pooled.operation.clone())
            .take(limit)
            .collect()
    }

    fn mark_voluntary_exit_published(&self, exit: &SignedVoluntaryExit) {
        if let Some(pooled) = self
            .voluntary_exits
            .write()
            .get_mut(&exit.message.validator_index)
        {
            pooled.published = true;
        }
    }
}

#[cfg(test)]
mod release_tests {
    use super::*;
    use beacon_chain::test_utils::StateHarness;
    use maplit::btreeset;
    use state_processing::{AttesterSlashingInvalid, BlockOperationError};
    use std::thread;

    fn pool(harness: &StateHarness) -> OperationPool {
        OperationPool::new(harness.spec.clone())
    }

    #[test]
    fn attester_slashing_dedup() {
        let harness = StateHarness::new(16);
        let op_pool = pool(&harness);
        let state = &harness.state;

        let slashing = harness.make_attester_slashing(&[1, 2]);
        assert_eq!(
            op_pool.insert_attester_slashing(state, slashing.clone()),
            Ok(InsertOutcome::New)
        );
        assert_eq!(
            op_pool.insert_attester_slashing(state, slashing.clone()),
            Ok(InsertOutcome::AlreadyKnown { published: false })
        );

        // A different slashing over a subset of the same validators adds nothing.
        let subset = harness.make_surround_vote_slashing(&[2]);
        assert_eq!(
            op_pool.insert_attester_slashing(state, subset),
            Ok(InsertOutcome::AlreadyKnown { published: false })
        );

        assert_eq!(op_pool.num_attester_slashings(), 1);
        assert_eq!(
            op_pool.pending_attester_slashings(state, true),
            vec![slashing]
        );
    }

    #[test]
    fn attester_slashing_superset_supersedes() {
        let harness = StateHarness::new(16);
        let op_pool = pool(&harness);
        let state = &harness.state;

        let small = harness.make_attester_slashing(&[1, 2]);
        let other = harness.make_attester_slashing(&[5]);
        let large = harness.make_surround_vote_slashing(&[1, 2, 3]);

        op_pool.insert_attester_slashing(state, small).unwrap();
        op_pool.insert_attester_slashing(state, other.clone()).unwrap();
        assert_eq!(
            op_pool.insert_attester_slashing(state, large.clone()),
            Ok(InsertOutcome::New)
        );

        let entries = op_pool.attester_slashings.read().clone();
        assert_eq!(
            entries
                .iter()
                .map(|entry| entry.slashable_indices.clone())
                .collect::<Vec<_>>(),
            vec![btreeset! {5}, btreeset! {1, 2, 3}]
        );
        assert_eq!(
            op_pool.pending_attester_slashings(state, true),
            vec![other, large]
        );
    }

    #[test]
    fn attester_slashing_overlap_is_kept() {
        let harness = StateHarness::new(16);
        let op_pool = pool(&harness);
        let state = &harness.state;

        op_pool
            .insert_attester_slashing(state, harness.make_attester_slashing(&[1, 2]))
            .unwrap();
        assert_eq!(
            op_pool.insert_attester_slashing(state, harness.make_surround_vote_slashing(&[2, 3])),
            Ok(InsertOutcome::New)
        );
        assert_eq!(op_pool.pending_attester_slashings(state, true).len(), 2);
    }

    #[test]
    fn attester_slashing_covering_several_entries_replaces_them() {
        let harness = StateHarness::new(16);
        let op_pool = pool(&harness);
        let state = &harness.state;

        op_pool
            .insert_attester_slashing(state, harness.make_attester_slashing(&[1]))
            .unwrap();
        op_pool
            .insert_attester_slashing(state, harness.make_attester_slashing(&[2]))
            .unwrap();

        // No single entry slashes both validators, so this is new even though together they do.
        let both = harness.make_surround_vote_slashing(&[1, 2]);
        assert_eq!(
            op_pool.insert_attester_slashing(state, both.clone()),
            Ok(InsertOutcome::New)
        );
        assert_eq!(op_pool.pending_attester_slashings(state, true), vec![both]);
    }

    #[test]
    fn published_operations() {
        let harness = StateHarness::new(16);
        let op_pool = pool(&harness);
        let state = &harness.state;
        let unpublished = InsertOutcome::AlreadyKnown { published: false };
        let published = InsertOutcome::AlreadyKnown { published: true };

        let attester_slashing = harness.make_attester_slashing(&[1, 2]);
        let proposer_slashing = harness.make_proposer_slashing(3);
        let exit = harness.make_voluntary_exit(4, harness.current_epoch());

        for _ in 0..2 {
            op_pool
                .insert_attester_slashing(state, attester_slashing.clone())
                .unwrap();
            op_pool
                .insert_proposer_slashing(state, proposer_slashing.clone())
                .unwrap();
            op_pool.insert_voluntary_exit(state, exit.clone()).unwrap();
        }
        assert_eq!(
            op_pool.insert_attester_slashing(state, attester_slashing.clone()),
            Ok(unpublished)
        );
        assert!(unpublished.should_publish());

        op_pool.mark_attester_slashing_published(&attester_slashing);
        op_pool.mark_proposer_slashing_published(&proposer_slashing);
        op_pool.mark_voluntary_exit_published(&exit);

        assert_eq!(
            op_pool.insert_attester_slashing(state, attester_slashing),
            Ok(published)
        );
        // A smaller slashing covered by a published entry is also known and published.
        assert_eq!(
            op_pool.insert_attester_slashing(state, harness.make_surround_vote_slashing(&[2])),
            Ok(published)
        );
        assert_eq!(
            op_pool.insert_proposer_slashing(state, proposer_slashing),
            Ok(published)
        );
        assert_eq!(op_pool.insert_voluntary_exit(state, exit), Ok(published));
        assert!(!published.should_publish());
        assert!(InsertOutcome::New.should_publish());
    }

    #[test]
    fn attester_slashing_nothing_slashable() {
        let mut harness = StateHarness::new(16);
        harness.slash_validator(4);
        let op_pool = pool(&harness);

        assert_eq!(
            op_pool.insert_attester_slashing(&harness.state, harness.make_attester_slashing(&[4])),
            Err(OpPoolError::GetSlashableIndices(BlockOperationError::invalid(
                AttesterSlashingInvalid::NoSlashableIndices
            )))
        );
        assert_eq!(op_pool.num_attester_slashings(), 0);
    }

    #[test]
    fn attester_slashing_limit_and_staleness() {
        let mut harness = StateHarness::new(16);
        let op_pool = pool(&harness);

        for index in 0..4 {
            op_pool
                .insert_attester_slashing(&harness.state, harness.make_attester_slashing(&[index]))
                .unwrap();
        }
        assert_eq!(op_pool.pending_attester_slashings(&harness.state, true).len(), 4);
        assert_eq!(
            op_pool.pending_attester_slashings(&harness.state, false).len(),
            harness.spec.max_attester_slashings as usize
        );

        // Once a validator is slashed on chain its slashing is no longer pending.
        harness.slash_validator(0);
        assert_eq!(op_pool.pending_attester_slashings(&harness.state, true).len(), 3);
        assert_eq!(op_pool.num_attester_slashings(), 4);

        op_pool.prune_attester_slashings(&harness.state);
        assert_eq!(op_pool.num_attester_slashings(), 3);
    }

    #[test]
    fn proposer_slashings() {
        let mut harness = StateHarness::new(32);
        let op_pool = pool(&harness);

        for index in 0..20 {
            assert_eq!(
                op_pool.insert_proposer_slashing(&harness.state, harness.make_proposer_slashing(index)),
                Ok(InsertOutcome::New)
            );
        }
        assert_eq!(
            op_pool.insert_proposer_slashing(&harness.state, harness.make_proposer_slashing(3)),
            Ok(InsertOutcome::AlreadyKnown { published: false })
        );

        let pending = op_pool.pending_proposer_slashings(&harness.state, true);
        assert_eq!(
            pending.iter().map(|s| s.proposer_index()).collect::<Vec<_>>(),
            (0..20).collect::<Vec<_>>()
        );
        assert_eq!(
            op_pool.pending_proposer_slashings(&harness.state, false).len(),
            harness.spec.max_proposer_slashings as usize
        );

        harness.slash_validator(0);
        op_pool.prune_proposer_slashings(&harness.state);
        assert_eq!(op_pool.num_proposer_slashings(), 19);
    }

    #[test]
    fn voluntary_exits() {
        let mut harness = StateHarness::new(8);
        let op_pool = pool(&harness);
        let current_epoch = harness.current_epoch();

        let now = harness.make_voluntary_exit(1, current_epoch);
        let later = harness.make_voluntary_exit(2, current_epoch + 3);
        assert_eq!(
            op_pool.insert_voluntary_exit(&harness.state, now.clone()),
            Ok(InsertOutcome::New)
        );
        assert_eq!(
            op_pool.insert_voluntary_exit(&harness.state, later.clone()),
            Ok(InsertOutcome::New)
        );
        assert_eq!(
            op_pool.insert_voluntary_exit(&harness.state, now.clone()),
            Ok(InsertOutcome::AlreadyKnown { published: false })
        );

        let slot = harness.state.slot;
        assert_eq!(
            op_pool.pending_voluntary_exits(&harness.state, slot, true),
            vec![now.clone()]
        );
        let later_slot = (current_epoch + 3).start_slot(harness.spec.slots_per_epoch);
        assert_eq!(
            op_pool.pending_voluntary_exits(&harness.state, later_slot, true),
            vec![now, later]
        );

        harness.initiate_validator_exit(1, current_epoch + 5);
        op_pool.prune_voluntary_exits(&harness.state);
        assert_eq!(op_pool.num_voluntary_exits(), 1);
    }

    #[test]
    fn concurrent_inserts() {
        let harness = StateHarness::new(16);
        let op_pool = pool(&harness);
        let exits = (0..16)
            .map(|index| harness.make_voluntary_exit(index, harness.current_epoch()))
            .collect::<Vec<_>>();

        thread::scope(|scope| {
            for chunk in exits.chunks(4) {
                let op_pool = &op_pool;
                let state = &harness.state;
                scope.spawn(move || {
                    for exit in chunk {
                        // Each exit is inserted twice; only one insert can be new.
                        op_pool.insert_voluntary_exit(state, exit.clone()).unwrap();
                        op_pool.insert_voluntary_exit(state, exit.clone()).unwrap();
                    }
                });
            }
        });

        assert_eq!(op_pool.num_voluntary_exits(), 16);
    }
}
