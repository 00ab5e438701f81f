//! A gateway wired to real collaborators, with a recording broadcaster standing in for the network.
use beacon_chain::test_utils::StateHarness;
use beacon_chain::CanonicalHead;
use http_api::{AdmissionGateway, GatewayConfig, Witness};
use logging::test_logger;
use network::{BroadcastError, Broadcaster, GossipKind, PubsubMessage};
use operation_pool::{
    InsertOutcome, OpPoolError, OperationPool, SlashingPool, VoluntaryExitPool,
};
use parking_lot::Mutex;
use state_processing::{AttesterSlashingInvalid, BlockOperationError, ConsensusValidator};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use types::{AttesterSlashing, BeaconState, ProposerSlashing, SignedVoluntaryExit, Slot};

pub const VALIDATOR_COUNT: usize = 16;

/// Records every broadcast, along with the number of objects the pool held at the time.
pub struct RecordingBroadcaster {
    pool: Arc<OperationPool>,
    fail: AtomicBool,
    messages: Mutex<Vec<PubsubMessage>>,
    pool_sizes: Mutex<Vec<usize>>,
}

impl RecordingBroadcaster {
    pub fn new(pool: Arc<OperationPool>) -> Self {
        Self {
            pool,
            fail: AtomicBool::new(false),
            messages: Mutex::new(vec![]),
            pool_sizes: Mutex::new(vec![]),
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<PubsubMessage> {
        self.messages.lock().clone()
    }

    pub fn pool_sizes(&self) -> Vec<usize> {
        self.pool_sizes.lock().clone()
    }
}

impl Broadcaster for RecordingBroadcaster {
    fn broadcast(&self, message: PubsubMessage) -> Result<(), BroadcastError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(BroadcastError::NetworkChannelClosed(message.kind()));
        }
        self.pool_sizes.lock().push(
            self.pool.num_attester_slashings()
                + self.pool.num_proposer_slashings()
                + self.pool.num_voluntary_exits(),
        );
        self.messages.lock().push(message);
        Ok(())
    }
}

pub type TestTypes = Witness<
    CanonicalHead,
    ConsensusValidator,
    OperationPool,
    OperationPool,
    RecordingBroadcaster,
>;

pub struct GatewayTester {
    pub harness: StateHarness,
    pub head: Arc<CanonicalHead>,
    pub pool: Arc<OperationPool>,
    pub broadcaster: Arc<RecordingBroadcaster>,
    pub gateway: Arc<AdmissionGateway<TestTypes>>,
}

impl GatewayTester {
    pub fn new(config: GatewayConfig) -> Self {
        let harness = StateHarness::new(VALIDATOR_COUNT);
        let head = Arc::new(CanonicalHead::from_state(
            harness.shared_state(),
            test_logger(),
        ));
        Self::with_head(harness, head, config)
    }

    /// A gateway whose canonical head has no state yet.
    pub fn without_head() -> Self {
        let harness = StateHarness::new(VALIDATOR_COUNT);
        let head = Arc::new(CanonicalHead::new(test_logger()));
        Self::with_head(harness, head, GatewayConfig::default())
    }

    fn with_head(harness: StateHarness, head: Arc<CanonicalHead>, config: GatewayConfig) -> Self {
        let pool = Arc::new(OperationPool::new(harness.spec.clone()));
        let broadcaster = Arc::new(RecordingBroadcaster::new(pool.clone()));
        let gateway = Arc::new(AdmissionGateway::new(
            head.clone(),
            Arc::new(ConsensusValidator::new(harness.spec.clone())),
            pool.clone(),
            pool.clone(),
            broadcaster.clone(),
            config,
            test_logger(),
        ));

        Self {
            harness,
            head,
            pool,
            broadcaster,
            gateway,
        }
    }

    pub fn pool_is_empty(&self) -> bool {
        self.pool.num_attester_slashings() == 0
            && self.pool.num_proposer_slashings() == 0
            && self.pool.num_voluntary_exits() == 0
    }
}

/// A pool that refuses every insert and never holds anything.
pub struct FailingPool;

impl FailingPool {
    fn error() -> OpPoolError {
        OpPoolError::GetSlashableIndices(BlockOperationError::invalid(
            AttesterSlashingInvalid::NoSlashableIndices,
        ))
    }
}

impl SlashingPool for FailingPool {
    fn insert_attester_slashing(
        &self,
        _: &BeaconState,
        _: AttesterSlashing,
    ) -> Result<InsertOutcome, OpPoolError> {
        Err(Self::error())
    }

    fn pending_attester_slashings(&self, _: &BeaconState, _: bool) -> Vec<AttesterSlashing> {
        vec![]
    }

    fn insert_proposer_slashing(
        &self,
        _: &BeaconState,
        _: ProposerSlashing,
    ) -> Result<InsertOutcome, OpPoolError> {
        Err(Self::error())
    }

    fn pending_proposer_slashings(&self, _: &BeaconState, _: bool) -> Vec<ProposerSlashing> {
        vec![]
    }

    fn mark_attester_slashing_published(&self, _: &AttesterSlashing) {}

    fn mark_proposer_slashing_published(&self, _: &ProposerSlashing) {}
}

impl VoluntaryExitPool for FailingPool {
    fn insert_voluntary_exit(
        &self,
        _: &BeaconState,
        _: SignedVoluntaryExit,
    ) -> Result<InsertOutcome, OpPoolError> {
        Err(Self::error())
    }

    fn pending_voluntary_exits(
        &self,
        _: &BeaconState,
        _: Slot,
        _: bool,
    ) -> Vec<SignedVoluntaryExit> {
        vec![]
    }

    fn mark_voluntary_exit_published(&self, _: &SignedVoluntaryExit) {}
}

pub fn broadcast_kinds(messages: &[PubsubMessage]) -> Vec<GossipKind> {
    messages.iter().map(PubsubMessage::kind).collect()
}
