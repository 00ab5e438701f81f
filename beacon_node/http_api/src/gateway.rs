//! Admission of externally submitted slashings and voluntary exits.
//!
//! Every submission follows the same pipeline against a single head state snapshot:
//!
//! 1. Fetch the head state.
//! 2. Convert the API object into its consensus representation.
//! 3. Verify it against the consensus rules.
//! 4. Insert it into the operation pool.
//! 5. Publish it to the network, unless the pool already holds a published copy.
//!
//! A failure at any step stops the pipeline. Nothing is rolled back: an object that fails to
//! broadcast stays in the pool, unpublished, and is broadcast again when it is resubmitted.
use crate::metrics;
use beacon_chain::{BeaconChainError, HeadStateProvider};
use eth2::types::{self as api_types, ConversionError};
use network::{BroadcastError, Broadcaster, PubsubMessage};
use operation_pool::{InsertOutcome, OpPoolError, SlashingPool, VoluntaryExitPool};
use serde::{Deserialize, Serialize};
use slog::{debug, error, warn, Logger};
use state_processing::{
    AttesterSlashingValidationError, ExitValidationError, ObjectValidator,
    ProposerSlashingValidationError,
};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use strum::{Display, IntoStaticStr};
use types::{AttesterSlashing, BeaconState, ProposerSlashing, SignedVoluntaryExit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Admit slashings into the pool without publishing them to the network.
    pub disable_broadcast_slashings: bool,
}

/// The collaborators of an `AdmissionGateway`.
pub trait GatewayTypes: Send + Sync + 'static {
    type HeadState: HeadStateProvider;
    type Validator: ObjectValidator;
    type SlashingPool: SlashingPool;
    type ExitPool: VoluntaryExitPool;
    type Broadcaster: Broadcaster;
}

/// Binds concrete collaborators to `GatewayTypes`.
pub struct Witness<THead, TValidator, TSlashingPool, TExitPool, TBroadcaster>(
    PhantomData<(THead, TValidator, TSlashingPool, TExitPool, TBroadcaster)>,
);

impl<THead, TValidator, TSlashingPool, TExitPool, TBroadcaster> GatewayTypes
    for Witness<THead, TValidator, TSlashingPool, TExitPool, TBroadcaster>
where
    THead: HeadStateProvider,
    TValidator: ObjectValidator,
    TSlashingPool: SlashingPool,
    TExitPool: VoluntaryExitPool,
    TBroadcaster: Broadcaster,
{
    type HeadState = THead;
    type Validator = TValidator;
    type SlashingPool = TSlashingPool;
    type ExitPool = TExitPool;
    type Broadcaster = TBroadcaster;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ObjectKind {
    AttesterSlashing,
    ProposerSlashing,
    VoluntaryExit,
}

/// Why the consensus rules rejected an object.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidObject {
    AttesterSlashing(AttesterSlashingValidationError),
    ProposerSlashing(ProposerSlashingValidationError),
    VoluntaryExit(ExitValidationError),
}

impl fmt::Display for InvalidObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidObject::AttesterSlashing(e) => write!(f, "invalid attester slashing: {}", e),
            InvalidObject::ProposerSlashing(e) => write!(f, "invalid proposer slashing: {}", e),
            InvalidObject::VoluntaryExit(e) => write!(f, "invalid voluntary exit: {}", e),
        }
    }
}

/// Coarse grouping of `Error` for callers that only need to know who is at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Resubmitting the same object will fail again.
    InvalidRequest,
    /// The node could not complete the request.
    Internal,
}

#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Error {
    StateUnavailable(BeaconChainError),
    MalformedObject(ConversionError),
    UnknownValidator(u64),
    InvalidObject(InvalidObject),
    PoolInsertFailed(OpPoolError),
    /// The object was pooled, but publishing it to the network failed.
    BroadcastFailed(BroadcastError),
}

impl Error {
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::MalformedObject(_) | Error::UnknownValidator(_) | Error::InvalidObject(_) => {
                ErrorClass::InvalidRequest
            }
            Error::StateUnavailable(_) | Error::PoolInsertFailed(_) | Error::BroadcastFailed(_) => {
                ErrorClass::Internal
            }
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::StateUnavailable(e) => write!(f, "could not get head state: {}", e),
            Error::MalformedObject(e) => write!(f, "malformed object: {}", e),
            Error::UnknownValidator(index) => write!(f, "unknown validator index {}", index),
            Error::InvalidObject(e) => write!(f, "{}", e),
            Error::PoolInsertFailed(e) => write!(f, "could not insert into pool: {}", e),
            Error::BroadcastFailed(e) => write!(f, "pooled but could not broadcast: {}", e),
        }
    }
}

pub struct AdmissionGateway<T: GatewayTypes> {
    head: Arc<T::HeadState>,
    validator: Arc<T::Validator>,
    slashing_pool: Arc<T::SlashingPool>,
    exit_pool: Arc<T::ExitPool>,
    broadcaster: Arc<T::Broadcaster>,
    config: GatewayConfig,
    log: Logger,
}

impl<T: GatewayTypes> AdmissionGateway<T> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        head: Arc<T::HeadState>,
        validator: Arc<T::Validator>,
        slashing_pool: Arc<T::SlashingPool>,
        exit_pool: Arc<T::ExitPool>,
        broadcaster: Arc<T::Broadcaster>,
        config: GatewayConfig,
        log: Logger,
    ) -> Self {
        Self {
            head,
            validator,
            slashing_pool,
            exit_pool,
            broadcaster,
            config,
            log,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn head_state(&self) -> Result<Arc<BeaconState>, Error> {
        self.head.head_state().map_err(Error::StateUnavailable)
    }

    /// All attester slashings in the pool, in pool order.
    pub fn list_attester_slashings(&self) -> Result<Vec<api_types::AttesterSlashing>, Error> {
        let state = self.head_state()?;
        Ok(self
            .slashing_pool
            .pending_attester_slashings(&state, true)
            .into_iter()
            .map(Into::into)
            .collect())
    }

    pub fn submit_attester_slashing(
        &self,
        slashing: api_types::AttesterSlashing,
    ) -> Result<(), Error> {
        let kind = ObjectKind::AttesterSlashing;
        let _timer = metrics::start_timer_vec(&metrics::POOL_SUBMISSION_TIMES, &[kind.into()]);
        let result = self.admit_attester_slashing(slashing);
        self.observe(kind, &result);
        result
    }

    fn admit_attester_slashing(&self, slashing: api_types::AttesterSlashing) -> Result<(), Error> {
        let state = self.head_state()?;
        let slashing = AttesterSlashing::try_from(slashing).map_err(Error::MalformedObject)?;

        self.validator
            .verify_attester_slashing(&state, &slashing)
            .map_err(|e| Error::InvalidObject(InvalidObject::AttesterSlashing(e)))?;

        let outcome = self
            .slashing_pool
            .insert_attester_slashing(&state, slashing.clone())
            .map_err(Error::PoolInsertFailed)?;

        let message = PubsubMessage::AttesterSlashing(Box::new(slashing.clone()));
        if self.publish(outcome, !self.config.disable_broadcast_slashings, message)? {
            self.slashing_pool.mark_attester_slashing_published(&slashing);
        }
        Ok(())
    }

    /// All proposer slashings in the pool, in pool order.
    pub fn list_proposer_slashings(&self) -> Result<Vec<api_types::ProposerSlashing>, Error> {
        let state = self.head_state()?;
        Ok(self
            .slashing_pool
            .pending_proposer_slashings(&state, true)
            .into_iter()
            .map(Into::into)
            .collect())
    }

    pub fn submit_proposer_slashing(
        &self,
        slashing: api_types::ProposerSlashing,
    ) -> Result<(), Error> {
        let kind = ObjectKind::ProposerSlashing;
        let _timer = metrics::start_timer_vec(&metrics::POOL_SUBMISSION_TIMES, &[kind.into()]);
        let result = self.admit_proposer_slashing(slashing);
        self.observe(kind, &result);
        result
    }

    fn admit_proposer_slashing(&self, slashing: api_types::ProposerSlashing) -> Result<(), Error> {
        let state = self.head_state()?;
        let slashing = ProposerSlashing::try_from(slashing).map_err(Error::MalformedObject)?;

        self.validator
            .verify_proposer_slashing(&state, &slashing)
            .map_err(|e| Error::InvalidObject(InvalidObject::ProposerSlashing(e)))?;

        let outcome = self
            .slashing_pool
            .insert_proposer_slashing(&state, slashing.clone())
            .map_err(Error::PoolInsertFailed)?;

        let message = PubsubMessage::ProposerSlashing(Box::new(slashing.clone()));
        if self.publish(outcome, !self.config.disable_broadcast_slashings, message)? {
            self.slashing_pool.mark_proposer_slashing_published(&slashing);
        }
        Ok(())
    }

    /// All voluntary exits in the pool that are includable at the head slot, in pool order.
    pub fn list_voluntary_exits(&self) -> Result<Vec<api_types::SignedVoluntaryExit>, Error> {
        let state = self.head_state()?;
        Ok(self
            .exit_pool
            .pending_voluntary_exits(&state, state.slot, true)
            .into_iter()
            .map(Into::into)
            .collect())
    }

    pub fn submit_voluntary_exit(&self, exit: api_types::SignedVoluntaryExit) -> Result<(), Error> {
        let kind = ObjectKind::VoluntaryExit;
        let _timer = metrics::start_timer_vec(&metrics::POOL_SUBMISSION_TIMES, &[kind.into()]);
        let result = self.admit_voluntary_exit(exit);
        self.observe(kind, &result);
        result
    }

    fn admit_voluntary_exit(&self, exit: api_types::SignedVoluntaryExit) -> Result<(), Error> {
        let state = self.head_state()?;
        let exit = SignedVoluntaryExit::try_from(exit).map_err(Error::MalformedObject)?;

        let validator_index = exit.message.validator_index;
        let validator = state
            .get_validator(validator_index)
            .map_err(|_| Error::UnknownValidator(validator_index))?;

        self.validator
            .verify_exit_and_signature(
                validator,
                state.slot,
                &state.fork,
                &exit,
                state.genesis_validators_root,
            )
            .map_err(|e| Error::InvalidObject(InvalidObject::VoluntaryExit(e)))?;

        let outcome = self
            .exit_pool
            .insert_voluntary_exit(&state, exit.clone())
            .map_err(Error::PoolInsertFailed)?;

        // Exits are always published.
        let message = PubsubMessage::VoluntaryExit(Box::new(exit.clone()));
        if self.publish(outcome, true, message)? {
            self.exit_pool.mark_voluntary_exit_published(&exit);
        }
        Ok(())
    }

    /// Broadcasts `message` if the pool has no published copy of it.
    ///
    /// Returns `true` if the message was handed to the network.
    fn publish(
        &self,
        outcome: InsertOutcome,
        broadcast_enabled: bool,
        message: PubsubMessage,
    ) -> Result<bool, Error> {
        let kind = message.kind();

        if !outcome.should_publish() {
            debug!(
                self.log,
                "Object already published";
                "kind" => %kind,
            );
            return Ok(false);
        }

        if !broadcast_enabled {
            debug!(
                self.log,
                "Not broadcasting object";
                "reason" => "broadcast disabled",
                "kind" => %kind,
            );
            return Ok(false);
        }

        if !outcome.is_new() {
            debug!(
                self.log,
                "Retrying broadcast of unpublished object";
                "kind" => %kind,
            );
        }

        self.broadcaster
            .broadcast(message)
            .map_err(Error::BroadcastFailed)?;
        metrics::inc_counter_vec(&metrics::POOL_BROADCASTS_TOTAL, &[kind.into()]);

        Ok(true)
    }

    fn observe(&self, kind: ObjectKind, result: &Result<(), Error>) {
        let outcome = match result {
            Ok(()) => {
                debug!(
                    self.log,
                    "Admitted object to the pool";
                    "kind" => %kind,
                );
                "admitted"
            }
            Err(e) => {
                match e {
                    Error::UnknownValidator(validator_index) => debug!(
                        self.log,
                        "Object references unknown validator";
                        "validator_index" => validator_index,
                        "kind" => %kind,
                    ),
                    Error::BroadcastFailed(error) => warn!(
                        self.log,
                        "Pooled object could not be broadcast";
                        "error" => %error,
                        "kind" => %kind,
                    ),
                    e if e.class() == ErrorClass::InvalidRequest => debug!(
                        self.log,
                        "Rejected object";
                        "reason" => %e,
                        "kind" => %kind,
                    ),
                    e => error!(
                        self.log,
                        "Failed to process object";
                        "error" => %e,
                        "kind" => %kind,
                    ),
                }
                e.into()
            }
        };
        metrics::inc_counter_vec(&metrics::POOL_SUBMISSIONS_TOTAL, &[kind.into(), outcome]);
    }
}
