use crate::common::{broadcast_kinds, FailingPool, GatewayTester, RecordingBroadcaster};
use beacon_chain::{BeaconChainError, CanonicalHead};
use eth2::types::{self as api_types, ConversionError};
use http_api::{
    AdmissionGateway, ErrorClass, GatewayConfig, GatewayError, InvalidObject, Witness,
};
use logging::test_logger;
use network::GossipKind;
use operation_pool::OperationPool;
use state_processing::{
    AttesterSlashingInvalid, BlockOperationError, ConsensusValidator, ExitInvalid,
    ProposerSlashingInvalid,
};
use std::sync::Arc;

fn tester() -> GatewayTester {
    GatewayTester::new(GatewayConfig::default())
}

#[test]
fn admitted_objects_are_pooled_then_broadcast() {
    let tester = tester();
    let harness = &tester.harness;
    let gateway = &tester.gateway;

    let attester_slashing = harness.make_attester_slashing(&[1, 2]);
    let proposer_slashing = harness.make_proposer_slashing(3);
    let exit = harness.make_voluntary_exit(4, harness.current_epoch());

    gateway
        .submit_attester_slashing(attester_slashing.clone().into())
        .unwrap();
    gateway
        .submit_proposer_slashing(proposer_slashing.clone().into())
        .unwrap();
    gateway.submit_voluntary_exit(exit.clone().into()).unwrap();

    assert_eq!(
        broadcast_kinds(&tester.broadcaster.messages()),
        vec![
            GossipKind::AttesterSlashing,
            GossipKind::ProposerSlashing,
            GossipKind::VoluntaryExit
        ]
    );
    // Each object was already in the pool when it was broadcast.
    assert_eq!(tester.broadcaster.pool_sizes(), vec![1, 2, 3]);

    assert_eq!(
        gateway.list_attester_slashings().unwrap(),
        vec![api_types::AttesterSlashing::from(attester_slashing)]
    );
    assert_eq!(
        gateway.list_proposer_slashings().unwrap(),
        vec![api_types::ProposerSlashing::from(proposer_slashing)]
    );
    assert_eq!(
        gateway.list_voluntary_exits().unwrap(),
        vec![api_types::SignedVoluntaryExit::from(exit)]
    );
}

#[test]
fn listing_preserves_submission_order() {
    let tester = tester();
    let harness = &tester.harness;

    let exits = [7, 2, 9]
        .iter()
        .map(|&index| harness.make_voluntary_exit(index, harness.current_epoch()))
        .collect::<Vec<_>>();
    for exit in &exits {
        tester
            .gateway
            .submit_voluntary_exit(exit.clone().into())
            .unwrap();
    }

    assert_eq!(
        tester.gateway.list_voluntary_exits().unwrap(),
        exits
            .into_iter()
            .map(api_types::SignedVoluntaryExit::from)
            .collect::<Vec<_>>()
    );
    // Listing has no side effects.
    assert_eq!(tester.pool.num_voluntary_exits(), 3);
    assert_eq!(tester.gateway.list_voluntary_exits().unwrap().len(), 3);
}

#[test]
fn slashing_broadcast_can_be_disabled() {
    let tester = GatewayTester::new(GatewayConfig {
        disable_broadcast_slashings: true,
    });
    let harness = &tester.harness;

    tester
        .gateway
        .submit_attester_slashing(harness.make_attester_slashing(&[0]).into())
        .unwrap();
    tester
        .gateway
        .submit_proposer_slashing(harness.make_proposer_slashing(1).into())
        .unwrap();
    assert!(tester.broadcaster.messages().is_empty());
    assert_eq!(tester.gateway.list_attester_slashings().unwrap().len(), 1);
    assert_eq!(tester.gateway.list_proposer_slashings().unwrap().len(), 1);

    // Exits are not affected by the flag.
    tester
        .gateway
        .submit_voluntary_exit(harness.make_voluntary_exit(2, harness.current_epoch()).into())
        .unwrap();
    assert_eq!(
        broadcast_kinds(&tester.broadcaster.messages()),
        vec![GossipKind::VoluntaryExit]
    );
}

#[test]
fn failed_broadcast_leaves_object_pooled() {
    let tester = tester();
    tester.broadcaster.set_failing(true);
    let slashing = tester.harness.make_proposer_slashing(5);

    let error = tester
        .gateway
        .submit_proposer_slashing(slashing.clone().into())
        .unwrap_err();
    assert!(matches!(error, GatewayError::BroadcastFailed(_)));
    assert_eq!(error.class(), ErrorClass::Internal);

    assert_eq!(
        tester.gateway.list_proposer_slashings().unwrap(),
        vec![api_types::ProposerSlashing::from(slashing)]
    );
}

#[test]
fn resubmission_after_failed_broadcast_is_broadcast() {
    let tester = tester();
    let harness = &tester.harness;
    let exit = harness.make_voluntary_exit(5, harness.current_epoch());
    let slashing = harness.make_attester_slashing(&[1, 2]);

    tester.broadcaster.set_failing(true);
    assert!(matches!(
        tester.gateway.submit_voluntary_exit(exit.clone().into()),
        Err(GatewayError::BroadcastFailed(_))
    ));
    assert!(matches!(
        tester
            .gateway
            .submit_attester_slashing(slashing.clone().into()),
        Err(GatewayError::BroadcastFailed(_))
    ));
    assert!(tester.broadcaster.messages().is_empty());

    tester.broadcaster.set_failing(false);
    tester
        .gateway
        .submit_voluntary_exit(exit.clone().into())
        .unwrap();
    tester
        .gateway
        .submit_attester_slashing(slashing.clone().into())
        .unwrap();
    assert_eq!(
        broadcast_kinds(&tester.broadcaster.messages()),
        vec![GossipKind::VoluntaryExit, GossipKind::AttesterSlashing]
    );

    // Once published, further resubmissions are not broadcast again.
    tester.gateway.submit_voluntary_exit(exit.into()).unwrap();
    tester
        .gateway
        .submit_attester_slashing(slashing.into())
        .unwrap();
    assert_eq!(tester.broadcaster.messages().len(), 2);
    assert_eq!(tester.gateway.list_voluntary_exits().unwrap().len(), 1);
    assert_eq!(tester.gateway.list_attester_slashings().unwrap().len(), 1);
}

#[test]
fn slashing_covering_several_pooled_slashings_is_listed() {
    let tester = tester();
    let harness = &tester.harness;

    for index in [1, 2] {
        tester
            .gateway
            .submit_attester_slashing(harness.make_attester_slashing(&[index]).into())
            .unwrap();
    }
    let both = harness.make_surround_vote_slashing(&[1, 2]);
    tester
        .gateway
        .submit_attester_slashing(both.clone().into())
        .unwrap();

    assert_eq!(
        tester.gateway.list_attester_slashings().unwrap(),
        vec![api_types::AttesterSlashing::from(both)]
    );
    assert_eq!(tester.broadcaster.messages().len(), 3);
}

#[test]
fn duplicate_submission_is_not_rebroadcast() {
    let tester = tester();
    let harness = &tester.harness;
    let exit = harness.make_voluntary_exit(6, harness.current_epoch());
    let slashing = harness.make_attester_slashing(&[3, 4]);

    for _ in 0..2 {
        tester
            .gateway
            .submit_voluntary_exit(exit.clone().into())
            .unwrap();
        tester
            .gateway
            .submit_attester_slashing(slashing.clone().into())
            .unwrap();
    }

    assert_eq!(tester.broadcaster.messages().len(), 2);
    assert_eq!(tester.gateway.list_voluntary_exits().unwrap().len(), 1);
    assert_eq!(tester.gateway.list_attester_slashings().unwrap().len(), 1);
}

#[test]
fn invalid_objects_never_reach_pool_or_network() {
    let tester = tester();
    let harness = &tester.harness;
    let gateway = &tester.gateway;

    let mut identical = harness.make_proposer_slashing(1);
    identical.signed_header_2 = identical.signed_header_1.clone();
    assert_eq!(
        gateway.submit_proposer_slashing(identical.into()),
        Err(GatewayError::InvalidObject(InvalidObject::ProposerSlashing(
            BlockOperationError::invalid(ProposerSlashingInvalid::ProposalsIdentical)
        )))
    );

    let mut not_slashable = harness.make_attester_slashing(&[1]);
    not_slashable.attestation_2 = not_slashable.attestation_1.clone();
    assert_eq!(
        gateway.submit_attester_slashing(not_slashable.into()),
        Err(GatewayError::InvalidObject(InvalidObject::AttesterSlashing(
            BlockOperationError::invalid(AttesterSlashingInvalid::NotSlashable)
        )))
    );

    let bad_signature = harness.make_voluntary_exit_with_bad_signature(2, harness.current_epoch());
    let error = gateway
        .submit_voluntary_exit(bad_signature.into())
        .unwrap_err();
    assert_eq!(
        error,
        GatewayError::InvalidObject(InvalidObject::VoluntaryExit(
            BlockOperationError::invalid(ExitInvalid::BadSignature)
        ))
    );
    assert_eq!(error.class(), ErrorClass::InvalidRequest);

    assert!(tester.pool_is_empty());
    assert!(tester.broadcaster.messages().is_empty());
}

#[test]
fn validation_is_repeatable() {
    let tester = tester();
    let future_exit = tester
        .harness
        .make_voluntary_exit(3, tester.harness.current_epoch() + 1);

    let first = tester
        .gateway
        .submit_voluntary_exit(future_exit.clone().into());
    let second = tester.gateway.submit_voluntary_exit(future_exit.into());

    assert!(matches!(first, Err(GatewayError::InvalidObject(_))));
    assert_eq!(first, second);
    assert!(tester.pool_is_empty());
}

#[test]
fn exit_for_unknown_validator() {
    let tester = tester();
    let exit = tester
        .harness
        .make_voluntary_exit(0, tester.harness.current_epoch());
    let mut exit = api_types::SignedVoluntaryExit::from(exit);
    if let Some(message) = exit.message.as_mut() {
        message.validator_index = 1_000;
    }

    let error = tester
        .gateway
        .submit_voluntary_exit(exit.clone())
        .unwrap_err();
    assert_eq!(error, GatewayError::UnknownValidator(1_000));
    assert_eq!(error.class(), ErrorClass::InvalidRequest);

    // An index too large for the platform's `usize` must not wrap onto a real validator.
    if let Some(message) = exit.message.as_mut() {
        message.validator_index = u64::MAX;
    }
    assert_eq!(
        tester.gateway.submit_voluntary_exit(exit),
        Err(GatewayError::UnknownValidator(u64::MAX))
    );
    assert!(tester.pool_is_empty());
    assert!(tester.broadcaster.messages().is_empty());
}

#[test]
fn malformed_objects() {
    let tester = tester();
    let harness = &tester.harness;

    let mut exit = api_types::SignedVoluntaryExit::from(
        harness.make_voluntary_exit(1, harness.current_epoch()),
    );
    exit.message = None;
    assert_eq!(
        tester.gateway.submit_voluntary_exit(exit),
        Err(GatewayError::MalformedObject(ConversionError::MissingField(
            "message"
        )))
    );

    let mut slashing = api_types::AttesterSlashing::from(harness.make_attester_slashing(&[1]));
    if let Some(attestation) = slashing.attestation_2.as_mut() {
        attestation.signature.truncate(48);
    }
    let error = tester
        .gateway
        .submit_attester_slashing(slashing)
        .unwrap_err();
    assert!(matches!(
        error,
        GatewayError::MalformedObject(ConversionError::InvalidSignature {
            field: "attestation_2.signature",
            ..
        })
    ));
    assert_eq!(error.class(), ErrorClass::InvalidRequest);

    assert!(tester.pool_is_empty());
}

#[test]
fn no_head_state() {
    let tester = GatewayTester::without_head();
    let harness = &tester.harness;
    let gateway = &tester.gateway;
    let unavailable = GatewayError::StateUnavailable(BeaconChainError::HeadUnavailable);

    assert_eq!(
        gateway.submit_attester_slashing(harness.make_attester_slashing(&[1]).into()),
        Err(unavailable.clone())
    );
    assert_eq!(
        gateway.submit_proposer_slashing(harness.make_proposer_slashing(1).into()),
        Err(unavailable.clone())
    );
    assert_eq!(
        gateway.submit_voluntary_exit(harness.make_voluntary_exit(1, harness.current_epoch()).into()),
        Err(unavailable.clone())
    );
    assert_eq!(gateway.list_attester_slashings(), Err(unavailable.clone()));
    assert_eq!(gateway.list_proposer_slashings(), Err(unavailable.clone()));
    assert_eq!(gateway.list_voluntary_exits(), Err(unavailable.clone()));
    assert_eq!(unavailable.class(), ErrorClass::Internal);

    assert!(tester.pool_is_empty());
    assert!(tester.broadcaster.messages().is_empty());

    // Once a head arrives the same submission succeeds.
    tester.head.update_head(harness.shared_state()).unwrap();
    gateway
        .submit_proposer_slashing(harness.make_proposer_slashing(1).into())
        .unwrap();
}

#[test]
fn pool_insert_failure() {
    let tester = tester();
    let harness = &tester.harness;
    let broadcaster = Arc::new(RecordingBroadcaster::new(Arc::new(OperationPool::new(
        harness.spec.clone(),
    ))));
    let gateway = AdmissionGateway::<
        Witness<CanonicalHead, ConsensusValidator, FailingPool, FailingPool, RecordingBroadcaster>,
    >::new(
        tester.head.clone(),
        Arc::new(ConsensusValidator::new(harness.spec.clone())),
        Arc::new(FailingPool),
        Arc::new(FailingPool),
        broadcaster.clone(),
        GatewayConfig::default(),
        test_logger(),
    );

    let error = gateway
        .submit_voluntary_exit(harness.make_voluntary_exit(1, harness.current_epoch()).into())
        .unwrap_err();
    assert!(matches!(error, GatewayError::PoolInsertFailed(_)));
    assert_eq!(error.class(), ErrorClass::Internal);

    assert!(matches!(
        gateway.submit_proposer_slashing(harness.make_proposer_slashing(2).into()),
        Err(GatewayError::PoolInsertFailed(_))
    ));
    assert!(broadcaster.messages().is_empty());
}
