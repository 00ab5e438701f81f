//! Operations published on gossipsub topics.
use std::fmt;
use strum::IntoStaticStr;
use types::{AttesterSlashing, ProposerSlashing, SignedVoluntaryExit};

/// The gossipsub topics this node publishes operations on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum GossipKind {
    /// Topic for publishing voluntary exits.
    VoluntaryExit,
    /// Topic for publishing block proposer slashings.
    ProposerSlashing,
    /// Topic for publishing attester slashings.
    AttesterSlashing,
}

impl fmt::Display for GossipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &'static str = self.into();
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PubsubMessage {
    /// Gossipsub message providing notification of a voluntary exit.
    VoluntaryExit(Box<SignedVoluntaryExit>),
    /// Gossipsub message providing notification of a new proposer slashing.
    ProposerSlashing(Box<ProposerSlashing>),
    /// Gossipsub message providing notification of a new attester slashing.
    AttesterSlashing(Box<AttesterSlashing>),
}

impl PubsubMessage {
    /// Returns the topic kind associated with the message.
    pub fn kind(&self) -> GossipKind {
        match self {
            PubsubMessage::VoluntaryExit(_) => GossipKind::VoluntaryExit,
            PubsubMessage::ProposerSlashing(_) => GossipKind::ProposerSlashing,
            PubsubMessage::AttesterSlashing(_) => GossipKind::AttesterSlashing,
        }
    }
}

impl fmt::Display for PubsubMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PubsubMessage::VoluntaryExit(exit) => write!(
                f,
                "Voluntary Exit: validator: {}, epoch: {}",
                exit.message.validator_index, exit.message.epoch
            ),
            PubsubMessage::ProposerSlashing(slashing) => write!(
                f,
                "Proposer Slashing: proposer: {}, slot: {}",
                slashing.proposer_index(),
                slashing.signed_header_1.message.slot
            ),
            PubsubMessage::AttesterSlashing(slashing) => write!(
                f,
                "Attester Slashing: validators: {:?}",
                slashing.intersecting_indices()
            ),
        }
    }
}
