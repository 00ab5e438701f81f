use crate::service::NetworkMessage;
use crate::{GossipKind, PubsubMessage};
use std::fmt;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, PartialEq)]
pub enum BroadcastError {
    /// The network service is no longer receiving messages.
    NetworkChannelClosed(GossipKind),
}

impl fmt::Display for BroadcastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BroadcastError::NetworkChannelClosed(kind) => {
                write!(f, "unable to publish {} to network channel", kind)
            }
        }
    }
}

/// Publishes an admitted operation to the peer network.
///
/// Delivery beyond handing the message to the network is not guaranteed; callers that need
/// at-least-once delivery must retry themselves.
pub trait Broadcaster: Send + Sync + 'static {
    fn broadcast(&self, message: PubsubMessage) -> Result<(), BroadcastError>;
}

/// Broadcasts by sending to the `NetworkService`.
#[derive(Clone)]
pub struct NetworkSender {
    network_tx: UnboundedSender<NetworkMessage>,
}

impl NetworkSender {
    pub fn new(network_tx: UnboundedSender<NetworkMessage>) -> Self {
        Self { network_tx }
    }
}

impl Broadcaster for NetworkSender {
    fn broadcast(&self, message: PubsubMessage) -> Result<(), BroadcastError> {
        let kind = message.kind();
        self.network_tx
            .send(NetworkMessage::Publish {
                messages: vec![message],
            })
            .map_err(|_| BroadcastError::NetworkChannelClosed(kind))
    }
}
