use crate::metrics;
use crate::PubsubMessage;
use slog::{debug, o, Logger};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Types of messages that the network service can receive.
#[derive(Debug)]
pub enum NetworkMessage {
    /// Publish a list of messages to the gossipsub protocol.
    Publish { messages: Vec<PubsubMessage> },
}

/// Receives messages bound for the peer-to-peer network.
///
/// Topic encoding and peer selection happen downstream of this service; it is the single point
/// where every published operation passes through.
pub struct NetworkService {
    network_recv: mpsc::UnboundedReceiver<NetworkMessage>,
    log: Logger,
}

impl NetworkService {
    /// Spawns the service on the current Tokio runtime and returns its sending half.
    pub fn start(log: &Logger) -> (mpsc::UnboundedSender<NetworkMessage>, JoinHandle<()>) {
        let (network_send, network_recv) = mpsc::unbounded_channel();
        let service = NetworkService {
            network_recv,
            log: log.new(o!("service" => "network")),
        };
        let handle = tokio::spawn(service.run());
        (network_send, handle)
    }

    /// Runs until every sender has been dropped.
    async fn run(mut self) {
        while let Some(message) = self.network_recv.recv().await {
            self.on_network_msg(message);
        }
        debug!(self.log, "Network service shutdown");
    }

    fn on_network_msg(&mut self, msg: NetworkMessage) {
        match msg {
            NetworkMessage::Publish { messages } => {
                let mut topic_kinds = Vec::new();
                for message in &messages {
                    let kind = message.kind();
                    if !topic_kinds.contains(&kind) {
                        topic_kinds.push(kind);
                    }
                    metrics::inc_counter_vec(
                        &metrics::GOSSIP_PUBLISHED_MESSAGES_TOTAL,
                        &[kind.into()],
                    );
                }
                debug!(
                    self.log,
                    "Sending pubsub messages";
                    "count" => messages.len(),
                    "topics" => ?topic_kinds
                );
            }
        }
    }
}
