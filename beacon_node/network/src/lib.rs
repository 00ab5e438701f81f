/// This crate hands admitted operations to the peer-to-peer network.
mod broadcaster;
mod metrics;
mod pubsub;
mod service;

pub use broadcaster::{BroadcastError, Broadcaster, NetworkSender};
pub use pubsub::{GossipKind, PubsubMessage};
pub use service::{NetworkMessage, NetworkService};
