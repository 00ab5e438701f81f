pub use metrics::*;
use std::sync::LazyLock;

pub static GOSSIP_PUBLISHED_MESSAGES_TOTAL: LazyLock<Result<IntCounterVec>> = LazyLock::new(|| {
    try_create_int_counter_vec(
        "gossipsub_published_messages_total",
        "Count of operations handed to the network service for publishing, by topic",
        &["topic"],
    )
});
