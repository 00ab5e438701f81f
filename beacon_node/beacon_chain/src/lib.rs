mod canonical_head;
mod errors;
pub mod test_utils;

pub use canonical_head::{CanonicalHead, HeadStateProvider, HEAD_LOCK_TIMEOUT};
pub use errors::BeaconChainError;
