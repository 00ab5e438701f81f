use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum BeaconChainError {
    /// There is no head yet, e.g. the node is waiting for genesis.
    HeadUnavailable,
    /// The canonical head lock could not be taken within the timeout.
    CanonicalHeadLockTimeout,
}

impl fmt::Display for BeaconChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeaconChainError::HeadUnavailable => write!(f, "no head state is available"),
            BeaconChainError::CanonicalHeadLockTimeout => {
                write!(f, "timed out waiting for the canonical head lock")
            }
        }
    }
}
