//! BLS12-381 signature handling for consensus objects.
//!
//! Keys and signatures travel through the node as their compressed byte encodings
//! (`PublicKeyBytes`, `SignatureBytes`). They are only decompressed into `blst` points when a
//! `SignatureSet` is verified, which keeps deserialization of untrusted objects cheap.
//!
//! Building with the `fake_crypto` feature makes every signature set verify, which is useful for
//! replaying objects without the keys that signed them.

mod fixed_bytes;
mod keypair;
mod signature_set;

pub use fixed_bytes::{PublicKeyBytes, SignatureBytes};
pub use keypair::{aggregate_signatures, Keypair};
pub use signature_set::{verify_signature_sets, SignatureSet};

use blst::BLST_ERROR;

pub type Hash256 = alloy_primitives::B256;

/// Domain separation tag for the proof-of-possession ciphersuite used by consensus signatures.
pub const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

pub const PUBLIC_KEY_BYTES_LEN: usize = 48;
pub const SIGNATURE_BYTES_LEN: usize = 96;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The underlying `blst` library rejected a point or a key.
    BlstError(BLST_ERROR),
    /// An input had the wrong length for the type it was decoded into.
    InvalidByteLength { got: usize, expected: usize },
    /// A hex string could not be decoded.
    InvalidHex(String),
    /// Aggregation was requested over an empty collection.
    EmptyAggregate,
}

impl From<BLST_ERROR> for Error {
    fn from(e: BLST_ERROR) -> Self {
        Error::BlstError(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::BlstError(e) => write!(f, "blst error: {:?}", e),
            Error::InvalidByteLength { got, expected } => {
                write!(f, "invalid byte length: got {}, expected {}", got, expected)
            }
            Error::InvalidHex(e) => write!(f, "invalid hex: {}", e),
            Error::EmptyAggregate => write!(f, "cannot aggregate zero signatures"),
        }
    }
}
