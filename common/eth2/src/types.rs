//! This module exposes a superset of the `types` crate. It adds additional types that are only
//! required for the HTTP API.
//!
//! Objects submitted over the API are decoded leniently: nested fields that a consensus object
//! requires are optional here and signatures are arbitrary byte strings. Converting into the
//! consensus types with `TryFrom` is where missing or malformed pieces are reported.

use serde::{Deserialize, Serialize};
use std::fmt;
use types::{AttestationData, BeaconBlockHeader, SignatureBytes, VoluntaryExit};

pub use types::{Epoch, Hash256, Slot};

/// An API error serializable to JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub code: u16,
    pub message: String,
    #[serde(default)]
    pub stacktraces: Vec<String>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(bound = "T: Serialize + serde::de::DeserializeOwned")]
pub struct GenericResponse<T: Serialize + serde::de::DeserializeOwned> {
    pub data: T,
}

impl<T: Serialize + serde::de::DeserializeOwned> From<T> for GenericResponse<T> {
    fn from(data: T) -> Self {
        Self { data }
    }
}

/// The reason a submitted object could not be turned into a consensus object.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// A required nested field was absent.
    MissingField(&'static str),
    /// A signature was not a 96-byte compressed point encoding.
    InvalidSignature {
        field: &'static str,
        error: bls::Error,
    },
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::MissingField(field) => write!(f, "missing field {}", field),
            ConversionError::InvalidSignature { field, error } => {
                write!(f, "invalid signature in {}: {}", field, error)
            }
        }
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ConversionError> {
    value.ok_or(ConversionError::MissingField(field))
}

fn signature(bytes: &[u8], field: &'static str) -> Result<SignatureBytes, ConversionError> {
    SignatureBytes::deserialize(bytes)
        .map_err(|error| ConversionError::InvalidSignature { field, error })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedAttestation {
    #[serde(with = "serde_utils::quoted_u64_vec")]
    pub attesting_indices: Vec<u64>,
    pub data: Option<AttestationData>,
    #[serde(with = "serde_utils::hex_vec")]
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttesterSlashing {
    pub attestation_1: Option<IndexedAttestation>,
    pub attestation_2: Option<IndexedAttestation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedBeaconBlockHeader {
    pub message: Option<BeaconBlockHeader>,
    #[serde(with = "serde_utils::hex_vec")]
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposerSlashing {
    pub signed_header_1: Option<SignedBeaconBlockHeader>,
    pub signed_header_2: Option<SignedBeaconBlockHeader>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedVoluntaryExit {
    pub message: Option<VoluntaryExit>,
    #[serde(with = "serde_utils::hex_vec")]
    pub signature: Vec<u8>,
}

impl IndexedAttestation {
    fn into_consensus(
        self,
        field: &'static str,
        signature_field: &'static str,
    ) -> Result<types::IndexedAttestation, ConversionError> {
        Ok(types::IndexedAttestation {
            attesting_indices: self.attesting_indices,
            data: required(self.data, field)?,
            signature: signature(&self.signature, signature_field)?,
        })
    }
}

impl SignedBeaconBlockHeader {
    fn into_consensus(
        self,
        field: &'static str,
        signature_field: &'static str,
    ) -> Result<types::SignedBeaconBlockHeader, ConversionError> {
        Ok(types::SignedBeaconBlockHeader {
            message: required(self.message, field)?,
            signature: signature(&self.signature, signature_field)?,
        })
    }
}

impl TryFrom<AttesterSlashing> for types::AttesterSlashing {
    type Error = ConversionError;

    fn try_from(slashing: AttesterSlashing) -> Result<Self, Self::Error> {
        Ok(Self {
            attestation_1: required(slashing.attestation_1, "attestation_1")?
                .into_consensus("attestation_1.data", "attestation_1.signature")?,
            attestation_2: required(slashing.attestation_2, "attestation_2")?
                .into_consensus("attestation_2.data", "attestation_2.signature")?,
        })
    }
}

impl TryFrom<ProposerSlashing> for types::ProposerSlashing {
    type Error = ConversionError;

    fn try_from(slashing: ProposerSlashing) -> Result<Self, Self::Error> {
        Ok(Self {
            signed_header_1: required(slashing.signed_header_1, "signed_header_1")?
                .into_consensus("signed_header_1.message", "signed_header_1.signature")?,
            signed_header_2: required(slashing.signed_header_2, "signed_header_2")?
                .into_consensus("signed_header_2.message", "signed_header_2.signature")?,
        })
    }
}

impl TryFrom<SignedVoluntaryExit> for types::SignedVoluntaryExit {
    type Error = ConversionError;

    fn try_from(exit: SignedVoluntaryExit) -> Result<Self, Self::Error> {
        Ok(Self {
            message: required(exit.message, "message")?,
            signature: signature(&exit.signature, "signature")?,
        })
    }
}

impl From<types::IndexedAttestation> for IndexedAttestation {
    fn from(attestation: types::IndexedAttestation) -> Self {
        Self {
            attesting_indices: attestation.attesting_indices,
            data: Some(attestation.data),
            signature: attestation.signature.as_bytes().to_vec(),
        }
    }
}

impl From<types::AttesterSlashing> for AttesterSlashing {
    fn from(slashing: types::AttesterSlashing) -> Self {
        Self {
            attestation_1: Some(slashing.attestation_1.into()),
            attestation_2: Some(slashing.attestation_2.into()),
        }
    }
}

impl From<types::SignedBeaconBlockHeader> for SignedBeaconBlockHeader {
    fn from(header: types::SignedBeaconBlockHeader) -> Self {
        Self {
            message: Some(header.message),
            signature: header.signature.as_bytes().to_vec(),
        }
    }
}

impl From<types::ProposerSlashing> for ProposerSlashing {
    fn from(slashing: types::ProposerSlashing) -> Self {
        Self {
            signed_header_1: Some(slashing.signed_header_1.into()),
            signed_header_2: Some(slashing.signed_header_2.into()),
        }
    }
}

impl From<types::SignedVoluntaryExit> for SignedVoluntaryExit {
    fn from(exit: types::SignedVoluntaryExit) -> Self {
        Self {
            message: Some(exit.message),
            signature: exit.signature.as_bytes().to_vec(),
        }
    }
}
